//! InMemoryLogStreamStore - 開発用のログストリーム
//!
//! # 実装詳細
//! - HashMap<group, HashMap<stream, Vec<LogEvent>>>
//! - 1 バッチ内の timestamp は昇順でなければならない（実ストアと同じ制約）
//! - バッチ間の順序は問わないので、保持順は昇順とは限らない

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{LogEvent, LogStreamError, SequenceToken};
use crate::ports::{IdGenerator, LogStreamStore, SystemClock, UlidGenerator};

type Groups = HashMap<String, HashMap<String, Vec<LogEvent>>>;

pub struct InMemoryLogStreamStore {
    groups: Mutex<Groups>,
    id_gen: Box<dyn IdGenerator>,
}

impl InMemoryLogStreamStore {
    pub fn new() -> Self {
        Self::with_id_generator(Box::new(UlidGenerator::new(SystemClock)))
    }

    pub fn with_id_generator(id_gen: Box<dyn IdGenerator>) -> Self {
        Self {
            groups: Mutex::new(HashMap::new()),
            id_gen,
        }
    }

    pub async fn stream_names(&self, group: &str) -> Vec<String> {
        let groups = self.groups.lock().await;
        let mut names: Vec<String> = groups
            .get(group)
            .map(|streams| streams.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl Default for InMemoryLogStreamStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogStreamStore for InMemoryLogStreamStore {
    async fn create_group_if_absent(&self, group: &str) -> Result<(), LogStreamError> {
        self.groups
            .lock()
            .await
            .entry(group.to_string())
            .or_default();
        Ok(())
    }

    async fn create_stream_if_absent(
        &self,
        group: &str,
        stream: &str,
    ) -> Result<(), LogStreamError> {
        let mut groups = self.groups.lock().await;
        let streams = groups
            .get_mut(group)
            .ok_or_else(|| LogStreamError::GroupNotFound(group.to_string()))?;
        streams.entry(stream.to_string()).or_default();
        Ok(())
    }

    async fn put_events(
        &self,
        group: &str,
        stream: &str,
        events: Vec<LogEvent>,
    ) -> Result<SequenceToken, LogStreamError> {
        if events.windows(2).any(|pair| pair[0].timestamp > pair[1].timestamp) {
            return Err(LogStreamError::InvalidEvents(
                "log events in a single batch must be in chronological order".to_string(),
            ));
        }
        let mut groups = self.groups.lock().await;
        let streams = groups
            .get_mut(group)
            .ok_or_else(|| LogStreamError::GroupNotFound(group.to_string()))?;
        let stored = streams
            .get_mut(stream)
            .ok_or_else(|| LogStreamError::StreamNotFound {
                group: group.to_string(),
                stream: stream.to_string(),
            })?;
        stored.extend(events);
        Ok(self.id_gen.generate_sequence_token())
    }

    async fn get_events(&self, group: &str, stream: &str) -> Result<Vec<LogEvent>, LogStreamError> {
        let groups = self.groups.lock().await;
        let streams = groups
            .get(group)
            .ok_or_else(|| LogStreamError::GroupNotFound(group.to_string()))?;
        streams
            .get(stream)
            .cloned()
            .ok_or_else(|| LogStreamError::StreamNotFound {
                group: group.to_string(),
                stream: stream.to_string(),
            })
    }
}
