//! InMemoryRecordSink - 開発用の配送ストリーム

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::IngestError;
use crate::ports::record_sink::{MAX_RECORD_BYTES, MAX_RECORDS_PER_BATCH};
use crate::ports::{IdGenerator, RecordOutcome, RecordSink, SystemClock, UlidGenerator};

pub struct InMemoryRecordSink {
    streams: Mutex<HashMap<String, Vec<Vec<u8>>>>,
    id_gen: Box<dyn IdGenerator>,
}

impl InMemoryRecordSink {
    pub fn new() -> Self {
        Self {
            streams: Mutex::new(HashMap::new()),
            id_gen: Box::new(UlidGenerator::new(SystemClock)),
        }
    }

    pub async fn create_delivery_stream(&self, name: &str) {
        self.streams
            .lock()
            .await
            .entry(name.to_string())
            .or_default();
    }

    /// Records accepted so far, in arrival order.
    pub async fn delivered(&self, name: &str) -> Vec<Vec<u8>> {
        self.streams
            .lock()
            .await
            .get(name)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for InMemoryRecordSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSink for InMemoryRecordSink {
    async fn put_record_batch(
        &self,
        stream: &str,
        records: Vec<Vec<u8>>,
    ) -> Result<Vec<RecordOutcome>, IngestError> {
        if records.len() > MAX_RECORDS_PER_BATCH {
            return Err(IngestError::BatchTooLarge(records.len()));
        }
        let mut streams = self.streams.lock().await;
        let delivered = streams
            .get_mut(stream)
            .ok_or_else(|| IngestError::StreamNotFound(stream.to_string()))?;

        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            if record.len() > MAX_RECORD_BYTES {
                outcomes.push(RecordOutcome::Failed {
                    error_code: "RecordTooLarge".to_string(),
                });
                continue;
            }
            delivered.push(record);
            outcomes.push(RecordOutcome::Accepted(self.id_gen.generate_record_id()));
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn oversized_record_fails_individually() {
        let sink = InMemoryRecordSink::new();
        sink.create_delivery_stream("s").await;

        let outcomes = sink
            .put_record_batch("s", vec![b"ok".to_vec(), vec![0; MAX_RECORD_BYTES + 1]])
            .await
            .unwrap();

        assert!(matches!(outcomes[0], RecordOutcome::Accepted(_)));
        assert!(matches!(outcomes[1], RecordOutcome::Failed { .. }));
        assert_eq!(sink.delivered("s").await, vec![b"ok".to_vec()]);
    }

    #[tokio::test]
    async fn limits_and_missing_stream() {
        let sink = InMemoryRecordSink::new();
        assert_eq!(
            sink.put_record_batch("nope", vec![]).await,
            Err(IngestError::StreamNotFound("nope".to_string()))
        );

        sink.create_delivery_stream("s").await;
        let too_many = vec![b"x".to_vec(); MAX_RECORDS_PER_BATCH + 1];
        assert_eq!(
            sink.put_record_batch("s", too_many).await,
            Err(IngestError::BatchTooLarge(MAX_RECORDS_PER_BATCH + 1))
        );
    }
}
