//! LogStreamStore port - 追記専用のログストリーム
//!
//! group → stream → events の 3 階層。
//!
//! # 実装
//! - InMemoryLogStreamStore（開発用・テスト用）

use async_trait::async_trait;

use crate::domain::{LogEvent, LogStreamError, SequenceToken};

/// LogStreamStore はタイムスタンプ付きイベントをストリームに追記する
///
/// # 設計原則
/// - group / stream の作成は冪等（`*_if_absent`）
/// - `put_events` は 1 バッチ内で timestamp 昇順を要求してよい
/// - `get_events` はストアが保持している順で返す（昇順とは限らない）
#[async_trait]
pub trait LogStreamStore: Send + Sync {
    async fn create_group_if_absent(&self, group: &str) -> Result<(), LogStreamError>;

    async fn create_stream_if_absent(&self, group: &str, stream: &str)
    -> Result<(), LogStreamError>;

    async fn put_events(
        &self,
        group: &str,
        stream: &str,
        events: Vec<LogEvent>,
    ) -> Result<SequenceToken, LogStreamError>;

    async fn get_events(&self, group: &str, stream: &str) -> Result<Vec<LogEvent>, LogStreamError>;
}

#[async_trait]
impl<S: LogStreamStore + ?Sized> LogStreamStore for std::sync::Arc<S> {
    async fn create_group_if_absent(&self, group: &str) -> Result<(), LogStreamError> {
        (**self).create_group_if_absent(group).await
    }

    async fn create_stream_if_absent(
        &self,
        group: &str,
        stream: &str,
    ) -> Result<(), LogStreamError> {
        (**self).create_stream_if_absent(group, stream).await
    }

    async fn put_events(
        &self,
        group: &str,
        stream: &str,
        events: Vec<LogEvent>,
    ) -> Result<SequenceToken, LogStreamError> {
        (**self).put_events(group, stream, events).await
    }

    async fn get_events(&self, group: &str, stream: &str) -> Result<Vec<LogEvent>, LogStreamError> {
        (**self).get_events(group, stream).await
    }
}
