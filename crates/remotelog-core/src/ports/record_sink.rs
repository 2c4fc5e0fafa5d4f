//! RecordSink port - 配送ストリーム（レコード取り込み）
//!
//! 不透明なバイト列レコードを名前付きの delivery stream に流します。
//! 宛先（bucket など）への配送はストア側の責務です。

use async_trait::async_trait;

use crate::domain::{IngestError, RecordId};

/// 1 回の呼び出しで受け付けるレコード数の上限
pub const MAX_RECORDS_PER_BATCH: usize = 500;

/// 1 レコードのサイズ上限（1000 KiB）
pub const MAX_RECORD_BYTES: usize = 1000 * 1024;

/// 1 レコードの受理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Accepted(RecordId),
    Failed { error_code: String },
}

/// RecordSink はレコードのバッチを受け付ける
///
/// # 設計原則
/// - stream が存在しなければバッチ全体が `IngestError::StreamNotFound`
/// - 個々のレコードの失敗は `RecordOutcome::Failed` で返す（バッチは失敗しない）
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn put_record_batch(
        &self,
        stream: &str,
        records: Vec<Vec<u8>>,
    ) -> Result<Vec<RecordOutcome>, IngestError>;
}

#[async_trait]
impl<S: RecordSink + ?Sized> RecordSink for std::sync::Arc<S> {
    async fn put_record_batch(
        &self,
        stream: &str,
        records: Vec<Vec<u8>>,
    ) -> Result<Vec<RecordOutcome>, IngestError> {
        (**self).put_record_batch(stream, records).await
    }
}
