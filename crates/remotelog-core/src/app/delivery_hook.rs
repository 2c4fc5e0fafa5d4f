//! DeliveryStreamHook - レコードを delivery stream に投入する
//!
//! ログハンドラと違い、こちらはフックなのでエラーを呼び出し元に返します。

use crate::config::RemoteLogConfig;
use crate::domain::{ConfigError, IngestError, RecordId};
use crate::ports::record_sink::MAX_RECORDS_PER_BATCH;
use crate::ports::{RecordOutcome, RecordSink};

/// `put_records` の集計結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutRecordsSummary {
    pub failed_put_count: usize,
    /// IDs of accepted records, in submission order.
    pub record_ids: Vec<RecordId>,
}

pub struct DeliveryStreamHook<S> {
    sink: S,
    delivery_stream: String,
}

impl<S: RecordSink> DeliveryStreamHook<S> {
    pub fn new(sink: S, delivery_stream: impl Into<String>) -> Self {
        Self {
            sink,
            delivery_stream: delivery_stream.into(),
        }
    }

    pub fn from_config(sink: S, config: &RemoteLogConfig) -> Result<Self, ConfigError> {
        let delivery_stream = config
            .delivery_stream
            .clone()
            .ok_or(ConfigError::MissingSetting("delivery_stream"))?;
        Ok(Self::new(sink, delivery_stream))
    }

    pub fn delivery_stream(&self) -> &str {
        &self.delivery_stream
    }

    /// レコードを上限件数ごとに分けて送る
    ///
    /// 途中のバッチでストリームエラーが起きた場合、それ以前のバッチは送信済み。
    pub async fn put_records<I, R>(&self, records: I) -> Result<PutRecordsSummary, IngestError>
    where
        I: IntoIterator<Item = R>,
        R: Into<Vec<u8>>,
    {
        let records: Vec<Vec<u8>> = records.into_iter().map(Into::into).collect();
        let mut summary = PutRecordsSummary::default();

        for chunk in records.chunks(MAX_RECORDS_PER_BATCH) {
            let outcomes = self
                .sink
                .put_record_batch(&self.delivery_stream, chunk.to_vec())
                .await?;
            for outcome in outcomes {
                match outcome {
                    RecordOutcome::Accepted(id) => summary.record_ids.push(id),
                    RecordOutcome::Failed { error_code } => {
                        tracing::warn!(
                            delivery_stream = %self.delivery_stream,
                            error_code = %error_code,
                            "record rejected"
                        );
                        summary.failed_put_count += 1;
                    }
                }
            }
        }
        tracing::debug!(
            delivery_stream = %self.delivery_stream,
            accepted = summary.record_ids.len(),
            failed = summary.failed_put_count,
            "records put"
        );
        Ok(summary)
    }
}
