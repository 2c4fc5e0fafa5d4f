//! Errors - ポートごとのエラー型
//!
//! ハンドラの read/write 経路ではこれらのエラーは呼び出し元に返らず、
//! 診断テキスト（`RemoteRead::Diagnostic`）やログに変換されます。
//! 例外は `DeliveryStreamHook` と設定の読み込みで、こちらは `?` で伝播します。

use thiserror::Error;

/// ObjectStore の操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// key が存在しない（HEAD/GET の 404 相当）
    #[error("An error occurred (404) when calling the {operation} operation: Not Found")]
    NotFound { operation: &'static str },

    /// bucket 自体が存在しない
    #[error(
        "An error occurred (NoSuchBucket) when calling the {operation} operation: The specified bucket does not exist"
    )]
    NoSuchBucket { operation: &'static str },

    #[error("invalid remote url '{0}'")]
    InvalidUrl(String),

    /// ネットワーク・認証などその他の失敗
    #[error("transport error: {0}")]
    Transport(String),
}

/// LogStreamStore の操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogStreamError {
    #[error("The specified log group does not exist: {0}")]
    GroupNotFound(String),

    #[error("The specified log stream does not exist: {group}/{stream}")]
    StreamNotFound { group: String, stream: String },

    #[error("invalid log events: {0}")]
    InvalidEvents(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// RecordSink / DeliveryStreamHook の操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("delivery stream '{0}' not found")]
    StreamNotFound(String),

    #[error("batch of {0} records exceeds the per-call limit")]
    BatchTooLarge(usize),

    #[error("transport error: {0}")]
    Transport(String),
}

/// ハンドラのローカル側（ローカルログファイル）のエラー
///
/// リモート側の失敗はここには来ない。
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("local log file error: {0}")]
    Io(#[from] std::io::Error),
}

/// 設定・テンプレートのエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown placeholder '{{{0}}}' in log filename template")]
    UnknownPlaceholder(String),

    #[error("unterminated placeholder in log filename template '{0}'")]
    UnterminatedPlaceholder(String),

    #[error("invalid log group '{0}'")]
    InvalidLogGroup(String),

    #[error("invalid remote base log folder: {0}")]
    InvalidRemoteBase(#[source] StoreError),

    #[error("missing setting '{0}'")]
    MissingSetting(&'static str),

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}
