//! remotelog-core
//!
//! Remote persistence and read-back of task-attempt logs.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（TaskAttempt, LogFilenameTemplate, RemoteUrl, LogEvent, ReadResult, errors）
//! - **ports**: 抽象化レイヤー（ObjectStore, LogStreamStore, RecordSink, Clock, IdGenerator）
//! - **app**: ハンドラ（ObjectStoreTaskHandler, LogStreamTaskHandler, DeliveryStreamHook）
//! - **impls**: 実装（InMemoryObjectStore など開発用）
//! - **config**: figment による設定の読み込み
//! - **observability**: tracing subscriber の初期化

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{
    DeliveryStreamHook, LogStreamTaskHandler, ObjectStoreTaskHandler, PutRecordsSummary,
    TaskLogHandler,
};
pub use config::RemoteLogConfig;
pub use domain::{LogEvent, ReadResult, RemoteRead, TaskAttempt};
