//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の in-memory 実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryObjectStore**: bucket/key のオブジェクトストア
//! - **InMemoryLogStreamStore**: group/stream のログストリーム
//! - **InMemoryRecordSink**: delivery stream
//!
//! # 本番用実装
//! SDK クライアントを包む実装は別クレートに配置します。

pub mod inmem_log_stream;
pub mod inmem_object_store;
pub mod inmem_record_sink;

// 主要な型を再エクスポート
pub use self::inmem_log_stream::InMemoryLogStreamStore;
pub use self::inmem_object_store::InMemoryObjectStore;
pub use self::inmem_record_sink::InMemoryRecordSink;
