//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（オブジェクトストレージ、ログストリーム、
//! 配送ストリーム）へのインターフェースを提供し、SDK の詳細を隠蔽します。
//!
//! # 設計原則
//! - 接続・認証の解決はポートの外側（実装の生成時）で済ませる
//! - ポートはエラーを返す。エラーを表示用テキストに変えるのは app 層

pub mod clock;
pub mod id_generator;
pub mod log_stream;
pub mod object_store;
pub mod record_sink;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::log_stream::LogStreamStore;
pub use self::object_store::{ObjectMeta, ObjectStore};
pub use self::record_sink::{RecordOutcome, RecordSink};
