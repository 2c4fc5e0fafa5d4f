//! App - アプリケーション層
//!
//! ports を組み合わせて、タスク試行のログを扱うハンドラを実装します。
//!
//! # 主要コンポーネント
//! - **TaskLogHandler**: ハンドラ共通の trait（set_context → handle → close → read）
//! - **ObjectStoreTaskHandler**: ローカルファイル + オブジェクトストアへのアップロード
//! - **LogStreamTaskHandler**: バッファ + ログストリームへの送信
//! - **DeliveryStreamHook**: delivery stream へのレコード投入

pub mod delivery_hook;
pub mod handler;
pub mod object_store_handler;
pub mod stream_handler;

// 主要な型を再エクスポート
pub use self::delivery_hook::{DeliveryStreamHook, PutRecordsSummary};
pub use self::handler::TaskLogHandler;
pub use self::object_store_handler::ObjectStoreTaskHandler;
pub use self::stream_handler::LogStreamTaskHandler;
