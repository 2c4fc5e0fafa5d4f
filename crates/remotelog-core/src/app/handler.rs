//! TaskLogHandler trait - タスク試行のログを扱うハンドラの共通インターフェース
//!
//! # ライフサイクル
//! 1. `set_context(attempt)`: 書き込み先を決める
//! 2. `handle(line)`: ログ行を受け取る（何度でも）
//! 3. `close()`: リモートへ送る（何度呼んでも 1 回だけ）
//! 4. `read(attempt)`: 後から表示用に読み戻す（副作用なし）
//!
//! リモートストアの失敗はどのメソッドからも返りません。
//! `HandlerError` になるのはローカルファイルの失敗だけです。

use async_trait::async_trait;

use crate::domain::{HandlerError, ReadResult, TaskAttempt};

/// # 使用例
/// ```ignore
/// handler.set_context(&attempt).await?;
/// handler.handle("starting").await?;
/// handler.close().await;
/// let result = handler.read(&attempt).await;
/// ```
#[async_trait]
pub trait TaskLogHandler: Send + Sync {
    async fn set_context(&mut self, attempt: &TaskAttempt) -> Result<(), HandlerError>;

    async fn handle(&mut self, line: &str) -> Result<(), HandlerError>;

    async fn close(&mut self);

    async fn read(&self, attempt: &TaskAttempt) -> ReadResult;
}
