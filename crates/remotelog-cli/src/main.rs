use std::sync::Arc;

use chrono::{TimeZone, Utc};
use remotelog_core::impls::{InMemoryLogStreamStore, InMemoryObjectStore};
use remotelog_core::observability::init_logging;
use remotelog_core::{
    LogStreamTaskHandler, ObjectStoreTaskHandler, RemoteLogConfig, TaskAttempt, TaskLogHandler,
};

const DEMO_BUCKET: &str = "task-logs";

/// 1 つのハンドラで「書いて閉じて読む」を通す
async fn run_attempt(
    name: &str,
    handler: &mut dyn TaskLogHandler,
    attempt: &TaskAttempt,
) -> Result<(), Box<dyn std::error::Error>> {
    handler.set_context(attempt).await?;
    for step in ["starting", "working", "done"] {
        handler.handle(&format!("{} {step}", attempt.task_id)).await?;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    handler.close().await;

    let result = handler.read(attempt).await;
    println!("== {name}");
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // (A) 設定を読む（未設定ならデモ用の値で埋める）
    let mut config = RemoteLogConfig::load()?;
    config
        .remote_base_log_folder
        .get_or_insert_with(|| format!("mem://{DEMO_BUCKET}/logs"));
    config.log_group.get_or_insert_with(|| "task_logs".to_string());
    tracing::info!(?config, "configuration loaded");

    // (B) in-memory ストアを用意
    let objects = Arc::new(InMemoryObjectStore::new());
    let bucket = config
        .remote_base()
        .transpose()?
        .map(|url| url.bucket().to_string())
        .unwrap_or_else(|| DEMO_BUCKET.to_string());
    objects.create_bucket(&bucket).await;
    let streams = Arc::new(InMemoryLogStreamStore::new());

    // (C) ハンドラを組み立てる
    let mut object_handler = ObjectStoreTaskHandler::from_config(objects.clone(), &config)?;
    let mut stream_handler = LogStreamTaskHandler::from_config(streams.clone(), &config)?;

    // (D) 1 試行ぶんのログを書いて読み戻す
    let execution_date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single().ok_or("bad date")?;
    let attempt = TaskAttempt::new("demo_workflow", "hello", execution_date, 1);
    run_attempt("object store", &mut object_handler, &attempt).await?;
    run_attempt("log stream", &mut stream_handler, &attempt).await?;

    // (E) 書いていない試行は診断メッセージになる
    let mut retry = attempt.clone();
    retry.try_number = 2;
    println!("== never written");
    println!("{}", object_handler.read(&retry).await.text());
    println!("{}", stream_handler.read(&retry).await.text());

    Ok(())
}
