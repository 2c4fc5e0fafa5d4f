//! LogStreamTaskHandler - タスク試行のログをログストリームに流す・読み戻す
//!
//! # 流れ
//! - `set_context` でストリーム名（key の ':' を '_' に置換）を決める
//! - `handle` はメモリ上のバッファに積むだけ
//! - `flush` / `close` で group・stream を作成し、timestamp 昇順にバッチ送信
//! - `read` は全イベントを取得し、昇順に並べて `[時刻] メッセージ` で描画

use async_trait::async_trait;

use crate::app::handler::TaskLogHandler;
use crate::config::{DEFAULT_MAX_BATCH_EVENTS, RemoteLogConfig};
use crate::domain::{
    ConfigError, HandlerError, LogEvent, LogFilenameTemplate, LogStreamError, ReadResult,
    RemoteRead, TaskAttempt, render_events, sort_chronologically,
};
use crate::ports::{Clock, LogStreamStore, SystemClock};

pub struct LogStreamTaskHandler<S, C = SystemClock> {
    store: S,
    clock: C,
    log_group: String,
    template: LogFilenameTemplate,
    max_batch_events: usize,
    stream: Option<String>,
    buffer: Vec<LogEvent>,
    closed: bool,
}

impl<S: LogStreamStore> LogStreamTaskHandler<S, SystemClock> {
    pub fn new(store: S, log_group: impl Into<String>, template: LogFilenameTemplate) -> Self {
        Self::with_clock(store, SystemClock, log_group, template)
    }

    pub fn from_config(store: S, config: &RemoteLogConfig) -> Result<Self, ConfigError> {
        let log_group = config
            .log_group_name()
            .ok_or(ConfigError::MissingSetting("log_group"))??;
        let template = config.filename_template()?;
        Ok(Self::new(store, log_group, template).with_max_batch_events(config.max_batch_events))
    }
}

impl<S: LogStreamStore, C: Clock> LogStreamTaskHandler<S, C> {
    pub fn with_clock(
        store: S,
        clock: C,
        log_group: impl Into<String>,
        template: LogFilenameTemplate,
    ) -> Self {
        Self {
            store,
            clock,
            log_group: log_group.into(),
            template,
            max_batch_events: DEFAULT_MAX_BATCH_EVENTS,
            stream: None,
            buffer: Vec::new(),
            closed: false,
        }
    }

    /// 0 は 1 として扱う
    pub fn with_max_batch_events(mut self, max_batch_events: usize) -> Self {
        self.max_batch_events = max_batch_events.max(1);
        self
    }

    pub fn log_group(&self) -> &str {
        &self.log_group
    }

    pub fn stream_name(&self, attempt: &TaskAttempt) -> String {
        self.template.render(attempt).stream_name()
    }

    /// Lines buffered since the last flush.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// バッファを昇順に並べて送信する。失敗は error ログに出して `false`。
    ///
    /// 成否にかかわらずバッファは空になる。
    pub async fn flush(&mut self) -> bool {
        if self.buffer.is_empty() {
            return true;
        }
        let Some(stream) = self.stream.clone() else {
            return true;
        };
        let mut events = std::mem::take(&mut self.buffer);
        sort_chronologically(&mut events);

        match self.emit(&stream, events).await {
            Ok(batches) => {
                tracing::debug!(log_group = %self.log_group, log_stream = %stream, batches, "log events emitted");
                true
            }
            Err(err) => {
                tracing::error!(
                    log_group = %self.log_group,
                    log_stream = %stream,
                    error = %err,
                    "Could not write logs to log_group: {} log_stream: {}",
                    self.log_group,
                    stream
                );
                false
            }
        }
    }

    async fn emit(&self, stream: &str, events: Vec<LogEvent>) -> Result<usize, LogStreamError> {
        self.store.create_group_if_absent(&self.log_group).await?;
        self.store
            .create_stream_if_absent(&self.log_group, stream)
            .await?;
        let mut batches = 0;
        for chunk in events.chunks(self.max_batch_events) {
            self.store
                .put_events(&self.log_group, stream, chunk.to_vec())
                .await?;
            batches += 1;
        }
        Ok(batches)
    }

    /// 期待する group/stream の全イベント。なければ診断メッセージ。
    pub async fn fetch(&self, stream: &str) -> RemoteRead {
        match self.store.get_events(&self.log_group, stream).await {
            Ok(events) => RemoteRead::Content(render_events(events)),
            Err(err) => {
                tracing::error!(
                    log_group = %self.log_group,
                    log_stream = %stream,
                    error = %err,
                    "failed to fetch log events"
                );
                RemoteRead::Diagnostic(format!(
                    "Could not read remote logs from log_group: {} log_stream: {}.",
                    self.log_group, stream
                ))
            }
        }
    }

    pub async fn read(&self, attempt: &TaskAttempt) -> ReadResult {
        let stream = self.stream_name(attempt);
        let body = self.fetch(&stream).await;
        ReadResult::finished(format!(
            "*** Reading remote log from log_group: {} log_stream: {}.\n{}\n",
            self.log_group,
            stream,
            body.as_text()
        ))
    }
}

#[async_trait]
impl<S: LogStreamStore, C: Clock> TaskLogHandler for LogStreamTaskHandler<S, C> {
    async fn set_context(&mut self, attempt: &TaskAttempt) -> Result<(), HandlerError> {
        // 前の試行の残りは前のストリームに送っておく
        self.flush().await;
        self.stream = Some(self.stream_name(attempt));
        self.closed = false;
        Ok(())
    }

    async fn handle(&mut self, line: &str) -> Result<(), HandlerError> {
        if self.stream.is_none() {
            tracing::debug!("log line dropped: no task attempt context");
            return Ok(());
        }
        self.buffer.push(LogEvent::at(self.clock.now(), line));
        Ok(())
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.flush().await;
        // 閉じた試行のストリームには以後書かない
        self.stream = None;
    }

    async fn read(&self, attempt: &TaskAttempt) -> ReadResult {
        LogStreamTaskHandler::read(self, attempt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryLogStreamStore;
    use crate::ports::FixedClock;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    const LOG_GROUP: &str = "log_group_name";

    struct Fixture {
        store: Arc<InMemoryLogStreamStore>,
        clock: Arc<FixedClock>,
        handler: LogStreamTaskHandler<Arc<InMemoryLogStreamStore>, Arc<FixedClock>>,
        attempt: TaskAttempt,
        stream: String,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryLogStreamStore::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        ));
        let handler = LogStreamTaskHandler::with_clock(
            store.clone(),
            clock.clone(),
            LOG_GROUP,
            LogFilenameTemplate::default(),
        );
        let date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let attempt = TaskAttempt::new(
            "dag_for_testing_stream_handler",
            "task_for_testing_stream_handler",
            date,
            1,
        );
        let stream = format!(
            "dag_for_testing_stream_handler/task_for_testing_stream_handler/{}/1.log",
            date.to_rfc3339()
        )
        .replace(':', "_");
        Fixture {
            store,
            clock,
            handler,
            attempt,
            stream,
        }
    }

    async fn generate_log_events(
        store: &InMemoryLogStreamStore,
        group: &str,
        stream: &str,
        events: Vec<LogEvent>,
    ) {
        store.create_group_if_absent(group).await.unwrap();
        store.create_stream_if_absent(group, stream).await.unwrap();
        store.put_events(group, stream, events).await.unwrap();
    }

    fn header(stream: &str, body: &str) -> String {
        format!("*** Reading remote log from log_group: {LOG_GROUP} log_stream: {stream}.\n{body}\n")
    }

    #[test]
    fn stream_name_matches_rendered_key() {
        let fx = fixture();
        assert_eq!(fx.handler.stream_name(&fx.attempt), fx.stream);
    }

    #[tokio::test]
    async fn read_renders_sorted_events() {
        let fx = fixture();
        let now = 1_700_000_000_000;
        // バッチごとに送ると、保持順は昇順にならない
        generate_log_events(&fx.store, LOG_GROUP, &fx.stream, vec![LogEvent::new(now, "Third")]).await;
        fx.store
            .put_events(
                LOG_GROUP,
                &fx.stream,
                vec![LogEvent::new(now - 2000, "First"), LogEvent::new(now - 1000, "Second")],
            )
            .await
            .unwrap();

        let result = fx.handler.read(&fx.attempt).await;

        let events = [
            "[2023-11-14 22:13:18,000] First",
            "[2023-11-14 22:13:19,000] Second",
            "[2023-11-14 22:13:20,000] Third",
        ]
        .join("\n");
        assert_eq!(result.text(), header(&fx.stream, &events));
        assert!(result.metadata.end_of_log);
    }

    #[tokio::test]
    async fn read_wrong_log_stream() {
        let fx = fixture();
        generate_log_events(
            &fx.store,
            LOG_GROUP,
            "alternate_log_stream",
            vec![
                LogEvent::new(10_000, "First"),
                LogEvent::new(20_000, "Second"),
                LogEvent::new(30_000, "Third"),
            ],
        )
        .await;

        let result = fx.handler.read(&fx.attempt).await;

        let error_msg = format!(
            "Could not read remote logs from log_group: {LOG_GROUP} log_stream: {}.",
            fx.stream
        );
        assert_eq!(result.text(), header(&fx.stream, &error_msg));
        assert!(result.metadata.end_of_log);
    }

    #[tokio::test]
    async fn read_wrong_log_group() {
        let fx = fixture();
        generate_log_events(
            &fx.store,
            "alternate_log_group",
            &fx.stream,
            vec![
                LogEvent::new(10_000, "First"),
                LogEvent::new(20_000, "Second"),
                LogEvent::new(30_000, "Third"),
            ],
        )
        .await;

        let result = fx.handler.read(&fx.attempt).await;

        let error_msg = format!(
            "Could not read remote logs from log_group: {LOG_GROUP} log_stream: {}.",
            fx.stream
        );
        assert_eq!(result.text(), header(&fx.stream, &error_msg));
    }

    #[tokio::test]
    async fn write_then_read_roundtrip() {
        let mut fx = fixture();
        fx.handler.set_context(&fx.attempt).await.unwrap();
        for i in 0..10 {
            fx.handler.handle(&i.to_string()).await.unwrap();
            fx.clock.advance(Duration::milliseconds(250));
        }
        assert_eq!(fx.handler.pending(), 10);
        fx.handler.close().await;
        assert_eq!(fx.handler.pending(), 0);

        let stored = fx.store.get_events(LOG_GROUP, &fx.stream).await.unwrap();
        let messages: Vec<_> = stored.iter().map(|e| e.message.clone()).collect();
        let expected: Vec<_> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(messages, expected);

        let text = fx.handler.read(&fx.attempt).await.text();
        assert!(text.contains("[2020-01-01 00:00:00,000] 0\n[2020-01-01 00:00:00,250] 1\n"));
    }

    #[tokio::test]
    async fn flush_sorts_buffer_before_emit() {
        let mut fx = fixture();
        fx.handler.set_context(&fx.attempt).await.unwrap();
        fx.handler.handle("late").await.unwrap();
        fx.clock.advance(Duration::seconds(-5));
        fx.handler.handle("early").await.unwrap();

        assert!(fx.handler.flush().await);

        let stored = fx.store.get_events(LOG_GROUP, &fx.stream).await.unwrap();
        assert_eq!(stored[0].message, "early");
        assert_eq!(stored[1].message, "late");
    }

    #[tokio::test]
    async fn flush_splits_into_batches() {
        let fx = fixture();
        let mut handler = LogStreamTaskHandler::with_clock(
            fx.store.clone(),
            fx.clock.clone(),
            LOG_GROUP,
            LogFilenameTemplate::default(),
        )
        .with_max_batch_events(3);
        handler.set_context(&fx.attempt).await.unwrap();
        for i in 0..7 {
            handler.handle(&format!("line {i}")).await.unwrap();
            fx.clock.advance(Duration::milliseconds(1));
        }
        assert!(handler.flush().await);

        let stored = fx.store.get_events(LOG_GROUP, &fx.stream).await.unwrap();
        assert_eq!(stored.len(), 7);
        assert_eq!(stored[6].message, "line 6");
        assert_eq!(handler.pending(), 0);
    }

    #[tokio::test]
    async fn close_prevents_duplicate_emits() {
        let mut fx = fixture();
        fx.handler.set_context(&fx.attempt).await.unwrap();
        fx.handler.handle("once").await.unwrap();
        for _ in 0..5 {
            fx.handler.close().await;
        }
        // close 後の行は捨てられ、次の試行にも前の試行にも送られない
        fx.handler.handle("after close").await.unwrap();
        assert_eq!(fx.handler.pending(), 0);
        fx.handler.close().await;

        let mut next = fx.attempt.clone();
        next.try_number = 2;
        fx.handler.set_context(&next).await.unwrap();
        fx.handler.close().await;

        let stored = fx.store.get_events(LOG_GROUP, &fx.stream).await.unwrap();
        assert_eq!(stored, vec![LogEvent::new(1_577_836_800_000, "once")]);
    }

    #[tokio::test]
    async fn lines_without_context_are_dropped() {
        let mut fx = fixture();
        fx.handler.handle("nowhere").await.unwrap();
        assert_eq!(fx.handler.pending(), 0);
    }

    #[test]
    fn from_config_parses_log_group_arn() {
        let config = RemoteLogConfig {
            log_group: Some(format!("arn:aws:logs:us-west-2:11111111:log-group:{LOG_GROUP}")),
            ..RemoteLogConfig::default()
        };
        let handler =
            LogStreamTaskHandler::from_config(InMemoryLogStreamStore::new(), &config).unwrap();
        assert_eq!(handler.log_group(), LOG_GROUP);

        let missing = RemoteLogConfig::default();
        assert!(matches!(
            LogStreamTaskHandler::from_config(InMemoryLogStreamStore::new(), &missing),
            Err(ConfigError::MissingSetting("log_group"))
        ));
    }
}
