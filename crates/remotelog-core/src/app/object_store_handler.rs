//! ObjectStoreTaskHandler - タスク試行のログをオブジェクトストアに保存・読み戻す
//!
//! # 流れ
//! - 実行中はローカルファイル（`<base_log_folder>/<key>`）に書く
//! - `close()` でローカルファイルの中身を `<remote_base>/<key>` に追記アップロード
//! - `read()` はリモートを優先し、なければローカルファイルにフォールバック
//!
//! # エラーの扱い
//! - read 系: 失敗は `RemoteRead::Diagnostic` として本文に埋め込む
//! - write 系: error ログを出して `false` を返す
//! - exists: どんな失敗でも `false`

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::app::handler::TaskLogHandler;
use crate::config::RemoteLogConfig;
use crate::domain::{
    ConfigError, HandlerError, LogFilenameTemplate, LogLocationKey, ReadResult, RemoteRead,
    RemoteUrl, TaskAttempt,
};
use crate::ports::ObjectStore;

/// `set_context` で確定する、現在の試行の書き込み先
struct AttemptContext {
    key: LogLocationKey,
    local_path: PathBuf,
    file: Option<File>,
    upload_on_close: bool,
}

pub struct ObjectStoreTaskHandler<S> {
    store: S,
    base_log_folder: PathBuf,
    remote_base: RemoteUrl,
    template: LogFilenameTemplate,
    delete_local_copy: bool,
    context: Option<AttemptContext>,
    closed: bool,
}

impl<S: ObjectStore> ObjectStoreTaskHandler<S> {
    pub fn new(
        store: S,
        base_log_folder: impl Into<PathBuf>,
        remote_base: RemoteUrl,
        template: LogFilenameTemplate,
    ) -> Self {
        Self {
            store,
            base_log_folder: base_log_folder.into(),
            remote_base,
            template,
            delete_local_copy: false,
            context: None,
            closed: false,
        }
    }

    pub fn from_config(store: S, config: &RemoteLogConfig) -> Result<Self, ConfigError> {
        let remote_base = config
            .remote_base()
            .ok_or(ConfigError::MissingSetting("remote_base_log_folder"))?
            .map_err(ConfigError::InvalidRemoteBase)?;
        let template = config.filename_template()?;
        Ok(Self::new(store, &config.base_log_folder, remote_base, template)
            .with_delete_local_copy(config.delete_local_copy))
    }

    /// アップロード成功後にローカルファイルを消すかどうか
    pub fn with_delete_local_copy(mut self, delete_local_copy: bool) -> Self {
        self.delete_local_copy = delete_local_copy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// `set_context` 済みで、かつ raw でなければ true
    pub fn upload_on_close(&self) -> bool {
        self.context
            .as_ref()
            .is_some_and(|context| context.upload_on_close)
    }

    pub fn remote_location(&self, attempt: &TaskAttempt) -> RemoteUrl {
        self.remote_base.join(self.template.render(attempt).as_str())
    }

    pub fn local_path(&self, attempt: &TaskAttempt) -> PathBuf {
        self.base_log_folder.join(self.template.render(attempt).as_str())
    }

    pub async fn log_exists(&self, url: &RemoteUrl) -> bool {
        match self.store.head(url).await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(location = %url, error = %err, "remote log not available");
                false
            }
        }
    }

    /// 本文を取得する。失敗時は診断メッセージ（error ログも出す）。
    pub async fn remote_read(&self, url: &RemoteUrl) -> RemoteRead {
        match self.store.get(url).await {
            Ok(body) => RemoteRead::Content(String::from_utf8_lossy(&body).into_owned()),
            Err(err) => {
                let msg = format!("Could not read logs from {url} with error: {err}");
                tracing::error!(location = %url, error = %err, "{msg}");
                RemoteRead::Diagnostic(msg)
            }
        }
    }

    /// `text` を `url` に書く。`append` かつ既存ログがあれば改行で連結する。
    ///
    /// 失敗は error ログに出して `false` を返す（呼び出し側には伝播しない）。
    pub async fn write(&self, text: &str, url: &RemoteUrl, append: bool) -> bool {
        let old = if append && self.log_exists(url).await {
            match self.remote_read(url).await {
                RemoteRead::Content(old) => old,
                // 読めなかった既存ログは空とみなし、診断文は保存しない
                RemoteRead::Diagnostic(_) => String::new(),
            }
        } else {
            String::new()
        };
        let body = if old.is_empty() {
            text.to_string()
        } else {
            format!("{old}\n{text}")
        };

        match self.store.put(url, body.into_bytes()).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(location = %url, error = %err, "Could not write logs to {url}");
                false
            }
        }
    }

    pub async fn read(&self, attempt: &TaskAttempt) -> ReadResult {
        let url = self.remote_location(attempt);
        if self.log_exists(&url).await {
            let remote = self.remote_read(&url).await;
            return ReadResult::finished(format!(
                "*** Reading remote log from {url}.\n{}\n",
                remote.as_text()
            ));
        }

        let local_path = self.local_path(attempt);
        match fs::read_to_string(&local_path).await {
            Ok(content) => ReadResult::finished(format!(
                "*** Reading local file: {}\n{content}",
                local_path.display()
            )),
            Err(_) => ReadResult::finished(format!("*** Log file does not exist: {url}\n")),
        }
    }

    async fn open_local(&self, path: &Path) -> Result<File, HandlerError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(File::create(path).await?)
    }

    async fn upload_local(&self, context: &AttemptContext) {
        let content = match fs::read_to_string(&context.local_path).await {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(
                    path = %context.local_path.display(),
                    error = %err,
                    "local log file missing at close; nothing to upload"
                );
                return;
            }
        };
        let url = self.remote_base.join(context.key.as_str());
        let uploaded = self.write(&content, &url, true).await;
        if uploaded
            && self.delete_local_copy
            && let Err(err) = fs::remove_file(&context.local_path).await
        {
            tracing::warn!(path = %context.local_path.display(), error = %err, "failed to delete local log copy");
        }
    }
}

#[async_trait]
impl<S: ObjectStore> TaskLogHandler for ObjectStoreTaskHandler<S> {
    async fn set_context(&mut self, attempt: &TaskAttempt) -> Result<(), HandlerError> {
        let key = self.template.render(attempt);
        let local_path = self.base_log_folder.join(key.as_str());
        // raw 試行はローカルにもリモートにも書かない
        let file = if attempt.raw {
            None
        } else {
            Some(self.open_local(&local_path).await?)
        };
        self.context = Some(AttemptContext {
            key,
            local_path,
            file,
            upload_on_close: !attempt.raw,
        });
        self.closed = false;
        Ok(())
    }

    async fn handle(&mut self, line: &str) -> Result<(), HandlerError> {
        if let Some(file) = self.context.as_mut().and_then(|context| context.file.as_mut()) {
            file.write_all(line.as_bytes()).await?;
            file.write_all(b"\n").await?;
            // read() のローカルフォールバックから見えるようにする
            file.flush().await?;
        }
        Ok(())
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let Some(mut context) = self.context.take() else {
            return;
        };
        if let Some(mut file) = context.file.take()
            && let Err(err) = file.flush().await
        {
            tracing::warn!(path = %context.local_path.display(), error = %err, "failed to flush local log file");
        }
        if context.upload_on_close {
            self.upload_local(&context).await;
        }
    }

    async fn read(&self, attempt: &TaskAttempt) -> ReadResult {
        ObjectStoreTaskHandler::read(self, attempt).await
    }
}
