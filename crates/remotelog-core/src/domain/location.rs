//! Location - タスク試行からリモートの保存先を導出する
//!
//! # 学習ポイント
//! - テンプレートは生成時に一度だけ検証する（Fail-fast）
//! - 同じ試行は常に同じ key になる（決定的）
//! - `scheme://bucket/key` 形式の URL を型で表現する

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::attempt::TaskAttempt;
use super::errors::{ConfigError, StoreError};

pub const DEFAULT_LOG_FILENAME_TEMPLATE: &str =
    "{workflow_id}/{task_id}/{execution_date}/{try_number}.log";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    WorkflowId,
    TaskId,
    ExecutionDate,
    TryNumber,
}

/// LogFilenameTemplate はタスク試行から相対パス（LogLocationKey）を生成
///
/// # 使用例
/// ```ignore
/// let template = LogFilenameTemplate::parse("{task_id}/{try_number}.log")?;
/// let key = template.render(&attempt); // "my_task/1.log"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilenameTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl LogFilenameTemplate {
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let mut segments = Vec::new();
        let mut rest = source;
        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| ConfigError::UnterminatedPlaceholder(source.to_string()))?;
            let segment = match &after[..close] {
                "workflow_id" => Segment::WorkflowId,
                "task_id" => Segment::TaskId,
                "execution_date" => Segment::ExecutionDate,
                "try_number" => Segment::TryNumber,
                other => return Err(ConfigError::UnknownPlaceholder(other.to_string())),
            };
            segments.push(segment);
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn render(&self, attempt: &TaskAttempt) -> LogLocationKey {
        let mut key = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => key.push_str(text),
                Segment::WorkflowId => key.push_str(&attempt.workflow_id),
                Segment::TaskId => key.push_str(&attempt.task_id),
                Segment::ExecutionDate => key.push_str(&attempt.execution_date_key()),
                Segment::TryNumber => key.push_str(&attempt.try_number.to_string()),
            }
        }
        LogLocationKey(key)
    }
}

impl Default for LogFilenameTemplate {
    fn default() -> Self {
        let slash = || Segment::Literal("/".to_string());
        Self {
            source: DEFAULT_LOG_FILENAME_TEMPLATE.to_string(),
            segments: vec![
                Segment::WorkflowId,
                slash(),
                Segment::TaskId,
                slash(),
                Segment::ExecutionDate,
                slash(),
                Segment::TryNumber,
                Segment::Literal(".log".to_string()),
            ],
        }
    }
}

impl FromStr for LogFilenameTemplate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// タスク試行ごとの相対パス
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogLocationKey(String);

impl LogLocationKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Log-stream names may not contain ':'.
    pub fn stream_name(&self) -> String {
        self.0.replace(':', "_")
    }
}

impl fmt::Display for LogLocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// RemoteUrl は `scheme://bucket/key` 形式のオブジェクト URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteUrl {
    scheme: String,
    bucket: String,
    key: String,
}

impl RemoteUrl {
    pub fn parse(url: &str) -> Result<Self, StoreError> {
        let invalid = || StoreError::InvalidUrl(url.to_string());
        let (scheme, rest) = url.split_once("://").ok_or_else(invalid)?;
        if scheme.is_empty() {
            return Err(invalid());
        }
        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            scheme: scheme.to_string(),
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// `self` をフォルダとみなして相対パスを連結
    pub fn join(&self, relative: &str) -> Self {
        let base = self.key.trim_end_matches('/');
        let relative = relative.trim_start_matches('/');
        let key = if base.is_empty() {
            relative.to_string()
        } else {
            format!("{base}/{relative}")
        };
        Self {
            scheme: self.scheme.clone(),
            bucket: self.bucket.clone(),
            key,
        }
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}://{}", self.scheme, self.bucket)
        } else {
            write!(f, "{}://{}/{}", self.scheme, self.bucket, self.key)
        }
    }
}

impl FromStr for RemoteUrl {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
