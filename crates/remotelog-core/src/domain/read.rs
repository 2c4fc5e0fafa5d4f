//! Read results returned by the task log handlers.

use serde::{Deserialize, Serialize};

/// Metadata returned alongside rendered log text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMetadata {
    /// No further content will be appended for this task attempt.
    pub end_of_log: bool,
}

impl LogMetadata {
    pub fn finished() -> Self {
        Self { end_of_log: true }
    }
}

/// One rendered text block. `source` names where it came from (host, store);
/// the remote handlers leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogBlock {
    pub source: String,
    pub text: String,
}

/// What `read(attempt)` hands back to a log viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResult {
    pub blocks: Vec<LogBlock>,
    pub metadata: LogMetadata,
}

impl ReadResult {
    /// A single anonymous block, log finished.
    pub fn finished(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![LogBlock {
                source: String::new(),
                text: text.into(),
            }],
            metadata: LogMetadata::finished(),
        }
    }

    /// All block texts concatenated.
    pub fn text(&self) -> String {
        self.blocks.iter().map(|block| block.text.as_str()).collect()
    }
}

/// Outcome of fetching remote log content.
///
/// Fetch failures are data, not errors: the diagnostic ends up in the text a
/// user sees, but callers can still tell it apart from real content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum RemoteRead {
    Content(String),
    Diagnostic(String),
}

impl RemoteRead {
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, RemoteRead::Diagnostic(_))
    }

    pub fn as_text(&self) -> &str {
        match self {
            RemoteRead::Content(text) | RemoteRead::Diagnostic(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            RemoteRead::Content(text) | RemoteRead::Diagnostic(text) => text,
        }
    }
}
