//! Task attempt identity.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One execution try of a task inside a workflow run.
///
/// Everything a handler needs to derive a remote log location lives here.
/// `raw` attempts (e.g. a task re-executed in a subprocess that already has a
/// parent handler) write nothing locally and never upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAttempt {
    pub workflow_id: String,
    pub task_id: String,
    pub execution_date: DateTime<Utc>,
    pub try_number: u32,
    #[serde(default)]
    pub raw: bool,
}

impl TaskAttempt {
    pub fn new(
        workflow_id: impl Into<String>,
        task_id: impl Into<String>,
        execution_date: DateTime<Utc>,
        try_number: u32,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            task_id: task_id.into(),
            execution_date,
            try_number,
            raw: false,
        }
    }

    /// Same attempt, marked raw.
    pub fn into_raw(mut self) -> Self {
        self.raw = true;
        self
    }

    /// `execution_date` the way it appears in rendered keys (`2020-01-01T00:00:00+00:00`).
    ///
    /// Sub-second dates always carry six fractional digits; nanoseconds are truncated.
    pub fn execution_date_key(&self) -> String {
        let format = if self.execution_date.timestamp_subsec_micros() == 0 {
            SecondsFormat::Secs
        } else {
            SecondsFormat::Micros
        };
        self.execution_date.to_rfc3339_opts(format, false)
    }
}

impl fmt::Display for TaskAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}@{} try={}",
            self.workflow_id,
            self.task_id,
            self.execution_date_key(),
            self.try_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    #[rstest]
    #[case::whole_second(Duration::zero(), "2020-01-01T00:00:00+00:00")]
    #[case::millis(Duration::milliseconds(123), "2020-01-01T00:00:00.123000+00:00")]
    #[case::micros(Duration::microseconds(123_456), "2020-01-01T00:00:00.123456+00:00")]
    #[case::nanos_truncated(Duration::nanoseconds(123_456_789), "2020-01-01T00:00:00.123456+00:00")]
    #[case::sub_micro_only(Duration::nanoseconds(999), "2020-01-01T00:00:00+00:00")]
    fn execution_date_key_uses_explicit_offset(#[case] offset: Duration, #[case] expected: &str) {
        let date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + offset;
        let attempt = TaskAttempt::new("wf", "task", date, 1);
        assert_eq!(attempt.execution_date_key(), expected);
    }

    #[test]
    fn into_raw_keeps_identity() {
        let date = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
        let attempt = TaskAttempt::new("wf", "task", date, 3);
        let raw = attempt.clone().into_raw();
        assert!(raw.raw);
        assert!(!attempt.raw);
        assert_eq!(raw.to_string(), attempt.to_string());
    }
}
