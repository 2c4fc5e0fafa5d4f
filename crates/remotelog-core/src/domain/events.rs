//! Log events stored in an append-only log stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single line in a log stream.
///
/// `timestamp` is milliseconds since the Unix epoch (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: i64,
    pub message: String,
}

impl LogEvent {
    pub fn new(timestamp: i64, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }

    pub fn at(time: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self::new(time.timestamp_millis(), message)
    }

    /// `[2020-01-01 00:00:00,000] message`
    ///
    /// Timestamps outside chrono's range fall back to the raw millisecond value.
    pub fn render(&self) -> String {
        match DateTime::<Utc>::from_timestamp_millis(self.timestamp) {
            Some(time) => format!("[{}] {}", time.format("%Y-%m-%d %H:%M:%S,%3f"), self.message),
            None => format!("[{}] {}", self.timestamp, self.message),
        }
    }
}

/// Stable sort by timestamp, ascending. Events with equal timestamps keep arrival order.
pub fn sort_chronologically(events: &mut [LogEvent]) {
    events.sort_by_key(|event| event.timestamp);
}

/// Sorted, rendered and newline-joined.
pub fn render_events(mut events: Vec<LogEvent>) -> String {
    sort_chronologically(&mut events);
    events
        .iter()
        .map(LogEvent::render)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::epoch_2020(1_577_836_800_000, "[2020-01-01 00:00:00,000] First")]
    #[case::millis(1_577_836_801_234, "[2020-01-01 00:00:01,234] First")]
    #[case::early(10_000, "[1970-01-01 00:00:10,000] First")]
    fn render_formats_utc_with_millis(#[case] timestamp: i64, #[case] expected: &str) {
        assert_eq!(LogEvent::new(timestamp, "First").render(), expected);
    }

    #[test]
    fn render_events_sorts_out_of_order_input() {
        let now = 1_700_000_000_000;
        let events = vec![
            LogEvent::new(now, "Third"),
            LogEvent::new(now - 2000, "First"),
            LogEvent::new(now - 1000, "Second"),
        ];

        let rendered = render_events(events);
        let messages: Vec<&str> = rendered
            .lines()
            .map(|line| line.split("] ").nth(1).unwrap())
            .collect();
        assert_eq!(messages, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn sort_is_stable_for_equal_timestamps() {
        let mut events = vec![
            LogEvent::new(5, "b"),
            LogEvent::new(1, "a"),
            LogEvent::new(5, "c"),
        ];
        sort_chronologically(&mut events);
        let messages: Vec<_> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
    }

    #[test]
    fn render_events_of_nothing_is_empty() {
        assert_eq!(render_events(vec![]), "");
    }
}
