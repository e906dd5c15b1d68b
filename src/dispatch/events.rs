//! Per-call diagnostic log.
//!
//! The dispatcher records what happened on each branch into a [`CallLog`]
//! returned alongside the result. Nothing is written anywhere until the
//! caller asks for it with [`CallLog::emit`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEvent {
    pub level: EventLevel,
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Ordered events recorded during one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallLog {
    events: Vec<CallEvent>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, level: EventLevel, message: impl Into<String>) {
        self.events.push(CallEvent {
            level,
            at: Utc::now(),
            message: message.into(),
        });
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.record(EventLevel::Debug, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(EventLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(EventLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(EventLevel::Error, message);
    }

    pub fn events(&self) -> &[CallEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Any event at `level` or above whose message contains `needle`.
    pub fn contains(&self, level: EventLevel, needle: &str) -> bool {
        self.events
            .iter()
            .any(|e| e.level >= level && e.message.contains(needle))
    }

    /// Forward every event to `tracing`, tagged with server and tool.
    pub fn emit(&self, server: &str, tool: &str) {
        for event in &self.events {
            match event.level {
                EventLevel::Debug => tracing::debug!(server, tool, "{}", event.message),
                EventLevel::Info => tracing::info!(server, tool, "{}", event.message),
                EventLevel::Warn => tracing::warn!(server, tool, "{}", event.message),
                EventLevel::Error => tracing::error!(server, tool, "{}", event.message),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_events_keep_order() {
        let mut log = CallLog::new();
        log.debug("first");
        log.warn("second");
        let messages: Vec<_> = log.events().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn test_contains_respects_level() {
        let mut log = CallLog::new();
        log.info("timer armed");
        assert!(log.contains(EventLevel::Debug, "timer"));
        assert!(log.contains(EventLevel::Info, "timer"));
        assert!(!log.contains(EventLevel::Warn, "timer"));
    }

    #[traced_test]
    #[test]
    fn test_emit_forwards_to_tracing() {
        let mut log = CallLog::new();
        log.warn("cancellation notification failed");
        log.emit("files", "read_file");
        assert!(logs_contain("cancellation notification failed"));
        assert!(logs_contain("read_file"));
    }

    #[traced_test]
    #[test]
    fn test_nothing_logged_until_emit() {
        let mut log = CallLog::new();
        log.error("kept quiet");
        assert!(!logs_contain("kept quiet"));
    }
}
