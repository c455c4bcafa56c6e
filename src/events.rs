//! Observable event log for user-facing diagnostics.
//!
//! Collaborators record fallbacks, availability changes and mode switches
//! here; a UI or the CLI subscribes and renders them. Every entry is also
//! emitted through `tracing`.
//!
//! ## Design
//! - Newest entry first, bounded to [`MAX_EVENTS`]
//! - Subscribers get a `tokio::sync::broadcast` receiver; slow receivers
//!   lag rather than block the writer

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::broadcast;

/// Retained history size.
pub const MAX_EVENTS: usize = 100;

/// Broadcast channel capacity per subscriber.
const SUBSCRIBER_CAPACITY: usize = 64;

/// Severity of a recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl EventLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

/// A single recorded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub level: EventLevel,
    /// Component that produced the entry (e.g. "dialogue", "mode").
    pub source: String,
}

/// Bounded, subscribable event history.
pub struct EventLog {
    entries: Mutex<VecDeque<EventEntry>>,
    tx: broadcast::Sender<EventEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(SUBSCRIBER_CAPACITY);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(MAX_EVENTS)),
            tx,
        }
    }

    /// Record an event and notify subscribers.
    pub fn record(&self, level: EventLevel, source: &str, message: impl Into<String>) -> EventEntry {
        let entry = EventEntry {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            level,
            source: source.to_string(),
        };

        match level {
            EventLevel::Error => tracing::error!(source, "{}", entry.message),
            EventLevel::Warning => tracing::warn!(source, "{}", entry.message),
            EventLevel::Info | EventLevel::Success => tracing::info!(source, "{}", entry.message),
        }

        {
            let mut entries = self.entries.lock();
            entries.push_front(entry.clone());
            entries.truncate(MAX_EVENTS);
        }

        // No subscribers is fine.
        let _ = self.tx.send(entry.clone());
        entry
    }

    pub fn info(&self, source: &str, message: impl Into<String>) {
        self.record(EventLevel::Info, source, message);
    }

    pub fn warn(&self, source: &str, message: impl Into<String>) {
        self.record(EventLevel::Warning, source, message);
    }

    pub fn error(&self, source: &str, message: impl Into<String>) {
        self.record(EventLevel::Error, source, message);
    }

    pub fn success(&self, source: &str, message: impl Into<String>) {
        self.record(EventLevel::Success, source, message);
    }

    /// Snapshot of retained entries, newest first.
    pub fn entries(&self) -> Vec<EventEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Retained entries at the given level, newest first.
    pub fn entries_at(&self, level: EventLevel) -> Vec<EventEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Receive every entry recorded from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEntry> {
        self.tx.subscribe()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_entry_comes_first() {
        let log = EventLog::new();
        log.info("test", "first");
        log.warn("test", "second");
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[0].level, EventLevel::Warning);
        assert_eq!(entries[1].message, "first");
    }

    #[test]
    fn history_is_bounded() {
        let log = EventLog::new();
        for i in 0..(MAX_EVENTS + 25) {
            log.info("test", format!("event {i}"));
        }
        assert_eq!(log.len(), MAX_EVENTS);
        assert_eq!(log.entries()[0].message, format!("event {}", MAX_EVENTS + 24));
    }

    #[test]
    fn clear_empties_history() {
        let log = EventLog::new();
        log.error("test", "boom");
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn filter_by_level() {
        let log = EventLog::new();
        log.info("a", "one");
        log.success("b", "two");
        log.success("c", "three");
        let successes = log.entries_at(EventLevel::Success);
        assert_eq!(successes.len(), 2);
        assert!(successes.iter().all(|e| e.level == EventLevel::Success));
    }

    #[test]
    fn entries_have_unique_ids() {
        let log = EventLog::new();
        let a = log.record(EventLevel::Info, "x", "a");
        let b = log.record(EventLevel::Info, "x", "b");
        assert_ne!(a.id, b.id);
        assert_eq!(a.source, "x");
    }

    #[tokio::test]
    async fn subscribers_receive_new_entries() {
        let log = EventLog::new();
        log.info("test", "before subscribe");
        let mut rx = log.subscribe();
        log.warn("mode", "went offline");
        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.message, "went offline");
        assert_eq!(entry.source, "mode");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_string(&EventLevel::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
        assert_eq!(EventLevel::Success.as_str(), "success");
    }
}
