//! Bounded write-through journal.
//!
//! # Invariants
//! - Memory never holds more than `max_entries` entries; the oldest go first.
//! - Every append persists the full list.
//! - Loading tolerates malformed payloads instead of failing.

use crate::kv::KeyValueStore;
use crate::model::journal::{LogEntry, LogLevel};
use crate::storage::namespacer::Namespacer;
use chrono::Utc;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Key (before prefixing) holding the journal.
pub const LOGS_KEY: &str = "logs";
/// Default number of retained entries.
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 100;

/// Journal instance owning its in-memory entries and persisted copy.
pub struct LogStore<S: KeyValueStore> {
    namespacer: Arc<Namespacer<S>>,
    max_entries: usize,
    entries: Mutex<Vec<LogEntry>>,
}

impl<S: KeyValueStore> LogStore<S> {
    /// Loads previously persisted entries and returns a ready journal.
    ///
    /// `max_entries` of 0 is treated as 1.
    pub fn open(namespacer: Arc<Namespacer<S>>, max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        let mut entries = load_entries(&namespacer);
        truncate_to_latest(&mut entries, max_entries);

        Self {
            namespacer,
            max_entries,
            entries: Mutex::new(entries),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Appends an entry stamped with the current time and persists the list.
    pub fn log(&self, level: LogLevel, message: impl Into<String>, context: Option<Value>) {
        let mut entries = self.lock();
        entries.push(LogEntry::new(level, message, context));
        truncate_to_latest(&mut entries, self.max_entries);
        self.namespacer.set(LOGS_KEY, &*entries);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message, None);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message, None);
    }

    pub fn error(&self, message: impl Into<String>, context: Option<Value>) {
        self.log(LogLevel::Error, message, context);
    }

    /// Snapshot of the current entries, oldest first.
    pub fn logs(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every entry, in memory and in storage.
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        self.namespacer.remove(LOGS_KEY);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_entries<S: KeyValueStore>(namespacer: &Namespacer<S>) -> Vec<LogEntry> {
    let Value::Array(items) = namespacer.get(LOGS_KEY, Value::Array(Vec::new())) else {
        namespacer.report_decode_failure(LOGS_KEY, "persisted journal is not an array");
        return Vec::new();
    };

    let now = Utc::now();
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match LogEntry::from_persisted(item, now) {
            Ok(entry) => Some(entry),
            Err(err) => {
                namespacer.report_decode_failure(LOGS_KEY, format!("entry {index}: {err}"));
                None
            }
        })
        .collect()
}

fn truncate_to_latest(entries: &mut Vec<LogEntry>, max_entries: usize) {
    if entries.len() > max_entries {
        let excess = entries.len() - max_entries;
        entries.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::{truncate_to_latest, LogStore};
    use crate::kv::MemoryKeyValueStore;
    use crate::model::journal::{LogEntry, LogLevel};
    use crate::storage::namespacer::Namespacer;
    use std::sync::Arc;

    #[test]
    fn truncate_keeps_latest_in_order() {
        let mut entries = (0..5)
            .map(|i| LogEntry::new(LogLevel::Info, i.to_string(), None))
            .collect::<Vec<_>>();
        truncate_to_latest(&mut entries, 3);

        let messages = entries.iter().map(|e| e.message.as_str()).collect::<Vec<_>>();
        assert_eq!(messages, vec!["2", "3", "4"]);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let ns = Arc::new(Namespacer::new(MemoryKeyValueStore::new(), "t_"));
        let store = LogStore::open(ns, 0);
        store.info("a");
        store.info("b");

        assert_eq!(store.max_entries(), 1);
        assert_eq!(store.logs()[0].message, "b");
    }
}
