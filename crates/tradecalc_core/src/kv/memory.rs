//! In-process key-value backend.

use super::{KeyValueStore, KvError, KvResult};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Map-backed store, optionally bounded by a byte quota.
///
/// The quota counts `key.len() + value.len()` over all entries, which is
/// how browsers account local storage usage.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose `set_item` fails once usage would exceed
    /// `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Current usage in bytes.
    pub fn used_bytes(&self) -> usize {
        self.lock()
            .iter()
            .map(|(key, value)| entry_size(key, value))
            .sum()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // Entries are replaced whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> KvResult<()> {
        let mut entries = self.lock();

        if let Some(quota_bytes) = self.quota_bytes {
            let current: usize = entries
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(existing, stored)| entry_size(existing, stored))
                .sum();
            let required_bytes = current + entry_size(key, value);
            if required_bytes > quota_bytes {
                return Err(KvError::QuotaExceeded {
                    key: key.to_string(),
                    required_bytes,
                    quota_bytes,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> KvResult<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        Ok(self.lock().keys().cloned().collect())
    }
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

#[cfg(test)]
mod tests {
    use super::MemoryKeyValueStore;
    use crate::kv::{KeyValueStore, KvError};

    #[test]
    fn set_get_remove_cycle() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get_item("a").unwrap(), None);

        store.set_item("a", "1").unwrap();
        store.set_item("a", "2").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("2"));

        store.remove_item("a").unwrap();
        assert_eq!(store.get_item("a").unwrap(), None);
        store.remove_item("a").unwrap();
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_previous_value() {
        let store = MemoryKeyValueStore::with_quota(10);
        store.set_item("k", "12345").unwrap();

        let err = store.set_item("k", "0123456789").unwrap_err();
        assert!(matches!(
            err,
            KvError::QuotaExceeded {
                required_bytes: 11,
                quota_bytes: 10,
                ..
            }
        ));
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("12345"));
        assert_eq!(store.used_bytes(), 6);
    }

    #[test]
    fn replacing_a_value_does_not_double_count_quota() {
        let store = MemoryKeyValueStore::with_quota(6);
        store.set_item("k", "12345").unwrap();
        store.set_item("k", "54321").unwrap();
        assert_eq!(store.used_bytes(), 6);
    }
}
