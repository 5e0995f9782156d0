//! Saved-calculation repository contract and implementations.
//!
//! # Invariants
//! - `save` appends exactly one record whose counter is the last counter + 1,
//!   or 1 for an empty list.
//! - `load` never fails; absent or unreadable data loads as an empty list.
//!
//! Each `save` rewrites the whole list, which is fine for the small lists a
//! calculator produces. Saves through one repository instance are
//! serialized; two instances over the same backend can still compute the
//! same counter.

use crate::kv::KeyValueStore;
use crate::model::trade::{InputData, StoredData};
use crate::storage::namespacer::Namespacer;
use log::debug;
use std::sync::{Arc, Mutex, PoisonError};

/// Key (before prefixing) holding the record list.
pub const RECORDS_KEY: &str = "storage";

/// Storage strategy for saved calculations.
pub trait RecordRepository: Send + Sync {
    fn load(&self) -> Vec<StoredData>;
    fn save(&self, data: &InputData) -> StoredData;
}

impl<R: RecordRepository + ?Sized> RecordRepository for Arc<R> {
    fn load(&self) -> Vec<StoredData> {
        (**self).load()
    }

    fn save(&self, data: &InputData) -> StoredData {
        (**self).save(data)
    }
}

/// Records persisted as one JSON array through a [`Namespacer`].
pub struct NamespacedRecordRepository<S: KeyValueStore> {
    namespacer: Arc<Namespacer<S>>,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> NamespacedRecordRepository<S> {
    pub fn new(namespacer: Arc<Namespacer<S>>) -> Self {
        Self {
            namespacer,
            write_lock: Mutex::new(()),
        }
    }
}

impl<S: KeyValueStore> RecordRepository for NamespacedRecordRepository<S> {
    fn load(&self) -> Vec<StoredData> {
        match self.namespacer.get_raw(RECORDS_KEY) {
            Some(text) if !text.trim().is_empty() => {
                self.namespacer.get(RECORDS_KEY, Vec::new())
            }
            _ => Vec::new(),
        }
    }

    fn save(&self, data: &InputData) -> StoredData {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = self.load();
        let entry = StoredData::from_input(data, next_counter(&records));
        records.push(entry);
        self.namespacer.set(RECORDS_KEY, &records);

        debug!(
            "event=record_save module=repo status=ok counter={} records={}",
            entry.counter,
            records.len()
        );
        entry
    }
}

/// Records kept in process memory; for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryRecordRepository {
    records: Mutex<Vec<StoredData>>,
}

impl MemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<StoredData>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl RecordRepository for MemoryRecordRepository {
    fn load(&self) -> Vec<StoredData> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, data: &InputData) -> StoredData {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = StoredData::from_input(data, next_counter(&records));
        records.push(entry);
        entry
    }
}

/// Counter for the next record: last counter + 1, or 1 when empty.
pub fn next_counter(records: &[StoredData]) -> u64 {
    records.last().map_or(1, |last| last.counter + 1)
}

#[cfg(test)]
mod tests {
    use super::{next_counter, MemoryRecordRepository, RecordRepository};
    use crate::model::trade::{InputData, StoredData};

    #[test]
    fn next_counter_uses_last_record_only() {
        assert_eq!(next_counter(&[]), 1);

        let input = InputData::new(1.0, 2.0, 2.0);
        let records = vec![
            StoredData::from_input(&input, 9),
            StoredData::from_input(&input, 4),
        ];
        assert_eq!(next_counter(&records), 5);
    }

    #[test]
    fn memory_repository_continues_from_seeded_records() {
        let seeded = StoredData::from_input(&InputData::new(1.0, 2.0, 2.0), 41);
        let repo = MemoryRecordRepository::with_records(vec![seeded]);

        let saved = repo.save(&InputData::new(3.0, 2.0, 6.0));
        assert_eq!(saved.counter, 42);
        assert_eq!(repo.load(), vec![seeded, saved]);
    }
}
