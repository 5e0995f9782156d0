//! Prefix-isolating JSON wrapper over a [`KeyValueStore`].
//!
//! # Invariants
//! - Every stored key is `prefix + key`.
//! - Failures go to the diagnostic sink; callers get a default or nothing.

use crate::kv::KeyValueStore;
use crate::storage::diagnostics::{
    DiagnosticSink, LogDiagnosticSink, StorageDiagnostic, StorageOperation,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;

/// Prefix used when the application does not configure one.
pub const DEFAULT_NAMESPACE_PREFIX: &str = "trading_calculator_";

/// Application-scoped view of a shared key-value backend.
pub struct Namespacer<S: KeyValueStore> {
    store: S,
    prefix: String,
    sink: Arc<dyn DiagnosticSink>,
}

impl<S: KeyValueStore> Namespacer<S> {
    /// Creates a namespacer reporting failures to the process logger.
    pub fn new(store: S, prefix: impl Into<String>) -> Self {
        Self::with_sink(store, prefix, Arc::new(LogDiagnosticSink))
    }

    pub fn with_sink(store: S, prefix: impl Into<String>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            sink,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Underlying backend, for callers that need unprefixed access.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn namespaced_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    /// Serializes `value` as JSON and stores it. Failures are reported, not
    /// returned.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let full_key = self.namespaced_key(key);
        let result = serde_json::to_string(value)
            .map_err(|err| err.to_string())
            .and_then(|text| {
                self.store
                    .set_item(&full_key, &text)
                    .map_err(|err| err.to_string())
            });

        if let Err(err) = result {
            self.report(StorageOperation::Set, full_key, err);
        }
    }

    /// Reads and deserializes `key`, falling back to `default` when the key is
    /// absent or the payload cannot be decoded as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let full_key = self.namespaced_key(key);
        let Some(text) = self.read(&full_key) else {
            return default;
        };

        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(err) => {
                self.report(StorageOperation::Get, full_key, err);
                default
            }
        }
    }

    /// Stored text for `key` without decoding.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.read(&self.namespaced_key(key))
    }

    pub fn remove(&self, key: &str) {
        let full_key = self.namespaced_key(key);
        if let Err(err) = self.store.remove_item(&full_key) {
            self.report(StorageOperation::Remove, full_key, err);
        }
    }

    /// Whether `key` exists. A failing backend reads as "absent".
    pub fn has(&self, key: &str) -> bool {
        let full_key = self.namespaced_key(key);
        match self.store.get_item(&full_key) {
            Ok(value) => value.is_some(),
            Err(err) => {
                self.report(StorageOperation::Has, full_key, err);
                false
            }
        }
    }

    /// Removes every backend key under this prefix.
    pub fn clear_all(&self) {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(err) => {
                self.report(StorageOperation::ClearAll, self.prefix.clone(), err);
                return;
            }
        };

        for key in keys.into_iter().filter(|key| key.starts_with(&self.prefix)) {
            if let Err(err) = self.store.remove_item(&key) {
                self.report(StorageOperation::ClearAll, key, err);
            }
        }
    }

    /// Reports a failure detected by a layer above the namespacer.
    pub fn report_decode_failure(&self, key: &str, error: impl Display) {
        self.report(StorageOperation::Decode, self.namespaced_key(key), error);
    }

    fn read(&self, full_key: &str) -> Option<String> {
        match self.store.get_item(full_key) {
            Ok(value) => value,
            Err(err) => {
                self.report(StorageOperation::Get, full_key.to_string(), err);
                None
            }
        }
    }

    fn report(&self, operation: StorageOperation, key: String, error: impl Display) {
        self.sink.report(StorageDiagnostic {
            operation,
            key,
            error: error.to_string(),
        });
    }
}
