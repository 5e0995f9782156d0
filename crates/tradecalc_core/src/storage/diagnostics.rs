//! Diagnostic channel for contained storage failures.

use log::error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

/// Namespacer operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOperation {
    Get,
    Set,
    Remove,
    Has,
    ClearAll,
    /// A persisted payload was readable but partly unusable.
    Decode,
}

impl StorageOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Remove => "remove",
            Self::Has => "has",
            Self::ClearAll => "clear_all",
            Self::Decode => "decode",
        }
    }
}

/// One swallowed storage failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDiagnostic {
    pub operation: StorageOperation,
    /// Fully namespaced key, or the bare prefix for `ClearAll`.
    pub key: String,
    pub error: String,
}

impl Display for StorageDiagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "storage {} failed for `{}`: {}",
            self.operation.as_str(),
            self.key,
            self.error
        )
    }
}

/// Receiver for failures the storage layer degrades instead of returning.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: StorageDiagnostic);
}

/// Forwards diagnostics to the process logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnosticSink;

impl DiagnosticSink for LogDiagnosticSink {
    fn report(&self, diagnostic: StorageDiagnostic) {
        error!(
            "event=storage_failure module=storage status=error op={} key={} error={}",
            diagnostic.operation.as_str(),
            diagnostic.key,
            diagnostic.error
        );
    }
}

/// Keeps every diagnostic in memory; useful for assertions and UI panels.
#[derive(Debug, Default)]
pub struct MemoryDiagnosticSink {
    entries: Mutex<Vec<StorageDiagnostic>>,
}

impl MemoryDiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<StorageDiagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DiagnosticSink for MemoryDiagnosticSink {
    fn report(&self, diagnostic: StorageDiagnostic) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}
