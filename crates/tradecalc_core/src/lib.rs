//! Core persistence and service logic for the trading calculator.
//! This crate owns every business rule; CLI and FFI crates only wire it up.

pub mod config;
pub mod context;
pub mod db;
pub mod journal;
pub mod kv;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use config::{AppConfig, ConfigError};
pub use context::{AppContext, SharedStore};
pub use journal::log_store::{LogStore, DEFAULT_MAX_LOG_ENTRIES, LOGS_KEY};
pub use kv::{KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::journal::{LogEntry, LogLevel};
pub use model::response::ApiResponse;
pub use model::trade::{InputData, StoredData};
pub use repo::record_repo::{
    MemoryRecordRepository, NamespacedRecordRepository, RecordRepository, RECORDS_KEY,
};
pub use service::mock_api::{MockApiService, DEFAULT_LATENCY};
pub use storage::diagnostics::{
    DiagnosticSink, LogDiagnosticSink, MemoryDiagnosticSink, StorageDiagnostic, StorageOperation,
};
pub use storage::namespacer::{Namespacer, DEFAULT_NAMESPACE_PREFIX};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
