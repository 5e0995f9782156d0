//! Wiring of one application instance from [`AppConfig`].
//!
//! # Invariants
//! - Journal, record repository and service share one namespacer, and so one
//!   backend and one diagnostic sink.
//! - Nothing here is process-global; independent contexts never share state
//!   unless they share a backend.

use crate::config::AppConfig;
use crate::journal::log_store::LogStore;
use crate::kv::{KeyValueStore, KvResult, MemoryKeyValueStore, SqliteKeyValueStore};
use crate::repo::record_repo::NamespacedRecordRepository;
use crate::service::mock_api::MockApiService;
use crate::storage::diagnostics::{DiagnosticSink, LogDiagnosticSink};
use crate::storage::namespacer::Namespacer;
use log::info;
use std::sync::Arc;

/// Backend handle shared by every component of a context.
pub type SharedStore = Arc<dyn KeyValueStore>;

pub type AppNamespacer = Namespacer<SharedStore>;
pub type AppRecordRepository = NamespacedRecordRepository<SharedStore>;
pub type AppService = MockApiService<AppRecordRepository>;
pub type AppJournal = LogStore<SharedStore>;

/// Fully wired calculator backend.
pub struct AppContext {
    namespacer: Arc<AppNamespacer>,
    journal: AppJournal,
    service: AppService,
}

impl AppContext {
    /// Opens the configured backend (SQLite file or memory) and wires all
    /// components, reporting storage failures to the process logger.
    pub fn open(config: &AppConfig) -> KvResult<Self> {
        let store: SharedStore = match &config.db_path {
            Some(path) => Arc::new(SqliteKeyValueStore::open(path)?),
            None => Arc::new(MemoryKeyValueStore::new()),
        };
        info!(
            "event=context_open module=context status=ok backend={} prefix={}",
            if config.db_path.is_some() { "sqlite" } else { "memory" },
            config.namespace_prefix
        );
        Ok(Self::with_store(config, store, Arc::new(LogDiagnosticSink)))
    }

    /// Wires components over an existing backend and sink.
    pub fn with_store(
        config: &AppConfig,
        store: SharedStore,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let namespacer = Arc::new(Namespacer::with_sink(
            store,
            config.namespace_prefix.clone(),
            sink,
        ));
        let journal = LogStore::open(Arc::clone(&namespacer), config.max_log_entries);
        let repo = NamespacedRecordRepository::new(Arc::clone(&namespacer));
        let service = MockApiService::with_latency(repo, config.latency());

        Self {
            namespacer,
            journal,
            service,
        }
    }

    pub fn namespacer(&self) -> &AppNamespacer {
        &self.namespacer
    }

    pub fn journal(&self) -> &AppJournal {
        &self.journal
    }

    pub fn service(&self) -> &AppService {
        &self.service
    }
}
