//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the calculator service and journal to Dart via FRB.
//! - Own the single process-wide `AppContext` the UI talks to.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Service calls resolve to response envelopes, never errors.
//! - Sync functions return an empty string on success and a message on
//!   failure.

use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tokio::runtime::{Builder, Runtime};
use tradecalc_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ApiResponse, AppConfig, AppContext, InputData, LogEntry, LogLevel, StoredData,
};

const DEFAULT_DB_FILE_NAME: &str = "tradecalc.sqlite3";

static APP_CONTEXT: Mutex<Option<Arc<AppContext>>> = Mutex::new(None);
static RUNTIME: OnceLock<Result<Runtime, String>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust process logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling logs.
/// - Idempotent for the same pair; conflicting calls return an error.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One saved calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorRecord {
    pub counter: u64,
    pub price: f64,
    pub quantity: f64,
    pub total: f64,
}

/// Envelope for `calculator_save`.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorSaveResponse {
    pub success: bool,
    pub message: String,
    /// Present only when the save was accepted.
    pub record: Option<CalculatorRecord>,
    pub timestamp_ms: i64,
}

/// Envelope for `calculator_load`.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorLoadResponse {
    pub success: bool,
    pub message: String,
    pub records: Vec<CalculatorRecord>,
    pub timestamp_ms: i64,
}

/// Journal entry flattened for Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntryItem {
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
    /// `info|warn|error`.
    pub level: String,
    pub message: String,
    /// JSON-encoded context, when one was attached.
    pub context_json: Option<String>,
}

/// Saves one calculation through the mock remote service.
///
/// # FFI contract
/// - Async; resolves after the configured latency.
/// - Odd totals resolve with `success=false` and no record.
pub async fn calculator_save(price: f64, quantity: f64, total: f64) -> CalculatorSaveResponse {
    let input = InputData::new(price, quantity, total);
    match run_on_service(move |context| async move { context.service().save(input).await }).await
    {
        Ok(response) => to_save_response(response),
        Err(err) => CalculatorSaveResponse {
            success: false,
            message: format!("calculator_save failed: {err}"),
            record: None,
            timestamp_ms: now_ms(),
        },
    }
}

/// Loads every saved calculation through the mock remote service.
pub async fn calculator_load() -> CalculatorLoadResponse {
    match run_on_service(|context| async move { context.service().load().await }).await {
        Ok(response) => CalculatorLoadResponse {
            success: response.success,
            message: response.message.unwrap_or_default(),
            records: response
                .data
                .unwrap_or_default()
                .iter()
                .map(to_record)
                .collect(),
            timestamp_ms: response.timestamp,
        },
        Err(err) => CalculatorLoadResponse {
            success: false,
            message: format!("calculator_load failed: {err}"),
            records: Vec::new(),
            timestamp_ms: now_ms(),
        },
    }
}

/// Appends one journal entry.
///
/// `context_json`, when present, must be valid JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_log(level: String, message: String, context_json: Option<String>) -> String {
    let Some(parsed_level) = LogLevel::parse(&level) else {
        return format!("journal_log failed: unsupported level `{level}`");
    };
    let context = match context_json.as_deref().map(serde_json::from_str::<Value>) {
        None => None,
        Some(Ok(value)) => Some(value),
        Some(Err(err)) => return format!("journal_log failed: invalid context JSON: {err}"),
    };

    match app_context() {
        Ok(app) => {
            app.journal().log(parsed_level, message, context);
            String::new()
        }
        Err(err) => format!("journal_log failed: {err}"),
    }
}

/// Returns the journal, oldest first. Empty when the context cannot open.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_entries() -> Vec<JournalEntryItem> {
    match app_context() {
        Ok(app) => app.journal().logs().iter().map(to_journal_item).collect(),
        Err(err) => {
            log::error!("event=journal_entries module=ffi status=error error={err}");
            Vec::new()
        }
    }
}

/// Clears the journal in memory and storage.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_clear() -> String {
    match app_context() {
        Ok(app) => {
            app.journal().clear();
            String::new()
        }
        Err(err) => format!("journal_clear failed: {err}"),
    }
}

/// Removes every key owned by this application from storage.
///
/// The in-memory journal is cleared too so it cannot resurrect entries on
/// its next append.
#[flutter_rust_bridge::frb(sync)]
pub fn storage_clear_all() -> String {
    match app_context() {
        Ok(app) => {
            app.journal().clear();
            app.namespacer().clear_all();
            String::new()
        }
        Err(err) => format!("storage_clear_all failed: {err}"),
    }
}

async fn run_on_service<F, Fut, T>(call: F) -> Result<T, String>
where
    F: FnOnce(Arc<AppContext>) -> Fut,
    Fut: std::future::Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let context = app_context()?;
    let runtime = runtime()?;
    runtime
        .spawn(call(context))
        .await
        .map_err(|err| format!("service task failed: {err}"))
}

fn app_context() -> Result<Arc<AppContext>, String> {
    let mut slot = APP_CONTEXT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(context) = slot.as_ref() {
        return Ok(Arc::clone(context));
    }

    let config = resolve_config()?;
    let context = Arc::new(
        AppContext::open(&config).map_err(|err| format!("storage open failed: {err}"))?,
    );
    *slot = Some(Arc::clone(&context));
    Ok(context)
}

fn resolve_config() -> Result<AppConfig, String> {
    let mut config = AppConfig::load(None).map_err(|err| err.to_string())?;
    if config.db_path.is_none() {
        config.db_path = Some(default_db_path());
    }
    Ok(config)
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

fn runtime() -> Result<&'static Runtime, String> {
    RUNTIME
        .get_or_init(|| {
            Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("tradecalc-service")
                .enable_time()
                .build()
                .map_err(|err| format!("failed to start service runtime: {err}"))
        })
        .as_ref()
        .map_err(Clone::clone)
}

fn to_save_response(response: ApiResponse<StoredData>) -> CalculatorSaveResponse {
    CalculatorSaveResponse {
        success: response.success,
        message: response.message.unwrap_or_default(),
        record: response.data.as_ref().map(to_record),
        timestamp_ms: response.timestamp,
    }
}

fn to_record(stored: &StoredData) -> CalculatorRecord {
    CalculatorRecord {
        counter: stored.counter,
        price: stored.price,
        quantity: stored.quantity,
        total: stored.total,
    }
}

fn to_journal_item(entry: &LogEntry) -> JournalEntryItem {
    JournalEntryItem {
        timestamp: entry.timestamp.to_rfc3339(),
        level: entry.level.as_str().to_string(),
        message: entry.message.clone(),
        context_json: entry.context.as_ref().map(Value::to_string),
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}
