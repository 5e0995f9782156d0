//! Application journal: a bounded, persisted list of structured entries
//! surfaced to the UI (separate from process diagnostics in `logging`).

pub mod log_store;
