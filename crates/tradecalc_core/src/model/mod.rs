//! Domain records exchanged between the UI, the service and storage.
//!
//! # Invariants
//! - Persisted field names are part of the storage format and never change
//!   without a migration.

pub mod journal;
pub mod response;
pub mod trade;
