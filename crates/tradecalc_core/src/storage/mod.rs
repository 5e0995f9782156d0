//! Namespaced JSON storage on top of a raw key-value backend.
//!
//! # Responsibility
//! - Isolate this application's keys behind one prefix.
//! - Contain serialization/backend failures and route them to an
//!   injectable diagnostic sink.
//!
//! # Invariants
//! - No namespacer operation returns an error to its caller.
//! - `clear_all` never touches keys outside the prefix.

pub mod diagnostics;
pub mod namespacer;
