//! Record storage strategies.
//!
//! # Responsibility
//! - Define the load/save contract for saved calculations.
//! - Keep key-value layout details out of the service layer.
//!
//! # Invariants
//! - Repositories never validate input; that is the service's job.
//! - Counters derive only from the last stored record.

pub mod record_repo;
