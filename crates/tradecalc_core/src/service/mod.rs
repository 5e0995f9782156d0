//! Use-case services consumed by the UI.
//!
//! # Responsibility
//! - Present storage through an asynchronous request/response surface.
//! - Apply business rules before delegating to repositories.
//!
//! # Invariants
//! - Services stay storage-agnostic; they only see `RecordRepository`.

pub mod mock_api;
