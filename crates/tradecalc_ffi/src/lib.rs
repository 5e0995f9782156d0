//! Flutter-facing bindings for the trading calculator core.

pub mod api;
