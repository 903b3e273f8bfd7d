//! Read-state module
//!
//! Provides the engine that applies idempotent mark-as-read
//! transitions to thread messages and standalone notifications.

mod engine;

pub use engine::ReadStateEngine;
