//! Persistence sinks for the root state.
//!
//! # Responsibility
//! - Define the load/save contract the engine consumes at startup and shutdown.
//! - Keep SQL and JSON encoding details out of the engine.

pub mod state_repo;
