//! Mutation tracking and undo.
//!
//! # Responsibility
//! - Record which state locations changed since the last commit.
//! - Notify registered listeners at commit boundaries.
//! - Keep whole-state snapshots for undo.
//!
//! # Invariants
//! - A failed engine operation records nothing, so it never reaches `commit`.

pub mod property_path;
pub mod tracker;
pub mod undo;
