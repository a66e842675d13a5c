//! Outline data model.
//!
//! # Responsibility
//! - Define items, edges, paths, pages and the aggregate root state.
//! - Keep records plain and serializable; all writes go through `engine`.
//!
//! # Invariants
//! - Child lists and parent maps always agree (see `RootState::check_integrity`).
//! - An item is a page iff it has a row in `RootState::pages`.

pub mod content;
pub mod item;
pub mod path;
pub mod state;
