//! Root-to-node addresses for items reachable by more than one route.
//!
//! # Invariants
//! - A path is never empty.
//! - Paths are values: every transformation returns a new path.

use crate::model::item::ItemId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from path construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// An item path needs at least one id.
    Empty,
}

impl Display for PathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "item path must not be empty"),
        }
    }
}

impl Error for PathError {}

/// One located occurrence of an item.
///
/// The last id is the item; the second-to-last, when present, is the parent
/// the item is reached through at this occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<ItemId>", into = "Vec<ItemId>")]
pub struct ItemPath(Vec<ItemId>);

impl ItemPath {
    /// Single-element path addressing a page root.
    pub fn root(item_id: ItemId) -> Self {
        Self(vec![item_id])
    }

    /// Builds a path from a root-first id sequence.
    pub fn new(ids: Vec<ItemId>) -> Result<Self, PathError> {
        if ids.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self(ids))
    }

    pub fn root_id(&self) -> ItemId {
        self.0[0]
    }

    pub fn item_id(&self) -> ItemId {
        self.0[self.0.len() - 1]
    }

    pub fn parent_id(&self) -> Option<ItemId> {
        self.0.len().checked_sub(2).map(|index| self.0[index])
    }

    pub fn has_parent(&self) -> bool {
        self.0.len() >= 2
    }

    /// Path to the parent occurrence, or `None` for a root path.
    pub fn parent(&self) -> Option<ItemPath> {
        if !self.has_parent() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Replaces the last id, keeping the same parent chain.
    ///
    /// Returns `None` for a root path since it has no siblings.
    pub fn with_sibling_id(&self, sibling_id: ItemId) -> Option<ItemPath> {
        if !self.has_parent() {
            return None;
        }
        let mut ids = self.0.clone();
        let last = ids.len() - 1;
        ids[last] = sibling_id;
        Some(Self(ids))
    }

    /// Extends this path by one child id.
    pub fn child(&self, child_id: ItemId) -> ItemPath {
        let mut ids = self.0.clone();
        ids.push(child_id);
        Self(ids)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.0
    }
}

impl TryFrom<Vec<ItemId>> for ItemPath {
    type Error = PathError;

    fn try_from(value: Vec<ItemId>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemPath> for Vec<ItemId> {
    fn from(value: ItemPath) -> Self {
        value.0
    }
}

impl Display for ItemPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join("/");
        write!(f, "{joined}")
    }
}
