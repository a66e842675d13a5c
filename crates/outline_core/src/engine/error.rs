//! Engine error taxonomy.
//!
//! Every variant is an invariant violation detected before any mutation is
//! recorded. Routine UI no-ops are not errors and return `Ok`.

use crate::model::item::{ItemId, ItemType};
use crate::model::path::ItemPath;
use crate::model::state::{StateIntegrityError, WorkspaceId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Id does not refer to a live item (possibly a stale reference).
    UnknownItem(ItemId),
    /// The permanent top item can never be deleted.
    TopItemDeletion,
    /// The top item is the fallback active page and stays a page.
    TopItemUnpaging,
    /// `item_id` is not a child of `parent_id`.
    NotConnected { parent_id: ItemId, item_id: ItemId },
    /// Attaching `item_id` under `parent_id` would make the graph cyclic.
    CycleDetected { item_id: ItemId, parent_id: ItemId },
    /// `item_id` is already a child of `parent_id`.
    DuplicateEdge { parent_id: ItemId, item_id: ItemId },
    /// Id is live, already free, or was never handed out.
    IdNotRecyclable(ItemId),
    NotAPage(ItemId),
    ItemTypeMismatch {
        item_id: ItemId,
        expected: ItemType,
        actual: ItemType,
    },
    InvalidStyleTag(String),
    UnknownWorkspace(WorkspaceId),
    /// At least one workspace must remain.
    LastWorkspace,
    /// Path shape does not fit the operation (e.g. no parent, wrong root).
    InvalidPath(ItemPath),
    /// A supplied state value breaks graph invariants.
    CorruptState(StateIntegrityError),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownItem(id) => write!(f, "item not found: {id}"),
            Self::TopItemDeletion => write!(f, "the top item cannot be deleted"),
            Self::TopItemUnpaging => write!(f, "the top item cannot stop being a page"),
            Self::NotConnected { parent_id, item_id } => {
                write!(f, "item {item_id} is not a child of {parent_id}")
            }
            Self::CycleDetected { item_id, parent_id } => write!(
                f,
                "placing item {item_id} under {parent_id} would create a cycle"
            ),
            Self::DuplicateEdge { parent_id, item_id } => {
                write!(f, "item {item_id} is already a child of {parent_id}")
            }
            Self::IdNotRecyclable(id) => write!(f, "item id cannot be recycled: {id}"),
            Self::NotAPage(id) => write!(f, "item is not a page: {id}"),
            Self::ItemTypeMismatch {
                item_id,
                expected,
                actual,
            } => write!(
                f,
                "item {item_id} expects `{}` content, got `{}`",
                expected.as_str(),
                actual.as_str()
            ),
            Self::InvalidStyleTag(value) => write!(f, "invalid style tag: `{value}`"),
            Self::UnknownWorkspace(id) => write!(f, "workspace not found: {id}"),
            Self::LastWorkspace => write!(f, "the last workspace cannot be deleted"),
            Self::InvalidPath(path) => write!(f, "invalid item path for operation: {path}"),
            Self::CorruptState(err) => write!(f, "corrupt state: {err}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CorruptState(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StateIntegrityError> for EngineError {
    fn from(value: StateIntegrityError) -> Self {
        Self::CorruptState(value)
    }
}
