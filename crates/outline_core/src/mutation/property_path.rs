//! Typed descriptors of mutated state locations.

use crate::model::item::ItemId;
use crate::model::state::WorkspaceId;

/// One state location that changed since the last commit.
///
/// Listeners match on these exhaustively to decide what to redraw or
/// rewrite. Variants are ordered so a commit batch is delivered in a
/// deterministic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyPath {
    /// Item record created or deleted.
    ItemEntry(ItemId),
    ChildIds(ItemId),
    /// Edge on `item_id` for its occurrence under `parent_id` was added,
    /// changed or removed.
    Edge { item_id: ItemId, parent_id: ItemId },
    Timestamp(ItemId),
    StyleTags(ItemId),
    Cite(ItemId),
    /// Side-table row of the item created, changed or removed.
    Content(ItemId),
    /// Page row created, removed or its target/anchor moved.
    Page(ItemId),
    MountedPageIds,
    AvailableItemIds,
    MaxItemId,
    Workspace(WorkspaceId),
    /// The whole state was swapped (undo or reload); redraw everything.
    StateReplaced,
}

impl PropertyPath {
    /// Item the change is scoped to, if any.
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            Self::ItemEntry(id)
            | Self::ChildIds(id)
            | Self::Timestamp(id)
            | Self::StyleTags(id)
            | Self::Cite(id)
            | Self::Content(id)
            | Self::Page(id) => Some(*id),
            Self::Edge { item_id, .. } => Some(*item_id),
            Self::MountedPageIds
            | Self::AvailableItemIds
            | Self::MaxItemId
            | Self::Workspace(_)
            | Self::StateReplaced => None,
        }
    }
}
