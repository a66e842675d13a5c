//! Item and edge records.
//!
//! # Responsibility
//! - Define the fields every item carries regardless of its variant.
//! - Define per-occurrence edge data stored on the child side.
//!
//! # Invariants
//! - `parents` is keyed by parent id, so one item has at most one edge per parent.
//! - For every key `p` in `parents`, `p`'s `child_ids` contains this item exactly once.
//! - `style_tags` never contains duplicates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Integer identity of an item. Ids are recycled after deletion.
pub type ItemId = u64;

/// Unix epoch milliseconds.
pub type Timestamp = i64;

/// Id of the permanent top-level item. It can never be deleted.
pub const TOP_ITEM_ID: ItemId = 0;

/// Variant tag selecting which side table holds the item's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Text,
    WebPage,
    Image,
    CodeBlock,
    Tex,
}

impl ItemType {
    /// Stable lowercase name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::WebPage => "web_page",
            Self::Image => "image",
            Self::CodeBlock => "code_block",
            Self::Tex => "tex",
        }
    }
}

/// Data attached to one parent→child occurrence.
///
/// The same item may be collapsed under one parent and expanded under another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Whether the child's subtree is hidden at this occurrence.
    pub is_collapsed: bool,
    /// Ordered labels shown next to this occurrence.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Edge {
    /// Edge with the subtree hidden.
    pub fn collapsed() -> Self {
        Self {
            is_collapsed: true,
            labels: Vec::new(),
        }
    }
}

/// Source citation shown under an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cite {
    pub title: String,
    pub url: String,
}

/// Fields shared by every item variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Ordered children. Each id appears at most once.
    pub child_ids: Vec<ItemId>,
    /// Parent id → edge data for that occurrence.
    pub parents: BTreeMap<ItemId, Edge>,
    /// Last modification time, used for recency ordering only.
    pub timestamp: Timestamp,
    /// Ordered style tags, rendered as classes by the view layer.
    #[serde(default)]
    pub style_tags: Vec<String>,
    #[serde(default)]
    pub cite: Option<Cite>,
}

impl Item {
    /// Creates an unplaced item with no parents and no children.
    pub fn new(item_type: ItemType, timestamp: Timestamp) -> Self {
        Self {
            item_type,
            child_ids: Vec::new(),
            parents: BTreeMap::new(),
            timestamp,
            style_tags: Vec::new(),
            cite: None,
        }
    }

    pub fn parent_count(&self) -> usize {
        self.parents.len()
    }

    /// Position of `child_id` in this item's child sequence.
    pub fn child_index(&self, child_id: ItemId) -> Option<usize> {
        self.child_ids.iter().position(|id| *id == child_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Edge, Item, ItemType};

    #[test]
    fn new_item_is_unplaced() {
        let item = Item::new(ItemType::Text, 42);
        assert!(item.child_ids.is_empty());
        assert_eq!(item.parent_count(), 0);
        assert_eq!(item.timestamp, 42);
        assert_eq!(item.cite, None);
    }

    #[test]
    fn default_edge_is_expanded_without_labels() {
        let edge = Edge::default();
        assert!(!edge.is_collapsed);
        assert!(edge.labels.is_empty());
        assert!(Edge::collapsed().is_collapsed);
    }

    #[test]
    fn child_index_finds_position() {
        let mut item = Item::new(ItemType::Text, 0);
        item.child_ids = vec![4, 7, 9];
        assert_eq!(item.child_index(7), Some(1));
        assert_eq!(item.child_index(5), None);
    }
}
