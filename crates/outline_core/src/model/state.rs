//! Aggregate root state.
//!
//! # Responsibility
//! - Hold every item, the per-variant side tables, pages, workspaces and id
//!   allocator bookkeeping in one serializable value.
//! - Provide read-only accessors and an adjacency integrity check.
//!
//! # Invariants
//! - Item records and side-table rows are `Arc`-shared, so cloning the state
//!   for undo copies pointers, not payloads.
//! - Every item has exactly one side-table row, in the table matching its type.
//! - `TOP_ITEM_ID` always exists.
//!
//! # See also
//! - `engine` for the only legal write paths.

use crate::model::content::{
    CodeBlockItem, ImageItem, ItemContent, TexItem, TextItem, WebPageItem,
};
use crate::model::item::{Edge, Item, ItemId, ItemType, Timestamp, TOP_ITEM_ID};
use crate::model::path::ItemPath;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Stable workspace identifier.
pub type WorkspaceId = Uuid;

/// Page-ness side-table row.
///
/// Target and anchor delimit the selected sibling range on this page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub target_item_path: ItemPath,
    pub anchor_item_path: ItemPath,
}

impl Page {
    /// Page whose cursor sits on its own root.
    pub fn new(item_id: ItemId) -> Self {
        Self {
            target_item_path: ItemPath::root(item_id),
            anchor_item_path: ItemPath::root(item_id),
        }
    }
}

/// Named view over the graph with its own exclusion list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub name: String,
    /// Items whose subtrees are hidden while this workspace is current.
    pub excluded_item_ids: Vec<ItemId>,
    pub active_page_id: ItemId,
}

/// Entire outline state owned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootState {
    pub items: BTreeMap<ItemId, Arc<Item>>,
    pub text_items: BTreeMap<ItemId, Arc<TextItem>>,
    pub web_page_items: BTreeMap<ItemId, Arc<WebPageItem>>,
    pub image_items: BTreeMap<ItemId, Arc<ImageItem>>,
    pub code_block_items: BTreeMap<ItemId, Arc<CodeBlockItem>>,
    pub tex_items: BTreeMap<ItemId, Arc<TexItem>>,
    pub pages: BTreeMap<ItemId, Page>,
    /// Open page roots, most recently mounted last.
    pub mounted_page_ids: Vec<ItemId>,
    /// Recyclable ids; the last entry is handed out first.
    pub available_item_ids: Vec<ItemId>,
    pub max_item_id: ItemId,
    pub workspaces: BTreeMap<WorkspaceId, Workspace>,
}

impl RootState {
    /// Seed state: an empty top text item, paged and mounted, in one workspace.
    pub fn initial(now: Timestamp, workspace_name: &str) -> Self {
        let mut state = Self {
            items: BTreeMap::new(),
            text_items: BTreeMap::new(),
            web_page_items: BTreeMap::new(),
            image_items: BTreeMap::new(),
            code_block_items: BTreeMap::new(),
            tex_items: BTreeMap::new(),
            pages: BTreeMap::new(),
            mounted_page_ids: vec![TOP_ITEM_ID],
            available_item_ids: Vec::new(),
            max_item_id: TOP_ITEM_ID,
            workspaces: BTreeMap::new(),
        };
        state
            .items
            .insert(TOP_ITEM_ID, Arc::new(Item::new(ItemType::Text, now)));
        state
            .text_items
            .insert(TOP_ITEM_ID, Arc::new(TextItem::default()));
        state.pages.insert(TOP_ITEM_ID, Page::new(TOP_ITEM_ID));
        state.workspaces.insert(
            Uuid::new_v4(),
            Workspace {
                name: workspace_name.to_string(),
                excluded_item_ids: Vec::new(),
                active_page_id: TOP_ITEM_ID,
            },
        );
        state
    }

    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        self.items.get(&item_id).map(Arc::as_ref)
    }

    pub fn is_page(&self, item_id: ItemId) -> bool {
        self.pages.contains_key(&item_id)
    }

    pub fn is_mounted(&self, item_id: ItemId) -> bool {
        self.mounted_page_ids.contains(&item_id)
    }

    /// Edge stored on `item_id` for its occurrence under `parent_id`.
    pub fn edge(&self, parent_id: ItemId, item_id: ItemId) -> Option<&Edge> {
        self.item(item_id)?.parents.get(&parent_id)
    }

    /// Clones the side-table row of an item into a typed payload.
    pub fn content(&self, item_id: ItemId) -> Option<ItemContent> {
        let item = self.item(item_id)?;
        match item.item_type {
            ItemType::Text => self
                .text_items
                .get(&item_id)
                .map(|row| ItemContent::Text(TextItem::clone(row))),
            ItemType::WebPage => self
                .web_page_items
                .get(&item_id)
                .map(|row| ItemContent::WebPage(WebPageItem::clone(row))),
            ItemType::Image => self
                .image_items
                .get(&item_id)
                .map(|row| ItemContent::Image(ImageItem::clone(row))),
            ItemType::CodeBlock => self
                .code_block_items
                .get(&item_id)
                .map(|row| ItemContent::CodeBlock(CodeBlockItem::clone(row))),
            ItemType::Tex => self
                .tex_items
                .get(&item_id)
                .map(|row| ItemContent::Tex(TexItem::clone(row))),
        }
    }

    /// Writes a payload into the side table matching its variant.
    pub(crate) fn put_content(&mut self, item_id: ItemId, content: ItemContent) {
        match content {
            ItemContent::Text(row) => {
                self.text_items.insert(item_id, Arc::new(row));
            }
            ItemContent::WebPage(row) => {
                self.web_page_items.insert(item_id, Arc::new(row));
            }
            ItemContent::Image(row) => {
                self.image_items.insert(item_id, Arc::new(row));
            }
            ItemContent::CodeBlock(row) => {
                self.code_block_items.insert(item_id, Arc::new(row));
            }
            ItemContent::Tex(row) => {
                self.tex_items.insert(item_id, Arc::new(row));
            }
        }
    }

    /// Removes the side-table row of an item of the given variant.
    pub(crate) fn remove_content(&mut self, item_id: ItemId, item_type: ItemType) {
        match item_type {
            ItemType::Text => {
                self.text_items.remove(&item_id);
            }
            ItemType::WebPage => {
                self.web_page_items.remove(&item_id);
            }
            ItemType::Image => {
                self.image_items.remove(&item_id);
            }
            ItemType::CodeBlock => {
                self.code_block_items.remove(&item_id);
            }
            ItemType::Tex => {
                self.tex_items.remove(&item_id);
            }
        }
    }

    /// Verifies adjacency symmetry, acyclicity, side-table coverage, id
    /// bookkeeping and every page and workspace reference.
    ///
    /// Used when loading persisted snapshots and by tests after every operation.
    pub fn check_integrity(&self) -> Result<(), StateIntegrityError> {
        if !self.items.contains_key(&TOP_ITEM_ID) {
            return Err(StateIntegrityError::MissingTopItem);
        }
        if !self.is_page(TOP_ITEM_ID) {
            return Err(StateIntegrityError::TopItemNotPage);
        }

        for (&item_id, item) in &self.items {
            if item_id > self.max_item_id {
                return Err(StateIntegrityError::IdAboveMax(item_id));
            }
            if self.available_item_ids.contains(&item_id) {
                return Err(StateIntegrityError::LiveIdInFreeList(item_id));
            }

            for (index, child_id) in item.child_ids.iter().enumerate() {
                if item.child_ids[..index].contains(child_id) {
                    return Err(StateIntegrityError::DuplicateChild {
                        parent_id: item_id,
                        child_id: *child_id,
                    });
                }
                let linked_back = self
                    .item(*child_id)
                    .is_some_and(|child| child.parents.contains_key(&item_id));
                if !linked_back {
                    return Err(StateIntegrityError::AsymmetricEdge {
                        parent_id: item_id,
                        child_id: *child_id,
                    });
                }
            }

            for parent_id in item.parents.keys() {
                let linked_back = self
                    .item(*parent_id)
                    .is_some_and(|parent| parent.child_ids.contains(&item_id));
                if !linked_back {
                    return Err(StateIntegrityError::AsymmetricEdge {
                        parent_id: *parent_id,
                        child_id: item_id,
                    });
                }
            }

            if self.content(item_id).is_none() {
                return Err(StateIntegrityError::MissingContent(item_id));
            }
        }

        let content_rows = self
            .text_items
            .keys()
            .map(|id| (*id, ItemType::Text))
            .chain(self.web_page_items.keys().map(|id| (*id, ItemType::WebPage)))
            .chain(self.image_items.keys().map(|id| (*id, ItemType::Image)))
            .chain(self.code_block_items.keys().map(|id| (*id, ItemType::CodeBlock)))
            .chain(self.tex_items.keys().map(|id| (*id, ItemType::Tex)));
        for (item_id, item_type) in content_rows {
            if self.item(item_id).map(|item| item.item_type) != Some(item_type) {
                return Err(StateIntegrityError::OrphanContent(item_id));
            }
        }

        if let Some(item_id) = self.find_cycle() {
            return Err(StateIntegrityError::Cycle(item_id));
        }

        for page_id in self.pages.keys().chain(self.mounted_page_ids.iter()) {
            if !self.items.contains_key(page_id) {
                return Err(StateIntegrityError::DanglingPage(*page_id));
            }
        }
        for page_id in &self.mounted_page_ids {
            if !self.is_page(*page_id) {
                return Err(StateIntegrityError::MountedNonPage(*page_id));
            }
        }
        for (page_id, page) in &self.pages {
            let anchored = |path: &ItemPath| {
                path.root_id() == *page_id
                    && path.ids().iter().all(|id| self.items.contains_key(id))
            };
            if !anchored(&page.target_item_path) || !anchored(&page.anchor_item_path) {
                return Err(StateIntegrityError::StalePagePath(*page_id));
            }
        }

        for (workspace_id, workspace) in &self.workspaces {
            let referenced = workspace
                .excluded_item_ids
                .iter()
                .chain(std::iter::once(&workspace.active_page_id));
            for item_id in referenced {
                if !self.items.contains_key(item_id) {
                    return Err(StateIntegrityError::DanglingWorkspaceItem {
                        workspace_id: *workspace_id,
                        item_id: *item_id,
                    });
                }
            }
            if !self.is_page(workspace.active_page_id) {
                return Err(StateIntegrityError::ActivePageNotPage {
                    workspace_id: *workspace_id,
                    page_id: workspace.active_page_id,
                });
            }
        }
        Ok(())
    }

    /// First item found twice on one downward walk, if the child links loop.
    fn find_cycle(&self) -> Option<ItemId> {
        let mut finished = BTreeSet::new();
        for &start_id in self.items.keys() {
            if finished.contains(&start_id) {
                continue;
            }
            let mut on_path = BTreeSet::from([start_id]);
            let mut stack: Vec<(ItemId, usize)> = vec![(start_id, 0)];
            while let Some((current_id, next_index)) = stack.last_mut() {
                let next_child = self
                    .item(*current_id)
                    .and_then(|item| item.child_ids.get(*next_index))
                    .copied();
                match next_child {
                    Some(child_id) => {
                        *next_index += 1;
                        if on_path.contains(&child_id) {
                            return Some(child_id);
                        }
                        if !finished.contains(&child_id) {
                            on_path.insert(child_id);
                            stack.push((child_id, 0));
                        }
                    }
                    None => {
                        let done_id = *current_id;
                        on_path.remove(&done_id);
                        finished.insert(done_id);
                        stack.pop();
                    }
                }
            }
        }
        None
    }
}

/// Reasons a state value breaks the graph invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateIntegrityError {
    MissingTopItem,
    TopItemNotPage,
    /// One side of a parent/child link is missing.
    AsymmetricEdge {
        parent_id: ItemId,
        child_id: ItemId,
    },
    DuplicateChild {
        parent_id: ItemId,
        child_id: ItemId,
    },
    MissingContent(ItemId),
    /// Side-table row without an item of the matching type.
    OrphanContent(ItemId),
    /// Following child links from this item leads back to it.
    Cycle(ItemId),
    DanglingPage(ItemId),
    MountedNonPage(ItemId),
    /// Target or anchor path does not start at its page or names a missing item.
    StalePagePath(ItemId),
    DanglingWorkspaceItem {
        workspace_id: WorkspaceId,
        item_id: ItemId,
    },
    ActivePageNotPage {
        workspace_id: WorkspaceId,
        page_id: ItemId,
    },
    IdAboveMax(ItemId),
    LiveIdInFreeList(ItemId),
}

impl Display for StateIntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTopItem => write!(f, "top item {TOP_ITEM_ID} is missing"),
            Self::TopItemNotPage => write!(f, "top item {TOP_ITEM_ID} is not a page"),
            Self::AsymmetricEdge {
                parent_id,
                child_id,
            } => write!(
                f,
                "edge {parent_id}->{child_id} is not recorded on both sides"
            ),
            Self::DuplicateChild {
                parent_id,
                child_id,
            } => write!(f, "item {child_id} appears twice under {parent_id}"),
            Self::MissingContent(id) => write!(f, "item {id} has no side-table row"),
            Self::OrphanContent(id) => {
                write!(f, "side-table row {id} has no item of its type")
            }
            Self::Cycle(id) => write!(f, "item {id} is its own descendant"),
            Self::DanglingPage(id) => write!(f, "page entry {id} has no item"),
            Self::MountedNonPage(id) => write!(f, "mounted item {id} is not a page"),
            Self::StalePagePath(id) => {
                write!(f, "page {id} has a cursor path outside the page")
            }
            Self::DanglingWorkspaceItem {
                workspace_id,
                item_id,
            } => write!(f, "workspace {workspace_id} references missing item {item_id}"),
            Self::ActivePageNotPage {
                workspace_id,
                page_id,
            } => write!(
                f,
                "workspace {workspace_id} has active page {page_id}, which is not a page"
            ),
            Self::IdAboveMax(id) => write!(f, "item id {id} exceeds max_item_id"),
            Self::LiveIdInFreeList(id) => write!(f, "live item id {id} is in the free list"),
        }
    }
}

impl Error for StateIntegrityError {}

#[cfg(test)]
mod tests {
    use super::{RootState, StateIntegrityError};
    use crate::model::content::TextItem;
    use crate::model::item::{Edge, Item, ItemType, TOP_ITEM_ID};
    use std::sync::Arc;

    #[test]
    fn initial_state_is_consistent() {
        let state = RootState::initial(1_000, "Main");
        state.check_integrity().expect("seed must be consistent");
        assert!(state.is_page(TOP_ITEM_ID));
        assert!(state.is_mounted(TOP_ITEM_ID));
        assert_eq!(state.max_item_id, TOP_ITEM_ID);
        assert_eq!(state.workspaces.len(), 1);
    }

    #[test]
    fn integrity_check_detects_one_sided_edge() {
        let mut state = RootState::initial(0, "Main");
        state.max_item_id = 1;
        let mut child = Item::new(ItemType::Text, 0);
        child.parents.insert(TOP_ITEM_ID, Edge::default());
        state.items.insert(1, Arc::new(child));
        state.text_items.insert(1, Arc::new(TextItem::default()));

        assert_eq!(
            state.check_integrity().unwrap_err(),
            StateIntegrityError::AsymmetricEdge {
                parent_id: TOP_ITEM_ID,
                child_id: 1
            }
        );
    }

    #[test]
    fn state_serializes_with_numeric_keys() {
        let state = RootState::initial(7, "Main");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["items"]["0"]["type"], "text");
        assert_eq!(json["pages"]["0"]["target_item_path"], serde_json::json!([0]));

        let decoded: RootState = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, state);
    }
}
