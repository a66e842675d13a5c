//! Dual-adjacency graph operations.
//!
//! # Responsibility
//! - Read child lists, parent maps and per-occurrence edges.
//! - Insert, remove and splice edges with both sides updated together.
//! - Delete items with cascade or splice semantics.
//!
//! # Invariants
//! - `b ∈ child_ids(a)` iff `a ∈ parents(b)` after every public call.
//! - No call creates a cycle.
//! - The top item is never deleted.

use super::{EngineError, EngineResult, OutlineEngine};
use crate::model::item::{Edge, Item, ItemId, TOP_ITEM_ID};
use crate::model::path::ItemPath;
use crate::model::state::Page;
use crate::mutation::property_path::PropertyPath;
use log::info;
use std::collections::BTreeSet;
use std::sync::Arc;

enum Placement {
    Index(usize),
    Last,
}

impl OutlineEngine {
    pub fn exists(&self, item_id: ItemId) -> bool {
        self.state.items.contains_key(&item_id)
    }

    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        self.state.item(item_id)
    }

    pub fn child_ids(&self, item_id: ItemId) -> EngineResult<&[ItemId]> {
        Ok(self.item_ref(item_id)?.child_ids.as_slice())
    }

    /// Parent ids in ascending order.
    pub fn parent_ids(&self, item_id: ItemId) -> EngineResult<Vec<ItemId>> {
        Ok(self.item_ref(item_id)?.parents.keys().copied().collect())
    }

    pub fn parent_count(&self, item_id: ItemId) -> EngineResult<usize> {
        Ok(self.item_ref(item_id)?.parent_count())
    }

    pub fn edge(&self, parent_id: ItemId, item_id: ItemId) -> Option<&Edge> {
        self.state.edge(parent_id, item_id)
    }

    /// Inserts or overwrites the edge entry keyed by `parent_id` on `child_id`.
    ///
    /// Touches only the child's parent map. Pair it with a child-list change
    /// or use the `insert_as_*` family, which updates both sides.
    pub fn add_parent_edge(
        &mut self,
        child_id: ItemId,
        parent_id: ItemId,
        edge: Option<Edge>,
    ) -> EngineResult<()> {
        self.item_ref(parent_id)?;
        self.item_mut(child_id)?
            .parents
            .insert(parent_id, edge.unwrap_or_default());
        self.mark(PropertyPath::Edge {
            item_id: child_id,
            parent_id,
        });
        Ok(())
    }

    pub fn insert_as_first_child(
        &mut self,
        parent_id: ItemId,
        child_id: ItemId,
        edge: Option<Edge>,
    ) -> EngineResult<()> {
        self.ensure_can_attach(parent_id, child_id)?;
        self.attach(parent_id, child_id, Placement::Index(0), edge.unwrap_or_default())
    }

    pub fn insert_as_last_child(
        &mut self,
        parent_id: ItemId,
        child_id: ItemId,
        edge: Option<Edge>,
    ) -> EngineResult<()> {
        self.ensure_can_attach(parent_id, child_id)?;
        self.attach(parent_id, child_id, Placement::Last, edge.unwrap_or_default())
    }

    /// Inserts `new_id` right before the item at `path` under the same parent.
    ///
    /// Returns `Ok(None)` without mutating when `path` is a page root.
    pub fn insert_as_prev_sibling(
        &mut self,
        path: &ItemPath,
        new_id: ItemId,
        edge: Option<Edge>,
    ) -> EngineResult<Option<ItemPath>> {
        self.insert_as_sibling(path, new_id, edge, 0)
    }

    /// Inserts `new_id` right after the item at `path` under the same parent.
    ///
    /// Returns `Ok(None)` without mutating when `path` is a page root.
    pub fn insert_as_next_sibling(
        &mut self,
        path: &ItemPath,
        new_id: ItemId,
        edge: Option<Edge>,
    ) -> EngineResult<Option<ItemPath>> {
        self.insert_as_sibling(path, new_id, edge, 1)
    }

    fn insert_as_sibling(
        &mut self,
        path: &ItemPath,
        new_id: ItemId,
        edge: Option<Edge>,
        offset: usize,
    ) -> EngineResult<Option<ItemPath>> {
        let Some(parent_id) = path.parent_id() else {
            return Ok(None);
        };
        let index = self.child_position(parent_id, path.item_id())?;
        self.ensure_can_attach(parent_id, new_id)?;
        self.attach(
            parent_id,
            new_id,
            Placement::Index(index + offset),
            edge.unwrap_or_default(),
        )?;
        Ok(path.with_sibling_id(new_id))
    }

    /// Places `new_id` where a "new item below the cursor" belongs.
    ///
    /// First child when the item at `path` shows its children, otherwise the
    /// next sibling. Returns the path of the new occurrence.
    pub fn insert_below(
        &mut self,
        path: &ItemPath,
        new_id: ItemId,
        edge: Option<Edge>,
    ) -> EngineResult<ItemPath> {
        if self.is_displaying_children(path)? {
            self.insert_as_first_child(path.item_id(), new_id, edge)?;
            return Ok(path.child(new_id));
        }
        self.insert_as_next_sibling(path, new_id, edge)?
            .ok_or_else(|| EngineError::InvalidPath(path.clone()))
    }

    /// Detaches `child_id` from `parent_id` and returns the removed edge.
    ///
    /// The child survives even when it ends up with no parents.
    pub fn remove_edge(&mut self, parent_id: ItemId, child_id: ItemId) -> EngineResult<Edge> {
        self.child_position(parent_id, child_id)?;
        if !self.item_ref(child_id)?.parents.contains_key(&parent_id) {
            return Err(EngineError::NotConnected {
                parent_id,
                item_id: child_id,
            });
        }
        Ok(self.detach(parent_id, child_id))
    }

    /// Deletes `item_id` and every descendant left without a parent.
    ///
    /// Children that keep another parent survive with the edge stripped.
    /// Returns the number of deleted items.
    pub fn delete_subtree(&mut self, item_id: ItemId) -> EngineResult<usize> {
        if item_id == TOP_ITEM_ID {
            return Err(EngineError::TopItemDeletion);
        }
        self.item_ref(item_id)?;

        let mut removed = 0;
        let mut pending = vec![item_id];
        while let Some(current_id) = pending.pop() {
            if !self.exists(current_id) {
                continue;
            }
            let parent_ids: Vec<ItemId> =
                self.item_ref(current_id)?.parents.keys().copied().collect();
            for parent_id in parent_ids {
                self.detach(parent_id, current_id);
            }

            let child_ids = self.item_ref(current_id)?.child_ids.clone();
            for child_id in child_ids {
                self.detach(current_id, child_id);
                let orphaned = self
                    .state
                    .item(child_id)
                    .is_some_and(|child| child.parents.is_empty());
                if orphaned && child_id != TOP_ITEM_ID {
                    pending.push(child_id);
                }
            }

            self.discard_item(current_id)?;
            removed += 1;
        }

        info!(
            "event=item_delete module=engine status=ok item_id={} removed={}",
            item_id, removed
        );
        Ok(removed)
    }

    /// Deletes `item_id` but splices its children into each of its parents.
    ///
    /// Each child takes the position the item held, in order, and gains a
    /// copy of its edge under the item for every new parent. A child already
    /// present under a parent keeps its existing place and edge there.
    pub fn collapse_out(&mut self, item_id: ItemId) -> EngineResult<()> {
        if item_id == TOP_ITEM_ID {
            return Err(EngineError::TopItemDeletion);
        }
        let item = self.item_ref(item_id)?;
        let parent_ids: Vec<ItemId> = item.parents.keys().copied().collect();
        let children: Vec<(ItemId, Edge)> = item
            .child_ids
            .iter()
            .map(|child_id| {
                let edge = self
                    .state
                    .edge(item_id, *child_id)
                    .cloned()
                    .unwrap_or_default();
                (*child_id, edge)
            })
            .collect();

        let mut splices = Vec::with_capacity(parent_ids.len());
        for parent_id in &parent_ids {
            let index = self.child_position(*parent_id, item_id)?;
            let parent = self.item_ref(*parent_id)?;
            let spliced: Vec<(ItemId, Edge)> = children
                .iter()
                .filter(|(child_id, _)| !parent.child_ids.contains(child_id))
                .cloned()
                .collect();
            splices.push((*parent_id, index, spliced));
        }

        for (parent_id, index, spliced) in splices {
            self.item_mut(parent_id)?
                .child_ids
                .splice(index..=index, spliced.iter().map(|(child_id, _)| *child_id));
            self.mark(PropertyPath::ChildIds(parent_id));

            for (child_id, edge) in spliced {
                self.item_mut(child_id)?.parents.insert(parent_id, edge);
                self.mark(PropertyPath::Edge {
                    item_id: child_id,
                    parent_id,
                });
            }
        }

        for (child_id, _) in &children {
            self.item_mut(*child_id)?.parents.remove(&item_id);
            self.mark(PropertyPath::Edge {
                item_id: *child_id,
                parent_id: item_id,
            });
        }

        let item = self.item_mut(item_id)?;
        item.child_ids.clear();
        item.parents.clear();
        self.discard_item(item_id)?;

        info!(
            "event=item_collapse_out module=engine status=ok item_id={} parents={} children={}",
            item_id,
            parent_ids.len(),
            children.len()
        );
        Ok(())
    }

    /// Whether attaching `child_id` under `parent_id` would close a loop.
    pub fn would_create_cycle(&self, parent_id: ItemId, child_id: ItemId) -> bool {
        parent_id == child_id || self.collect_ancestors(parent_id).contains(&child_id)
    }

    /// Every item reachable by walking parent links upward, excluding itself.
    pub fn ancestor_ids(&self, item_id: ItemId) -> EngineResult<BTreeSet<ItemId>> {
        self.item_ref(item_id)?;
        Ok(self.collect_ancestors(item_id))
    }

    /// Preorder ids of the subtree rooted at `item_id`, each listed once.
    ///
    /// Nested pages are listed but not descended into.
    pub fn subtree_item_ids(&self, item_id: ItemId) -> EngineResult<Vec<ItemId>> {
        self.item_ref(item_id)?;
        let mut visited = BTreeSet::new();
        let mut ordered = Vec::new();
        let mut stack = vec![item_id];
        while let Some(current_id) = stack.pop() {
            if !visited.insert(current_id) {
                continue;
            }
            ordered.push(current_id);
            if current_id != item_id && self.state.is_page(current_id) {
                continue;
            }
            if let Some(item) = self.state.item(current_id) {
                stack.extend(item.child_ids.iter().rev().copied());
            }
        }
        Ok(ordered)
    }

    /// Whether the occurrence at `path` shows its children.
    ///
    /// A page root always does. A nested occurrence does when it is not a
    /// page, has children and its edge is expanded.
    pub fn is_displaying_children(&self, path: &ItemPath) -> EngineResult<bool> {
        let item = self.item_ref(path.item_id())?;
        if !path.has_parent() {
            return Ok(true);
        }
        if self.state.is_page(path.item_id()) || item.child_ids.is_empty() {
            return Ok(false);
        }
        Ok(!self.edge_at(path)?.is_collapsed)
    }

    /// Children shown at `path`, minus items the current workspace excludes.
    pub fn displaying_child_ids(&self, path: &ItemPath) -> EngineResult<Vec<ItemId>> {
        if !self.is_displaying_children(path)? {
            return Ok(Vec::new());
        }
        let excluded = self.excluded_item_ids();
        Ok(self
            .item_ref(path.item_id())?
            .child_ids
            .iter()
            .copied()
            .filter(|child_id| !excluded.contains(child_id))
            .collect())
    }

    pub fn is_collapsed(&self, path: &ItemPath) -> EngineResult<bool> {
        Ok(self.edge_at(path)?.is_collapsed)
    }

    /// Sets the collapse flag of the occurrence at `path`. Same value is a no-op.
    pub fn set_is_collapsed(&mut self, path: &ItemPath, is_collapsed: bool) -> EngineResult<()> {
        if self.edge_at(path)?.is_collapsed == is_collapsed {
            return Ok(());
        }
        self.edge_at_mut(path)?.is_collapsed = is_collapsed;
        self.mark_edge(path);
        Ok(())
    }

    pub fn labels(&self, path: &ItemPath) -> EngineResult<&[String]> {
        Ok(self.edge_at(path)?.labels.as_slice())
    }

    pub fn set_labels(&mut self, path: &ItemPath, labels: Vec<String>) -> EngineResult<()> {
        if self.edge_at(path)?.labels == labels {
            return Ok(());
        }
        self.edge_at_mut(path)?.labels = labels;
        self.mark_edge(path);
        Ok(())
    }

    fn edge_at(&self, path: &ItemPath) -> EngineResult<&Edge> {
        let parent_id = path
            .parent_id()
            .ok_or_else(|| EngineError::InvalidPath(path.clone()))?;
        let item_id = path.item_id();
        self.item_ref(item_id)?
            .parents
            .get(&parent_id)
            .ok_or(EngineError::NotConnected { parent_id, item_id })
    }

    fn edge_at_mut(&mut self, path: &ItemPath) -> EngineResult<&mut Edge> {
        let parent_id = path
            .parent_id()
            .ok_or_else(|| EngineError::InvalidPath(path.clone()))?;
        let item_id = path.item_id();
        self.item_mut(item_id)?
            .parents
            .get_mut(&parent_id)
            .ok_or(EngineError::NotConnected { parent_id, item_id })
    }

    fn mark_edge(&mut self, path: &ItemPath) {
        if let Some(parent_id) = path.parent_id() {
            self.mark(PropertyPath::Edge {
                item_id: path.item_id(),
                parent_id,
            });
        }
    }

    /// Index of `child_id` under `parent_id`, or `NotConnected`.
    pub(super) fn child_position(&self, parent_id: ItemId, child_id: ItemId) -> EngineResult<usize> {
        self.item_ref(parent_id)?
            .child_index(child_id)
            .ok_or(EngineError::NotConnected {
                parent_id,
                item_id: child_id,
            })
    }

    /// Rejects unknown ids, duplicate edges and cycles.
    pub(super) fn ensure_can_attach(&self, parent_id: ItemId, child_id: ItemId) -> EngineResult<()> {
        let parent = self.item_ref(parent_id)?;
        self.item_ref(child_id)?;
        if parent.child_ids.contains(&child_id) {
            return Err(EngineError::DuplicateEdge {
                parent_id,
                item_id: child_id,
            });
        }
        if self.would_create_cycle(parent_id, child_id) {
            return Err(EngineError::CycleDetected {
                item_id: child_id,
                parent_id,
            });
        }
        Ok(())
    }

    /// Links both sides of an edge. Callers validate with `ensure_can_attach`.
    fn attach(
        &mut self,
        parent_id: ItemId,
        child_id: ItemId,
        placement: Placement,
        edge: Edge,
    ) -> EngineResult<()> {
        let parent = self.item_mut(parent_id)?;
        match placement {
            Placement::Index(index) => {
                let index = index.min(parent.child_ids.len());
                parent.child_ids.insert(index, child_id);
            }
            Placement::Last => parent.child_ids.push(child_id),
        }
        self.mark(PropertyPath::ChildIds(parent_id));
        self.add_parent_edge(child_id, parent_id, Some(edge))
    }

    /// Unlinks both sides of an edge, tolerating either side being absent.
    pub(super) fn detach(&mut self, parent_id: ItemId, child_id: ItemId) -> Edge {
        if let Some(parent) = self.state.items.get_mut(&parent_id) {
            if parent.child_ids.contains(&child_id) {
                Arc::make_mut(parent)
                    .child_ids
                    .retain(|id| *id != child_id);
                self.tracker.mark(PropertyPath::ChildIds(parent_id));
            }
        }
        let mut removed = Edge::default();
        if let Some(child) = self.state.items.get_mut(&child_id) {
            if let Some(edge) = Arc::make_mut(child).parents.remove(&parent_id) {
                removed = edge;
                self.tracker.mark(PropertyPath::Edge {
                    item_id: child_id,
                    parent_id,
                });
            }
        }
        removed
    }

    fn collect_ancestors(&self, item_id: ItemId) -> BTreeSet<ItemId> {
        let mut ancestors = BTreeSet::new();
        let mut frontier = vec![item_id];
        while let Some(current_id) = frontier.pop() {
            let Some(item) = self.state.item(current_id) else {
                continue;
            };
            for parent_id in item.parents.keys() {
                if ancestors.insert(*parent_id) {
                    frontier.push(*parent_id);
                }
            }
        }
        ancestors
    }

    /// Removes an already detached item and every reference to it.
    ///
    /// Queues its tab for closing, drops its side-table row and page row,
    /// unmounts it, resets page cursors and workspace state pointing at it,
    /// then recycles the id.
    fn discard_item(&mut self, item_id: ItemId) -> EngineResult<()> {
        let item_type = self.item_ref(item_id)?.item_type;

        if let Some(tab_id) = self.tabs.tab_id_for(item_id) {
            self.tabs_to_close.push((item_id, tab_id));
        }

        self.state.remove_content(item_id, item_type);
        self.mark(PropertyPath::Content(item_id));

        if self.state.is_mounted(item_id) {
            self.state.mounted_page_ids.retain(|id| *id != item_id);
            self.mark(PropertyPath::MountedPageIds);
        }
        if self.state.pages.remove(&item_id).is_some() {
            self.mark(PropertyPath::Page(item_id));
        }

        let mut touched_pages = Vec::new();
        for (page_id, page) in self.state.pages.iter_mut() {
            let stale = page.target_item_path.ids().contains(&item_id)
                || page.anchor_item_path.ids().contains(&item_id);
            if stale {
                *page = Page::new(*page_id);
                touched_pages.push(*page_id);
            }
        }
        for page_id in touched_pages {
            self.mark(PropertyPath::Page(page_id));
        }

        let mut touched_workspaces = Vec::new();
        for (workspace_id, workspace) in self.state.workspaces.iter_mut() {
            let excluded = workspace.excluded_item_ids.contains(&item_id);
            if excluded {
                workspace.excluded_item_ids.retain(|id| *id != item_id);
            }
            let active = workspace.active_page_id == item_id;
            if active {
                workspace.active_page_id = TOP_ITEM_ID;
            }
            if excluded || active {
                touched_workspaces.push(*workspace_id);
            }
        }
        for workspace_id in touched_workspaces {
            self.mark(PropertyPath::Workspace(workspace_id));
        }

        self.state.items.remove(&item_id);
        self.mark(PropertyPath::ItemEntry(item_id));
        self.push_free_id(item_id);
        Ok(())
    }
}
