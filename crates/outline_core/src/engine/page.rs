//! Page-ness, mounting and per-page cursor paths.
//!
//! # Invariants
//! - Only pages are mounted; un-paging a mounted page unmounts it first.
//! - Target and anchor paths start at their page and resolve through
//!   existing edges when set.

use super::{EngineError, EngineResult, OutlineEngine};
use crate::model::item::{ItemId, TOP_ITEM_ID};
use crate::model::path::ItemPath;
use crate::model::state::Page;
use crate::mutation::property_path::PropertyPath;

impl OutlineEngine {
    /// Gives the item a page row with its cursor on itself. Idempotent.
    pub fn turn_into_page(&mut self, item_id: ItemId) -> EngineResult<()> {
        self.item_ref(item_id)?;
        if self.state.is_page(item_id) {
            return Ok(());
        }
        self.state.pages.insert(item_id, Page::new(item_id));
        self.mark(PropertyPath::Page(item_id));
        Ok(())
    }

    /// Drops the page row, unmounting first. Idempotent.
    ///
    /// Workspaces whose active page this was fall back to the top page,
    /// so the top item itself is refused.
    pub fn turn_into_non_page(&mut self, item_id: ItemId) -> EngineResult<()> {
        if item_id == TOP_ITEM_ID {
            return Err(EngineError::TopItemUnpaging);
        }
        self.item_ref(item_id)?;
        if !self.state.is_page(item_id) {
            return Ok(());
        }
        self.unmount_page(item_id)?;
        self.state.pages.remove(&item_id);
        self.mark(PropertyPath::Page(item_id));

        let affected: Vec<_> = self
            .state
            .workspaces
            .iter()
            .filter(|(_, workspace)| workspace.active_page_id == item_id)
            .map(|(workspace_id, _)| *workspace_id)
            .collect();
        for workspace_id in affected {
            if let Some(workspace) = self.state.workspaces.get_mut(&workspace_id) {
                workspace.active_page_id = TOP_ITEM_ID;
            }
            self.mark(PropertyPath::Workspace(workspace_id));
        }
        Ok(())
    }

    /// Adds a page to the open roots. Already mounted is a no-op.
    pub fn mount_page(&mut self, page_id: ItemId) -> EngineResult<()> {
        self.ensure_page(page_id)?;
        if self.state.is_mounted(page_id) {
            return Ok(());
        }
        self.state.mounted_page_ids.push(page_id);
        self.mark(PropertyPath::MountedPageIds);
        Ok(())
    }

    /// Removes a page from the open roots. Never deletes the item.
    pub fn unmount_page(&mut self, page_id: ItemId) -> EngineResult<()> {
        self.ensure_page(page_id)?;
        if !self.state.is_mounted(page_id) {
            return Ok(());
        }
        self.state.mounted_page_ids.retain(|id| *id != page_id);
        self.mark(PropertyPath::MountedPageIds);
        Ok(())
    }

    /// Brings a page to the front and makes it the current workspace's active page.
    pub fn switch_active_page(&mut self, page_id: ItemId) -> EngineResult<()> {
        self.ensure_page(page_id)?;
        let workspace_id = self.current_workspace_id;
        if !self.state.workspaces.contains_key(&workspace_id) {
            return Err(EngineError::UnknownWorkspace(workspace_id));
        }
        if self.state.mounted_page_ids.last() != Some(&page_id) {
            self.state.mounted_page_ids.retain(|id| *id != page_id);
            self.state.mounted_page_ids.push(page_id);
            self.mark(PropertyPath::MountedPageIds);
        }

        if let Some(workspace) = self.state.workspaces.get_mut(&workspace_id) {
            if workspace.active_page_id != page_id {
                workspace.active_page_id = page_id;
                self.tracker.mark(PropertyPath::Workspace(workspace_id));
            }
        }
        Ok(())
    }

    /// Active page of the current workspace.
    pub fn active_page_id(&self) -> ItemId {
        self.state
            .workspaces
            .get(&self.current_workspace_id)
            .map(|workspace| workspace.active_page_id)
            .unwrap_or(TOP_ITEM_ID)
    }

    pub fn target_item_path(&self, page_id: ItemId) -> EngineResult<&ItemPath> {
        Ok(&self.page_ref(page_id)?.target_item_path)
    }

    pub fn anchor_item_path(&self, page_id: ItemId) -> EngineResult<&ItemPath> {
        Ok(&self.page_ref(page_id)?.anchor_item_path)
    }

    /// Moves the cursor to `path` and collapses the selection onto it.
    pub fn set_target_item_path(&mut self, page_id: ItemId, path: ItemPath) -> EngineResult<()> {
        self.ensure_page_path(page_id, &path)?;
        let page = self.page_mut(page_id)?;
        page.anchor_item_path = path.clone();
        page.target_item_path = path;
        self.mark(PropertyPath::Page(page_id));
        Ok(())
    }

    /// Moves the cursor while keeping the anchor, extending the selection.
    pub fn set_target_item_path_only(
        &mut self,
        page_id: ItemId,
        path: ItemPath,
    ) -> EngineResult<()> {
        self.ensure_page_path(page_id, &path)?;
        self.page_mut(page_id)?.target_item_path = path;
        self.mark(PropertyPath::Page(page_id));
        Ok(())
    }

    pub fn set_anchor_item_path(&mut self, page_id: ItemId, path: ItemPath) -> EngineResult<()> {
        self.ensure_page_path(page_id, &path)?;
        self.page_mut(page_id)?.anchor_item_path = path;
        self.mark(PropertyPath::Page(page_id));
        Ok(())
    }

    /// Paths selected on a page, in sibling order.
    ///
    /// Target and anchor under the same parent select the sibling range
    /// between them. Otherwise only the target is selected.
    pub fn selected_item_paths(&self, page_id: ItemId) -> EngineResult<Vec<ItemPath>> {
        let page = self.page_ref(page_id)?;
        let target = &page.target_item_path;
        let anchor = &page.anchor_item_path;
        if target == anchor || target.parent() != anchor.parent() {
            return Ok(vec![target.clone()]);
        }
        let Some(parent_id) = target.parent_id() else {
            return Ok(vec![target.clone()]);
        };

        let target_index = self.child_position(parent_id, target.item_id())?;
        let anchor_index = self.child_position(parent_id, anchor.item_id())?;
        let (low, high) = if target_index <= anchor_index {
            (target_index, anchor_index)
        } else {
            (anchor_index, target_index)
        };
        let child_ids = self.child_ids(parent_id)?;
        Ok(child_ids[low..=high]
            .iter()
            .filter_map(|child_id| target.with_sibling_id(*child_id))
            .collect())
    }

    /// Walks `path` and checks every step is an existing parent-child edge.
    pub fn ensure_path_resolves(&self, path: &ItemPath) -> EngineResult<()> {
        self.item_ref(path.root_id())?;
        for pair in path.ids().windows(2) {
            self.child_position(pair[0], pair[1])?;
        }
        Ok(())
    }

    fn ensure_page(&self, item_id: ItemId) -> EngineResult<()> {
        self.item_ref(item_id)?;
        if !self.state.is_page(item_id) {
            return Err(EngineError::NotAPage(item_id));
        }
        Ok(())
    }

    fn ensure_page_path(&self, page_id: ItemId, path: &ItemPath) -> EngineResult<()> {
        self.ensure_page(page_id)?;
        if path.root_id() != page_id {
            return Err(EngineError::InvalidPath(path.clone()));
        }
        self.ensure_path_resolves(path)
    }

    fn page_ref(&self, page_id: ItemId) -> EngineResult<&Page> {
        self.item_ref(page_id)?;
        self.state
            .pages
            .get(&page_id)
            .ok_or(EngineError::NotAPage(page_id))
    }

    fn page_mut(&mut self, page_id: ItemId) -> EngineResult<&mut Page> {
        self.state
            .pages
            .get_mut(&page_id)
            .ok_or(EngineError::NotAPage(page_id))
    }
}
