//! Workspaces: named views with their own exclusion list and active page.
//!
//! The current workspace is engine-local and not part of the persisted state.

use super::{EngineError, EngineResult, OutlineEngine};
use crate::model::item::{ItemId, TOP_ITEM_ID};
use crate::model::state::{Workspace, WorkspaceId};
use crate::mutation::property_path::PropertyPath;
use log::info;
use uuid::Uuid;

impl OutlineEngine {
    pub fn current_workspace_id(&self) -> WorkspaceId {
        self.current_workspace_id
    }

    pub fn set_current_workspace_id(&mut self, workspace_id: WorkspaceId) -> EngineResult<()> {
        if !self.state.workspaces.contains_key(&workspace_id) {
            return Err(EngineError::UnknownWorkspace(workspace_id));
        }
        self.current_workspace_id = workspace_id;
        Ok(())
    }

    /// All workspace ids in ascending order.
    pub fn workspace_ids(&self) -> Vec<WorkspaceId> {
        self.state.workspaces.keys().copied().collect()
    }

    pub fn workspace(&self, workspace_id: WorkspaceId) -> Option<&Workspace> {
        self.state.workspaces.get(&workspace_id)
    }

    /// Adds an empty workspace named after its ordinal.
    pub fn create_workspace(&mut self) -> WorkspaceId {
        let workspace_id = Uuid::new_v4();
        let name = format!("Workspace {}", self.state.workspaces.len() + 1);
        self.state.workspaces.insert(
            workspace_id,
            Workspace {
                name,
                excluded_item_ids: Vec::new(),
                active_page_id: TOP_ITEM_ID,
            },
        );
        self.mark(PropertyPath::Workspace(workspace_id));
        info!(
            "event=workspace_create module=engine status=ok workspace_id={}",
            workspace_id
        );
        workspace_id
    }

    /// Removes a workspace. The last one cannot be removed.
    ///
    /// Deleting the current workspace switches to the first remaining one.
    pub fn delete_workspace(&mut self, workspace_id: WorkspaceId) -> EngineResult<()> {
        if !self.state.workspaces.contains_key(&workspace_id) {
            return Err(EngineError::UnknownWorkspace(workspace_id));
        }
        if self.state.workspaces.len() == 1 {
            return Err(EngineError::LastWorkspace);
        }
        self.state.workspaces.remove(&workspace_id);
        self.mark(PropertyPath::Workspace(workspace_id));

        if self.current_workspace_id == workspace_id {
            if let Some(next_id) = self.state.workspaces.keys().next() {
                self.current_workspace_id = *next_id;
            }
        }
        info!(
            "event=workspace_delete module=engine status=ok workspace_id={}",
            workspace_id
        );
        Ok(())
    }

    pub fn rename_workspace(
        &mut self,
        workspace_id: WorkspaceId,
        name: impl Into<String>,
    ) -> EngineResult<()> {
        let workspace = self
            .state
            .workspaces
            .get_mut(&workspace_id)
            .ok_or(EngineError::UnknownWorkspace(workspace_id))?;
        workspace.name = name.into();
        self.mark(PropertyPath::Workspace(workspace_id));
        Ok(())
    }

    /// Exclusion list of the current workspace.
    pub fn excluded_item_ids(&self) -> &[ItemId] {
        self.state
            .workspaces
            .get(&self.current_workspace_id)
            .map(|workspace| workspace.excluded_item_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Replaces the current workspace's exclusion list. Duplicates are dropped.
    pub fn set_excluded_item_ids(&mut self, item_ids: Vec<ItemId>) -> EngineResult<()> {
        for item_id in &item_ids {
            self.item_ref(*item_id)?;
        }
        let mut deduped = Vec::with_capacity(item_ids.len());
        for item_id in item_ids {
            if !deduped.contains(&item_id) {
                deduped.push(item_id);
            }
        }

        let workspace_id = self.current_workspace_id;
        let workspace = self
            .state
            .workspaces
            .get_mut(&workspace_id)
            .ok_or(EngineError::UnknownWorkspace(workspace_id))?;
        workspace.excluded_item_ids = deduped;
        self.mark(PropertyPath::Workspace(workspace_id));
        Ok(())
    }

    /// Mounted pages not hidden by the current workspace.
    ///
    /// A page is hidden when it or any of its ancestors is excluded.
    pub fn filtered_mounted_page_ids(&self) -> Vec<ItemId> {
        let excluded = self.excluded_item_ids();
        self.state
            .mounted_page_ids
            .iter()
            .copied()
            .filter(|page_id| {
                !excluded.contains(page_id)
                    && !self.ancestor_ids(*page_id).is_ok_and(|ancestors| {
                        ancestors
                            .iter()
                            .any(|ancestor_id| excluded.contains(ancestor_id))
                    })
            })
            .collect()
    }
}
