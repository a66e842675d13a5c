//! Keyboard-level structure edits: indent, unindent and sibling moves.
//!
//! Each returns the path of the moved occurrence, or `Ok(None)` when the
//! move has nowhere to go (first child, page root, top level).

use super::{EngineResult, OutlineEngine};
use crate::model::path::ItemPath;
use crate::mutation::property_path::PropertyPath;

impl OutlineEngine {
    /// Moves the item under its previous sibling, as that sibling's last child.
    ///
    /// The new parent is expanded so the moved item stays visible.
    pub fn indent(&mut self, path: &ItemPath) -> EngineResult<Option<ItemPath>> {
        let Some(parent_id) = path.parent_id() else {
            return Ok(None);
        };
        let item_id = path.item_id();
        let index = self.child_position(parent_id, item_id)?;
        if index == 0 {
            return Ok(None);
        }
        let new_parent_id = self.child_ids(parent_id)?[index - 1];
        self.ensure_can_attach(new_parent_id, item_id)?;

        let edge = self.detach(parent_id, item_id);
        self.insert_as_last_child(new_parent_id, item_id, Some(edge))?;

        let Some(new_parent_path) = path.with_sibling_id(new_parent_id) else {
            return Ok(None);
        };
        self.set_is_collapsed(&new_parent_path, false)?;
        Ok(Some(new_parent_path.child(item_id)))
    }

    /// Moves the item out of its parent, right after the parent.
    pub fn unindent(&mut self, path: &ItemPath) -> EngineResult<Option<ItemPath>> {
        let Some(parent_path) = path.parent() else {
            return Ok(None);
        };
        let Some(grandparent_id) = parent_path.parent_id() else {
            return Ok(None);
        };
        let parent_id = parent_path.item_id();
        let item_id = path.item_id();
        self.child_position(parent_id, item_id)?;
        self.child_position(grandparent_id, parent_id)?;
        self.ensure_can_attach(grandparent_id, item_id)?;

        let edge = self.detach(parent_id, item_id);
        self.insert_as_next_sibling(&parent_path, item_id, Some(edge))?;
        Ok(parent_path.with_sibling_id(item_id))
    }

    /// Swaps the item with its previous sibling.
    pub fn move_to_prev_sibling(&mut self, path: &ItemPath) -> EngineResult<Option<ItemPath>> {
        let Some(parent_id) = path.parent_id() else {
            return Ok(None);
        };
        let index = self.child_position(parent_id, path.item_id())?;
        if index == 0 {
            return Ok(None);
        }
        self.item_mut(parent_id)?.child_ids.swap(index - 1, index);
        self.mark(PropertyPath::ChildIds(parent_id));
        Ok(Some(path.clone()))
    }

    /// Swaps the item with its next sibling.
    pub fn move_to_next_sibling(&mut self, path: &ItemPath) -> EngineResult<Option<ItemPath>> {
        let Some(parent_id) = path.parent_id() else {
            return Ok(None);
        };
        let index = self.child_position(parent_id, path.item_id())?;
        if index + 1 >= self.child_ids(parent_id)?.len() {
            return Ok(None);
        }
        self.item_mut(parent_id)?.child_ids.swap(index, index + 1);
        self.mark(PropertyPath::ChildIds(parent_id));
        Ok(Some(path.clone()))
    }
}
