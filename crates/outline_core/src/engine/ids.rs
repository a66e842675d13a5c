//! Item id allocation.
//!
//! # Invariants
//! - The free list never holds a live id or an id above `max_item_id`.
//! - The most recently recycled id is handed out first.

use super::{EngineError, EngineResult, OutlineEngine};
use crate::model::item::ItemId;
use crate::mutation::property_path::PropertyPath;

impl OutlineEngine {
    /// Reserves an id for a new item.
    ///
    /// Pops the free list when possible, otherwise bumps `max_item_id`.
    pub fn obtain_new_id(&mut self) -> ItemId {
        if let Some(item_id) = self.state.available_item_ids.pop() {
            self.mark(PropertyPath::AvailableItemIds);
            return item_id;
        }
        self.state.max_item_id += 1;
        self.mark(PropertyPath::MaxItemId);
        self.state.max_item_id
    }

    /// Returns a reserved but unused id to the free list.
    ///
    /// Deletion recycles ids on its own; this is for ids obtained and then
    /// abandoned before an item was created.
    pub fn recycle_id(&mut self, item_id: ItemId) -> EngineResult<()> {
        let recyclable = item_id <= self.state.max_item_id
            && !self.state.items.contains_key(&item_id)
            && !self.state.available_item_ids.contains(&item_id);
        if !recyclable {
            return Err(EngineError::IdNotRecyclable(item_id));
        }
        self.push_free_id(item_id);
        Ok(())
    }

    pub(super) fn push_free_id(&mut self, item_id: ItemId) {
        self.state.available_item_ids.push(item_id);
        self.mark(PropertyPath::AvailableItemIds);
    }
}
