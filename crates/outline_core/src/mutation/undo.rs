//! Snapshot-based undo history.
//!
//! # Invariants
//! - Holds at most `limit` snapshots; the oldest is dropped first.
//! - Snapshots share item records with the live state until either side writes.

use crate::model::item::ItemId;
use crate::model::state::RootState;
use crate::mutation::property_path::PropertyPath;
use std::collections::{BTreeSet, VecDeque};

/// State and pending mutations captured at one undo point.
#[derive(Debug, Clone)]
pub struct UndoSnapshot {
    pub state: RootState,
    pub pending: BTreeSet<PropertyPath>,
}

#[derive(Debug)]
pub struct UndoHistory {
    snapshots: VecDeque<UndoSnapshot>,
    limit: usize,
}

impl UndoHistory {
    /// `limit` is clamped to at least one snapshot.
    pub fn new(limit: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, snapshot: UndoSnapshot) {
        if self.snapshots.len() == self.limit {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Option<UndoSnapshot> {
        self.snapshots.pop_back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Whether any retained snapshot still references `item_id`.
    pub fn references_item(&self, item_id: ItemId) -> bool {
        self.snapshots
            .iter()
            .any(|snapshot| snapshot.state.items.contains_key(&item_id))
    }
}

#[cfg(test)]
mod tests {
    use super::{UndoHistory, UndoSnapshot};
    use crate::model::state::RootState;
    use std::collections::BTreeSet;

    fn snapshot(max_item_id: u64) -> UndoSnapshot {
        let mut state = RootState::initial(0, "Main");
        state.max_item_id = max_item_id;
        UndoSnapshot {
            state,
            pending: BTreeSet::new(),
        }
    }

    #[test]
    fn keeps_only_latest_snapshots_up_to_limit() {
        let mut history = UndoHistory::new(2);
        history.push(snapshot(1));
        history.push(snapshot(2));
        history.push(snapshot(3));

        assert_eq!(history.len(), 2);
        assert_eq!(history.pop().unwrap().state.max_item_id, 3);
        assert_eq!(history.pop().unwrap().state.max_item_id, 2);
        assert!(history.pop().is_none());
    }

    #[test]
    fn zero_limit_still_keeps_one_level() {
        let mut history = UndoHistory::new(0);
        history.push(snapshot(1));
        history.push(snapshot(2));
        assert_eq!(history.len(), 1);
        assert_eq!(history.pop().unwrap().state.max_item_id, 2);
    }
}
