//! Pending-mutation set and commit listeners.
//!
//! # Invariants
//! - The pending set only grows between commits.
//! - `commit` delivers the full set to every listener exactly once, then clears it.

use crate::model::state::RootState;
use crate::mutation::property_path::PropertyPath;
use log::debug;
use std::collections::BTreeSet;

/// Callback invoked once per commit with the state and the changed paths.
pub type MutationListener = Box<dyn FnMut(&RootState, &BTreeSet<PropertyPath>)>;

/// Handle returned by listener registration, used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct MutationTracker {
    pending: BTreeSet<PropertyPath>,
    listeners: Vec<(ListenerId, MutationListener)>,
    next_listener_id: u64,
}

impl MutationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, path: PropertyPath) {
        self.pending.insert(path);
    }

    pub fn pending(&self) -> &BTreeSet<PropertyPath> {
        &self.pending
    }

    pub(crate) fn replace_pending(&mut self, pending: BTreeSet<PropertyPath>) {
        self.pending = pending;
    }

    pub fn add_listener(&mut self, listener: MutationListener) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns whether a listener with this id was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(current, _)| *current != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Notifies every listener with the accumulated set and clears it.
    pub fn commit(&mut self, state: &RootState) {
        debug!(
            "event=commit module=mutation status=ok mutated={} listeners={}",
            self.pending.len(),
            self.listeners.len()
        );
        for (_, listener) in self.listeners.iter_mut() {
            listener(state, &self.pending);
        }
        self.pending.clear();
    }
}
