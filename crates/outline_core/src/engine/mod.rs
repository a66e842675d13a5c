//! Item graph mutation engine.
//!
//! # Responsibility
//! - Own the root state exclusively and expose the only legal write paths.
//! - Keep child lists and parent maps in agreement after every operation.
//! - Record a property path for every write and deliver them at commit.
//! - Keep snapshots for undo.
//!
//! # Invariants
//! - Operations validate first and mutate second; an `Err` leaves the state
//!   and the pending-mutation set untouched.
//! - The graph stays acyclic: edge insertions are checked for reachability.
//! - Single-threaded: listeners and collaborators are not `Send`.

mod content;
mod error;
mod graph;
mod ids;
mod page;
mod reorder;
mod workspace;

pub use error::{EngineError, EngineResult};

use crate::config::EngineConfig;
use crate::external::{Clock, NoTabs, SystemClock, TabCorrespondence, TabId};
use crate::model::item::{Item, ItemId};
use crate::model::state::{RootState, Workspace, WorkspaceId};
use crate::mutation::property_path::PropertyPath;
use crate::mutation::tracker::{ListenerId, MutationListener, MutationTracker};
use crate::mutation::undo::{UndoHistory, UndoSnapshot};
use crate::repo::state_repo::{StateRepoResult, StateSink};
use log::info;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// Context object owning one outline state and its change tracking.
pub struct OutlineEngine {
    state: RootState,
    tracker: MutationTracker,
    history: UndoHistory,
    clock: Box<dyn Clock>,
    tabs: Box<dyn TabCorrespondence>,
    /// Tabs of deleted items, with the item each belonged to.
    tabs_to_close: Vec<(ItemId, TabId)>,
    current_workspace_id: WorkspaceId,
    config: EngineConfig,
}

impl OutlineEngine {
    /// Creates an engine over a fresh seed state.
    pub fn new(config: EngineConfig) -> Self {
        let clock: Box<dyn Clock> = Box::new(SystemClock);
        let state = RootState::initial(clock.now_ms(), &config.default_workspace_name);
        Self::assemble(state, config, clock)
    }

    /// Creates an engine over an existing state after checking its invariants.
    pub fn from_state(state: RootState, config: EngineConfig) -> EngineResult<Self> {
        state.check_integrity()?;
        Ok(Self::assemble(state, config, Box::new(SystemClock)))
    }

    /// Loads the persisted state from `sink`, or seeds a new one if none exists.
    ///
    /// # Errors
    /// - Returns sink errors unchanged, including integrity failures.
    pub fn load_or_seed<S: StateSink>(sink: &S, config: EngineConfig) -> StateRepoResult<Self> {
        match sink.load_state()? {
            Some(state) => {
                info!(
                    "event=state_load module=engine status=ok source=sink items={}",
                    state.items.len()
                );
                Ok(Self::from_state(state, config)?)
            }
            None => {
                info!("event=state_load module=engine status=ok source=seed");
                Ok(Self::new(config))
            }
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the tab correspondence consulted on deletion.
    pub fn with_tabs(mut self, tabs: Box<dyn TabCorrespondence>) -> Self {
        self.tabs = tabs;
        self
    }

    fn assemble(mut state: RootState, config: EngineConfig, clock: Box<dyn Clock>) -> Self {
        let mut tracker = MutationTracker::new();
        let current_workspace_id = match state.workspaces.keys().next() {
            Some(id) => *id,
            None => {
                let id = Uuid::new_v4();
                state.workspaces.insert(
                    id,
                    Workspace {
                        name: config.default_workspace_name.clone(),
                        excluded_item_ids: Vec::new(),
                        active_page_id: crate::model::item::TOP_ITEM_ID,
                    },
                );
                tracker.mark(PropertyPath::Workspace(id));
                id
            }
        };

        Self {
            state,
            tracker,
            history: UndoHistory::new(config.undo_history_limit),
            clock,
            tabs: Box::new(NoTabs),
            tabs_to_close: Vec::new(),
            current_workspace_id,
            config,
        }
    }

    /// Read-only view of the state, valid until the next mutation.
    pub fn state(&self) -> &RootState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Property paths recorded since the last commit.
    pub fn pending_mutations(&self) -> &BTreeSet<PropertyPath> {
        self.tracker.pending()
    }

    pub fn add_mutation_listener(&mut self, listener: MutationListener) -> ListenerId {
        self.tracker.add_listener(listener)
    }

    pub fn remove_mutation_listener(&mut self, id: ListenerId) -> bool {
        self.tracker.remove_listener(id)
    }

    /// Delivers pending mutations to every listener and clears them.
    pub fn commit(&mut self) {
        self.tracker.commit(&self.state);
    }

    /// Captures the current state and pending set as the next undo point.
    pub fn save_snapshot_for_undo(&mut self) {
        self.history.push(UndoSnapshot {
            state: self.state.clone(),
            pending: self.tracker.pending().clone(),
        });
    }

    /// Restores the latest undo point. Returns `false` when there is none.
    ///
    /// The restored pending set gains `StateReplaced` so the next commit
    /// redraws everything. Ids are not recycled by undo. Queued tabs of items
    /// that are live again are dropped from the close queue.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop() else {
            return false;
        };

        self.state = snapshot.state;
        let mut pending = snapshot.pending;
        pending.insert(PropertyPath::StateReplaced);
        self.tracker.replace_pending(pending);

        let state = &self.state;
        self.tabs_to_close
            .retain(|(item_id, _)| !state.items.contains_key(item_id));

        if !self
            .state
            .workspaces
            .contains_key(&self.current_workspace_id)
        {
            if let Some(id) = self.state.workspaces.keys().next() {
                self.current_workspace_id = *id;
            }
        }

        info!(
            "event=undo module=engine status=ok items={} remaining_snapshots={}",
            self.state.items.len(),
            self.history.len()
        );
        true
    }

    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// Whether a retained undo snapshot still contains `item_id`.
    ///
    /// Callers holding external references to recycled ids check this before
    /// reusing them.
    pub fn is_referenced_by_undo_history(&self, item_id: ItemId) -> bool {
        self.history.references_item(item_id)
    }

    /// Drains tab ids queued for closing by deletions.
    pub fn take_tabs_to_close(&mut self) -> Vec<TabId> {
        std::mem::take(&mut self.tabs_to_close)
            .into_iter()
            .map(|(_, tab_id)| tab_id)
            .collect()
    }

    /// Writes the current state to `sink`.
    pub fn persist<S: StateSink>(&self, sink: &S) -> StateRepoResult<()> {
        sink.save_state(&self.state)
    }

    /// Commits pending mutations, flushes the state and drops the engine.
    pub fn shutdown<S: StateSink>(mut self, sink: &S) -> StateRepoResult<()> {
        self.commit();
        self.persist(sink)?;
        info!("event=engine_shutdown module=engine status=ok");
        Ok(())
    }

    fn now(&self) -> crate::model::item::Timestamp {
        self.clock.now_ms()
    }

    fn mark(&mut self, path: PropertyPath) {
        self.tracker.mark(path);
    }

    fn item_ref(&self, item_id: ItemId) -> EngineResult<&Item> {
        self.state
            .item(item_id)
            .ok_or(EngineError::UnknownItem(item_id))
    }

    /// Copy-on-write access to an item record shared with undo snapshots.
    fn item_mut(&mut self, item_id: ItemId) -> EngineResult<&mut Item> {
        self.state
            .items
            .get_mut(&item_id)
            .map(Arc::make_mut)
            .ok_or(EngineError::UnknownItem(item_id))
    }
}
