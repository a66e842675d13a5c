//! Contracts consumed from collaborators outside the core.
//!
//! # Responsibility
//! - Supply "now" for item timestamps.
//! - Answer whether a live browser tab is tied to an item.
//!
//! # Invariants
//! - The core never manages tab lifecycle; it only queues tab ids for the
//!   caller to close after a deletion.

use crate::model::item::{ItemId, Timestamp};
use std::time::{SystemTime, UNIX_EPOCH};

/// Browser tab identifier as reported by the host.
pub type TabId = i64;

/// Source of the current time, used only for recency ordering.
pub trait Clock {
    fn now_ms(&self) -> Timestamp;
}

/// Wall clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as Timestamp)
            .unwrap_or_default()
    }
}

/// Lookup from item ids to live tabs.
pub trait TabCorrespondence {
    fn tab_id_for(&self, item_id: ItemId) -> Option<TabId>;
}

/// Correspondence for hosts without tabs (tests, CLI).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTabs;

impl TabCorrespondence for NoTabs {
    fn tab_id_for(&self, _item_id: ItemId) -> Option<TabId> {
        None
    }
}
