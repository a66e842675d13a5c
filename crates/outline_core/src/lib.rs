//! Outline item graph and mutation engine.
//! This crate is the single source of truth for graph invariants.

pub mod config;
pub mod db;
pub mod engine;
pub mod external;
pub mod logging;
pub mod model;
pub mod mutation;
pub mod repo;

pub use config::{ConfigError, EngineConfig};
pub use engine::{EngineError, EngineResult, OutlineEngine};
pub use external::{Clock, NoTabs, SystemClock, TabCorrespondence, TabId};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::content::{
    CodeBlockItem, ImageItem, ItemContent, TexItem, TextItem, WebPageItem,
};
pub use model::item::{Cite, Edge, Item, ItemId, ItemType, Timestamp, TOP_ITEM_ID};
pub use model::path::{ItemPath, PathError};
pub use model::state::{Page, RootState, StateIntegrityError, Workspace, WorkspaceId};
pub use mutation::property_path::PropertyPath;
pub use mutation::tracker::{ListenerId, MutationListener};
pub use repo::state_repo::{SqliteStateRepository, StateRepoError, StateRepoResult, StateSink};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
