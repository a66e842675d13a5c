//! Engine configuration.
//!
//! # Responsibility
//! - Carry tunables that callers may override from a JSON document.
//!
//! # Invariants
//! - Missing fields fall back to `EngineConfig::default()`.
//! - A config is only handed to the engine after `validate()` succeeds.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_UNDO_HISTORY_LIMIT: usize = 1;
const DEFAULT_WORKSPACE_NAME: &str = "Workspace 1";
const MAX_UNDO_HISTORY_LIMIT: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of undo snapshots kept. One level is the baseline contract.
    pub undo_history_limit: usize,
    /// Name given to the workspace created with a fresh seed state.
    pub default_workspace_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            undo_history_limit: DEFAULT_UNDO_HISTORY_LIMIT,
            default_workspace_name: DEFAULT_WORKSPACE_NAME.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(value: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(value).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.undo_history_limit == 0 || self.undo_history_limit > MAX_UNDO_HISTORY_LIMIT {
            return Err(ConfigError::UndoHistoryLimitOutOfRange(
                self.undo_history_limit,
            ));
        }
        if self.default_workspace_name.trim().is_empty() {
            return Err(ConfigError::BlankWorkspaceName);
        }
        Ok(())
    }
}

/// Config parse/validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    UndoHistoryLimitOutOfRange(usize),
    BlankWorkspaceName,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid engine config: {message}"),
            Self::UndoHistoryLimitOutOfRange(value) => write!(
                f,
                "undo_history_limit must be within 1..={MAX_UNDO_HISTORY_LIMIT}, got {value}"
            ),
            Self::BlankWorkspaceName => write!(f, "default_workspace_name must not be blank"),
        }
    }
}

impl Error for ConfigError {}
