//! Whole-state snapshot storage.
//!
//! # Responsibility
//! - Save the root state as one JSON document and load it back.
//!
//! # Invariants
//! - At most one snapshot row exists (`id = 1`); saving replaces it.
//! - A loaded state has passed `RootState::check_integrity`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::engine::EngineError;
use crate::external::{Clock, SystemClock};
use crate::model::state::{RootState, StateIntegrityError};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const SNAPSHOT_ROW_ID: i64 = 1;

pub type StateRepoResult<T> = Result<T, StateRepoError>;

#[derive(Debug)]
pub enum StateRepoError {
    Db(DbError),
    /// Connection was not opened through `db::open_db*`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    Encode(serde_json::Error),
    Decode(serde_json::Error),
    /// Stored or supplied state breaks graph invariants.
    Integrity(StateIntegrityError),
    Engine(EngineError),
}

impl Display for StateRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "state repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "state repository requires table `{table}`")
            }
            Self::Encode(err) => write!(f, "failed to encode state: {err}"),
            Self::Decode(err) => write!(f, "failed to decode stored state: {err}"),
            Self::Integrity(err) => write!(f, "stored state is inconsistent: {err}"),
            Self::Engine(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StateRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) | Self::Decode(err) => Some(err),
            Self::Integrity(err) => Some(err),
            Self::Engine(err) => Some(err),
            Self::UninitializedConnection { .. } | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for StateRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StateRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<StateIntegrityError> for StateRepoError {
    fn from(value: StateIntegrityError) -> Self {
        Self::Integrity(value)
    }
}

impl From<EngineError> for StateRepoError {
    fn from(value: EngineError) -> Self {
        match value {
            EngineError::CorruptState(err) => Self::Integrity(err),
            other => Self::Engine(other),
        }
    }
}

/// Where the engine reads its initial state and flushes on shutdown.
pub trait StateSink {
    /// Latest saved state, or `None` when nothing was saved yet.
    fn load_state(&self) -> StateRepoResult<Option<RootState>>;
    fn save_state(&self, state: &RootState) -> StateRepoResult<()>;
}

/// `StateSink` backed by the `state_snapshots` table.
pub struct SqliteStateRepository<'conn> {
    conn: &'conn Connection,
    clock: Box<dyn Clock>,
}

impl<'conn> SqliteStateRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - Schema version differs from this build's latest.
    /// - `state_snapshots` table is missing.
    pub fn try_new(conn: &'conn Connection) -> StateRepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(StateRepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        if !table_exists(conn, "state_snapshots")? {
            return Err(StateRepoError::MissingRequiredTable("state_snapshots"));
        }
        Ok(Self {
            conn,
            clock: Box::new(SystemClock),
        })
    }

    /// Replaces the time source stamped into `saved_at`.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Millisecond timestamp of the stored snapshot, if any.
    pub fn saved_at(&self) -> StateRepoResult<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT saved_at FROM state_snapshots WHERE id = ?1;",
                [SNAPSHOT_ROW_ID],
                |row| row.get(0),
            )
            .optional()?)
    }
}

impl StateSink for SqliteStateRepository<'_> {
    fn load_state(&self) -> StateRepoResult<Option<RootState>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM state_snapshots WHERE id = ?1;",
                [SNAPSHOT_ROW_ID],
                |row| row.get(0),
            )
            .optional()?;
        let Some(payload) = payload else {
            return Ok(None);
        };

        let state: RootState = serde_json::from_str(&payload).map_err(StateRepoError::Decode)?;
        if let Err(err) = state.check_integrity() {
            error!(
                "event=state_load module=repo status=error error_code=integrity error={}",
                err
            );
            return Err(err.into());
        }
        Ok(Some(state))
    }

    fn save_state(&self, state: &RootState) -> StateRepoResult<()> {
        let started_at = Instant::now();
        state.check_integrity()?;
        let payload = serde_json::to_string(state).map_err(StateRepoError::Encode)?;
        self.conn.execute(
            "INSERT INTO state_snapshots (id, payload, saved_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at;",
            params![SNAPSHOT_ROW_ID, payload, self.clock.now_ms()],
        )?;
        info!(
            "event=state_save module=repo status=ok items={} bytes={} duration_ms={}",
            state.items.len(),
            payload.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

fn table_exists(conn: &Connection, table: &str) -> StateRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
