#![forbid(unsafe_code)]

mod blocks;
mod config;
mod error;
mod proposals;
mod requests;
mod support;
mod types;
mod vcs;

pub use config::*;
pub use error::{ErrorKind, StoreError};
pub use requests::*;
pub use types::*;

use mb_core::ids::{AgentId, BlockLabel, UserId};
use mb_core::{MAIN_BRANCH, RowKey};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use support::*;
use vcs::*;

/// Versioned block store backed by a single SQLite database.
///
/// Every mutating call runs in one `BEGIN IMMEDIATE` transaction, so writes
/// from any number of handles on the same storage directory serialize.
/// Multi-statement reads run in a deferred transaction and see one snapshot.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    config: StoreConfig,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_config(StoreConfig::new(storage_dir))
    }

    pub fn open_with_config(config: StoreConfig) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&config.storage_dir)?;

        let mut conn = Connection::open(config.db_path())?;
        conn.busy_timeout(config.busy_timeout)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;\
             PRAGMA synchronous = NORMAL;\
             PRAGMA foreign_keys = ON;",
        )?;

        preflight_gate(&conn)?;
        install_schema(&mut conn, now_ms())?;

        log::info!("opened block store at {}", config.db_path().display());
        Ok(Self { conn, config })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.config.storage_dir
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn main_branch_name(&self) -> &'static str {
        MAIN_BRANCH
    }

    fn write_tx(&mut self) -> Result<Transaction<'_>, StoreError> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    fn read_tx(&self) -> Result<Transaction<'_>, StoreError> {
        Ok(self.conn.unchecked_transaction()?)
    }
}

/// Validated (user_id, label) pair mapped onto a store key.
fn block_key(user_id: &str, label: &str) -> Result<RowKey, StoreError> {
    let user_id = UserId::try_new(user_id).map_err(|_| StoreError::InvalidInput("invalid user_id"))?;
    let label = BlockLabel::try_new(label).map_err(|_| StoreError::InvalidInput("invalid label"))?;
    Ok(RowKey::new(user_id.into_string(), label.into_string()))
}

fn validate_user_id(user_id: &str) -> Result<(), StoreError> {
    UserId::try_new(user_id)
        .map(|_| ())
        .map_err(|_| StoreError::InvalidInput("invalid user_id"))
}

fn validate_agent_id(agent_id: &str) -> Result<(), StoreError> {
    AgentId::try_new(agent_id)
        .map(|_| ())
        .map_err(|_| StoreError::InvalidInput("invalid agent_id"))
}
