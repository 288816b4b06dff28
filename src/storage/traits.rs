//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::Frontier;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable home of the crawl checkpoint
///
/// Both sets are written together: a `load` after a `save` observes either the
/// previous checkpoint or the new one, never a mix of the two.
pub trait FrontierStore {
    /// Loads the last saved checkpoint (empty if none was ever saved)
    fn load(&self) -> StorageResult<Frontier>;

    /// Replaces the saved checkpoint with `frontier`
    fn save(&mut self, frontier: &Frontier) -> StorageResult<()>;
}

/// Bookkeeping for crawl runs
pub trait RunStore {
    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration text
    /// * `seed` - The seed host, or `None` when resuming
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, seed: Option<&str>) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Closes a run with its final status and counters
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        hosts_examined: u64,
        edges_written: u64,
    ) -> StorageResult<()>;
}
