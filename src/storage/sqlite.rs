//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the storage traits.

use crate::host::Host;
use crate::state::Frontier;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{FrontierStore, RunStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Counts visited and pending hosts without loading them
    pub fn checkpoint_counts(&self) -> StorageResult<(u64, u64)> {
        let visited: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM visited_hosts", [], |row| row.get(0))?;
        let pending: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pending_hosts", [], |row| row.get(0))?;
        Ok((visited as u64, pending as u64))
    }

    fn load_hosts(&self, table: &str) -> StorageResult<BTreeSet<Host>> {
        let mut stmt = self.conn.prepare(&format!("SELECT host FROM {}", table))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut hosts = BTreeSet::new();
        for raw in rows {
            let raw = raw?;
            match Host::parse(&raw) {
                Some(host) => {
                    hosts.insert(host);
                }
                None => tracing::warn!("Ignoring blank host in {}", table),
            }
        }
        Ok(hosts)
    }

    fn row_to_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
        Ok(RunRecord {
            id: row.get(0)?,
            started_at: row.get(1)?,
            finished_at: row.get(2)?,
            config_hash: row.get(3)?,
            seed: row.get(4)?,
            status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
                .unwrap_or(RunStatus::Running),
            hosts_examined: row.get::<_, i64>(6)? as u64,
            edges_written: row.get::<_, i64>(7)? as u64,
        })
    }
}

impl FrontierStore for SqliteStorage {
    fn load(&self) -> StorageResult<Frontier> {
        let visited = self.load_hosts("visited_hosts")?;
        let pending = self.load_hosts("pending_hosts")?;
        Ok(Frontier::from_parts(visited, pending))
    }

    fn save(&mut self, frontier: &Frontier) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM visited_hosts", [])?;
        tx.execute("DELETE FROM pending_hosts", [])?;
        {
            let mut insert = tx.prepare("INSERT INTO visited_hosts (host) VALUES (?1)")?;
            for host in frontier.visited() {
                insert.execute(params![host.as_str()])?;
            }

            let mut insert = tx.prepare("INSERT INTO pending_hosts (host) VALUES (?1)")?;
            for host in frontier.pending() {
                insert.execute(params![host.as_str()])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

impl RunStore for SqliteStorage {
    fn create_run(&mut self, config_hash: &str, seed: Option<&str>) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, seed, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, config_hash, seed, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, seed, status, hosts_examined, edges_written
                 FROM runs WHERE id = ?1",
                params![run_id],
                Self::row_to_run,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, seed, status, hosts_examined, edges_written
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                Self::row_to_run,
            )
            .optional()?;
        Ok(run)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        hosts_examined: u64,
        edges_written: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, hosts_examined = ?3, edges_written = ?4
             WHERE id = ?5",
            params![
                status.to_db_string(),
                now,
                hosts_examined as i64,
                edges_written as i64,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }
}
