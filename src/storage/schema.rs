//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Peer-Ripple database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    seed TEXT,
    status TEXT NOT NULL,
    hosts_examined INTEGER NOT NULL DEFAULT 0,
    edges_written INTEGER NOT NULL DEFAULT 0
);

-- Checkpoint: hosts already examined
CREATE TABLE IF NOT EXISTS visited_hosts (
    host TEXT PRIMARY KEY
) WITHOUT ROWID;

-- Checkpoint: hosts discovered but not yet examined
CREATE TABLE IF NOT EXISTS pending_hosts (
    host TEXT PRIMARY KEY
) WITHOUT ROWID;
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
