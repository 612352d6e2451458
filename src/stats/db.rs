//! SQLite database connection and schema management for statistics
//!
//! Manages the `~/.skipfeed/stats.db` database with automatic schema migration.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

use crate::config::Config;

/// Database wrapper shared by the event log and the key-value store
#[derive(Clone)]
pub struct StatsDb {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl StatsDb {
    /// Open or create the stats database at the default location (~/.skipfeed/stats.db)
    pub fn open_default() -> Result<Self> {
        let db_path = Config::global_config_dir().join("stats.db");
        Self::open(&db_path)
    }

    /// Open or create the stats database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create stats dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open stats db: {}", path.display()))?;

        // WAL lets the CLI read while another process records searches
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        // Other processes may hold the write lock briefly (badge updates)
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory stats db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Get a reference to the connection (for queries)
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("Stats DB lock poisoned")
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        drop(conn);
        self.run_migrations()?;
        Ok(())
    }

    /// Run any pending migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn();

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: key-value table for badge state and other small documents
        if version < 2 {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS kv_store (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                "#,
            )?;
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
            debug!("Applied stats db migration 2");
        }

        Ok(())
    }

    /// Delete all recorded searches
    /// Note: This does NOT reset unlocked badges - use reset_badges() for that
    pub fn reset_all(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM search_events", [])?;
        Ok(())
    }

    /// Delete all stored key-value documents (badge state)
    pub fn reset_badges(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM kv_store", [])?;
        Ok(())
    }
}

/// SQL schema for the stats database
const SCHEMA_SQL: &str = r#"
-- Search events (append-only, one row per performed search)
CREATE TABLE IF NOT EXISTS search_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    query TEXT NOT NULL,
    platform TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    result_count INTEGER
);
CREATE INDEX IF NOT EXISTS idx_search_timestamp ON search_events(timestamp);
CREATE INDEX IF NOT EXISTS idx_search_platform ON search_events(platform);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;
