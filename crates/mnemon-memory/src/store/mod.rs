//! Memory store implementation using SQLite.
//!
//! Provides durable storage for memory entries scoped by user, session, and
//! agent, with keyword relevance search, age-based cleanup, and
//! importance-based eviction.
//!
//! All access goes through a single `Mutex<Connection>`: mutations serialize
//! against each other and reads never observe a half-written row. The
//! eviction sweep runs inside `insert` under the same guard acquisition, so
//! two concurrent inserts can't both observe "under capacity" and skip it.

mod entry_ops;
mod maintenance;
pub mod query;
mod search;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use crate::config::MemoryConfig;
use crate::error::{MemoryError, Result};

pub use query::{ListFilter, SearchHit, SearchQuery, StoreStats, UpdatePatch};

/// Current schema version for migrations.
const SCHEMA_VERSION: i32 = 1;

// ─────────────────────────────────────────────────────────────────────────────
// Memory Store
// ─────────────────────────────────────────────────────────────────────────────

/// Memory store backed by SQLite.
///
/// Uses WAL mode for better concurrent read performance. The store owns its
/// synchronization primitive and is shared across request-handling tasks via
/// `Arc`; open it at process start and drop it at shutdown.
pub struct MemoryStore {
    /// The SQLite connection (wrapped in Mutex for thread safety).
    pub(crate) conn: Mutex<Connection>,
    /// Capacity and tuning thresholds.
    pub(crate) config: MemoryConfig,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Initialization
// ─────────────────────────────────────────────────────────────────────────────

impl MemoryStore {
    /// Open or create a memory store at the given path with default config.
    ///
    /// Creates the database file and initializes the schema if it doesn't
    /// exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, MemoryConfig::default())
    }

    /// Open or create a memory store at the given path.
    pub fn open_with_config(path: impl AsRef<Path>, config: MemoryConfig) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|_| {
                    MemoryError::Storage(rusqlite::Error::InvalidPath(path.to_path_buf()))
                })?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )?;

        let store = Self {
            conn: Mutex::new(conn),
            config,
        };
        store.initialize()?;

        info!("Memory store opened at {:?}", path);
        Ok(store)
    }

    /// Create an in-memory store with default config (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::open_in_memory_with_config(MemoryConfig::default())
    }

    /// Create an in-memory store.
    pub fn open_in_memory_with_config(config: MemoryConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
            config,
        };
        store.initialize()?;

        info!("In-memory store created");
        Ok(store)
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Initialize the database with schema and pragmas.
    fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        // Enable WAL mode for better concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        self.create_schema(&conn)?;

        Ok(())
    }

    /// Create the database schema.
    fn create_schema(&self, conn: &Connection) -> Result<()> {
        // Check current schema version
        let current_version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);

        if current_version >= SCHEMA_VERSION {
            debug!("Schema up to date (version {})", current_version);
            return Ok(());
        }

        info!(
            "Migrating schema from version {} to {}",
            current_version, SCHEMA_VERSION
        );

        conn.execute_batch(
            r#"
            -- Memory entries: one row per stored fact/utterance
            CREATE TABLE IF NOT EXISTS memory_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                session_id TEXT,
                agent_id TEXT,
                content TEXT NOT NULL,
                metadata TEXT NOT NULL DEFAULT '{}',
                tags TEXT NOT NULL DEFAULT '[]',
                importance REAL NOT NULL DEFAULT 1.0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Every query scopes by user
            CREATE INDEX IF NOT EXISTS idx_entries_user
                ON memory_entries(user_id);

            -- Session-scoped recall
            CREATE INDEX IF NOT EXISTS idx_entries_user_session
                ON memory_entries(user_id, session_id);

            -- Agent-scoped recall
            CREATE INDEX IF NOT EXISTS idx_entries_user_agent
                ON memory_entries(user_id, agent_id);

            -- Cleanup and eviction ordering
            CREATE INDEX IF NOT EXISTS idx_entries_created_at
                ON memory_entries(created_at);
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        info!("Schema created (version {})", SCHEMA_VERSION);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stats
// ─────────────────────────────────────────────────────────────────────────────

impl MemoryStore {
    /// Total entry count, optionally scoped to one user.
    pub fn count(&self, user_id: Option<&str>) -> Result<usize> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = if let Some(uid) = user_id {
            conn.query_row(
                "SELECT COUNT(*) FROM memory_entries WHERE user_id = ?1",
                rusqlite::params![uid],
                |row| row.get(0),
            )?
        } else {
            conn.query_row("SELECT COUNT(*) FROM memory_entries", [], |row| row.get(0))?
        };

        Ok(count as usize)
    }

    /// Get database statistics.
    pub fn stats(&self) -> Result<StoreStats> {
        let entry_count = self.count(None)?;

        Ok(StoreStats {
            entry_count,
            schema_version: SCHEMA_VERSION,
            max_entries: self.config.max_entries,
        })
    }
}
