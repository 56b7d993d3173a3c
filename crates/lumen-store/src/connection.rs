//! Single-connection SQLite handle with pragmas and migrations applied.
//!
//! The handle is cheaply cloneable; all clones share one connection behind
//! a `parking_lot::Mutex`. Locking per operation gives read-modify-write
//! atomicity per store, and the rollback wrapper in
//! [`crate::records::RecordStore`] holds the lock across its whole
//! transaction.

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use rusqlite::Connection;
use tracing::debug;

use crate::errors::Result;
use crate::migrations;

/// Shared handle to one SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open an in-memory database (tests, default configuration).
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Open (or create) a file-backed database.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = 30000;\
             PRAGMA foreign_keys = ON;\
             PRAGMA synchronous = NORMAL;",
        )?;
        migrations::run(&conn)?;
        debug!("database opened and migrated");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Lock the connection for a sequence of statements.
    pub fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    /// Run `f` with the locked connection.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        let conn = self.conn.lock();
        f(&conn)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
