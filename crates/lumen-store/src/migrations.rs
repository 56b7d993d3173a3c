//! Idempotent schema setup.

use rusqlite::Connection;

use crate::errors::Result;

/// Create all tables and indexes if they do not exist yet.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sessions (
            id          TEXT PRIMARY KEY,
            store_token TEXT NOT NULL,
            name        TEXT NOT NULL,
            history     TEXT NOT NULL DEFAULT '[]',
            variables   TEXT NOT NULL DEFAULT '{}',
            created_at  TEXT NOT NULL,
            last_active TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_store
            ON sessions (store_token, created_at);

        CREATE TABLE IF NOT EXISTS store_state (
            store_token        TEXT PRIMARY KEY,
            current_session_id TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS records (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            model      TEXT NOT NULL,
            attributes TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_records_model ON records (model);",
    )?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();
    }
}
