//! Session Store: persistent mapping of session ID to session record.
//!
//! One logical store exists per user context, keyed by a client-held
//! [`StoreToken`]. Invariants owned here:
//!
//! - the store is never empty: a default session is synthesized on first
//!   access
//! - exactly one session is current at all times
//! - the last remaining session can never be closed
//!
//! `SessionRepository` methods are stateless and take a `&Connection`; the
//! [`SessionStore`] handle wraps them with locking and the invariants.

use std::collections::BTreeMap;

use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tracing::debug;

use lumen_core::{SessionId, StoreToken, Value};

use crate::connection::Database;
use crate::errors::{Result, StoreError};

/// Name given to the session synthesized on first access.
const DEFAULT_SESSION_NAME: &str = "Default Session";

/// Get current UTC timestamp as ISO 8601 string.
fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// One isolated unit of variable bindings and command history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session identifier.
    pub id: SessionId,
    /// Display name.
    pub name: String,
    /// Raw command strings, oldest first, bounded by the history limit.
    pub history: Vec<String>,
    /// Variable bindings visible to evaluation in this session.
    pub variables: BTreeMap<String, Value>,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
    /// Last command / selection timestamp (ISO 8601).
    pub last_active: String,
}

/// Stateless SQL access for session rows.
pub struct SessionRepository;

impl SessionRepository {
    fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Session, String, String)> {
        let id: String = row.get("id")?;
        let name: String = row.get("name")?;
        let history: String = row.get("history")?;
        let variables: String = row.get("variables")?;
        let created_at: String = row.get("created_at")?;
        let last_active: String = row.get("last_active")?;
        Ok((
            Session {
                id: SessionId::from(id),
                name,
                history: Vec::new(),
                variables: BTreeMap::new(),
                created_at,
                last_active,
            },
            history,
            variables,
        ))
    }

    fn decode(parts: (Session, String, String)) -> Result<Session> {
        let (mut session, history_json, variables_json) = parts;
        session.history = serde_json::from_str(&history_json)?;
        session.variables = serde_json::from_str(&variables_json)?;
        Ok(session)
    }

    /// Fetch one session of a store.
    pub fn get(conn: &Connection, token: &StoreToken, id: &SessionId) -> Result<Option<Session>> {
        let row = conn
            .query_row(
                "SELECT * FROM sessions WHERE store_token = ?1 AND id = ?2",
                params![token.as_str(), id.as_str()],
                Self::session_from_row,
            )
            .optional()?;
        row.map(Self::decode).transpose()
    }

    /// All sessions of a store in creation order.
    pub fn list(conn: &Connection, token: &StoreToken) -> Result<Vec<Session>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM sessions WHERE store_token = ?1 ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![token.as_str()], Self::session_from_row)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(Self::decode(row?)?);
        }
        Ok(sessions)
    }

    /// Number of sessions in a store.
    pub fn count(conn: &Connection, token: &StoreToken) -> Result<i64> {
        let n = conn.query_row(
            "SELECT count(*) FROM sessions WHERE store_token = ?1",
            params![token.as_str()],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// Insert a new session row.
    pub fn insert(conn: &Connection, token: &StoreToken, session: &Session) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO sessions (id, store_token, name, history, variables, created_at, last_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session.id.as_str(),
                token.as_str(),
                session.name,
                serde_json::to_string(&session.history)?,
                serde_json::to_string(&session.variables)?,
                session.created_at,
                session.last_active,
            ],
        )?;
        Ok(())
    }

    /// Delete a session row. Returns whether a row existed.
    pub fn delete(conn: &Connection, token: &StoreToken, id: &SessionId) -> Result<bool> {
        let n = conn.execute(
            "DELETE FROM sessions WHERE store_token = ?1 AND id = ?2",
            params![token.as_str(), id.as_str()],
        )?;
        Ok(n > 0)
    }

    /// The store's current session ID, if one is recorded.
    pub fn current_id(conn: &Connection, token: &StoreToken) -> Result<Option<SessionId>> {
        let id: Option<String> = conn
            .query_row(
                "SELECT current_session_id FROM store_state WHERE store_token = ?1",
                params![token.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.map(SessionId::from))
    }

    /// Point the store's current marker at `id`.
    pub fn set_current(conn: &Connection, token: &StoreToken, id: &SessionId) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO store_state (store_token, current_session_id) VALUES (?1, ?2)
             ON CONFLICT (store_token) DO UPDATE SET current_session_id = excluded.current_session_id",
            params![token.as_str(), id.as_str()],
        )?;
        Ok(())
    }

    /// Update `last_active`.
    pub fn touch(conn: &Connection, token: &StoreToken, id: &SessionId, now: &str) -> Result<()> {
        let _ = conn.execute(
            "UPDATE sessions SET last_active = ?3 WHERE store_token = ?1 AND id = ?2",
            params![token.as_str(), id.as_str(), now],
        )?;
        Ok(())
    }

    /// Replace the history column.
    pub fn write_history(
        conn: &Connection,
        token: &StoreToken,
        id: &SessionId,
        history: &[String],
        now: &str,
    ) -> Result<()> {
        let _ = conn.execute(
            "UPDATE sessions SET history = ?3, last_active = ?4
             WHERE store_token = ?1 AND id = ?2",
            params![
                token.as_str(),
                id.as_str(),
                serde_json::to_string(history)?,
                now
            ],
        )?;
        Ok(())
    }

    /// Replace the variables column wholesale.
    pub fn write_variables(
        conn: &Connection,
        token: &StoreToken,
        id: &SessionId,
        variables: &BTreeMap<String, Value>,
        now: &str,
    ) -> Result<()> {
        let _ = conn.execute(
            "UPDATE sessions SET variables = ?3, last_active = ?4
             WHERE store_token = ?1 AND id = ?2",
            params![
                token.as_str(),
                id.as_str(),
                serde_json::to_string(variables)?,
                now
            ],
        )?;
        Ok(())
    }
}

/// Handle for one user context's sessions.
#[derive(Clone, Debug)]
pub struct SessionStore {
    db: Database,
    token: StoreToken,
    history_limit: usize,
}

impl SessionStore {
    /// Create a handle for the store keyed by `token`.
    #[must_use]
    pub fn new(db: Database, token: StoreToken, history_limit: usize) -> Self {
        Self {
            db,
            token,
            history_limit,
        }
    }

    /// The client-held token that keys this store.
    #[must_use]
    pub fn token(&self) -> &StoreToken {
        &self.token
    }

    /// The session marked current, lazily creating the default session if
    /// the store is empty.
    pub fn current(&self) -> Result<Session> {
        let conn = self.db.lock();
        self.current_in(&conn)
    }

    fn current_in(&self, conn: &Connection) -> Result<Session> {
        if let Some(id) = SessionRepository::current_id(conn, &self.token)? {
            if let Some(session) = SessionRepository::get(conn, &self.token, &id)? {
                return Ok(session);
            }
        }
        // No current marker (first contact) or a stale one: fall back to the
        // first existing session, or synthesize the default.
        if let Some(first) = SessionRepository::list(conn, &self.token)?.into_iter().next() {
            SessionRepository::set_current(conn, &self.token, &first.id)?;
            return Ok(first);
        }
        let session = self.insert_new(conn, DEFAULT_SESSION_NAME.to_owned())?;
        debug!(session_id = %session.id, "synthesized default session");
        Ok(session)
    }

    fn insert_new(&self, conn: &Connection, name: String) -> Result<Session> {
        let now = now_iso();
        let session = Session {
            id: SessionId::new(),
            name,
            history: Vec::new(),
            variables: BTreeMap::new(),
            created_at: now.clone(),
            last_active: now,
        };
        SessionRepository::insert(conn, &self.token, &session)?;
        SessionRepository::set_current(conn, &self.token, &session.id)?;
        Ok(session)
    }

    /// Create a session and make it current. A default name is synthesized
    /// when none is given.
    pub fn create(&self, name: Option<String>) -> Result<Session> {
        let conn = self.db.lock();
        let name = match name {
            Some(n) if !n.trim().is_empty() => n,
            _ => {
                let n = SessionRepository::count(&conn, &self.token)?;
                format!("Session {}", n + 1)
            }
        };
        let session = self.insert_new(&conn, name)?;
        debug!(session_id = %session.id, name = %session.name, "session created");
        Ok(session)
    }

    /// Switch the current pointer to `id`, touching its `last_active`.
    pub fn select(&self, id: &SessionId) -> Result<Session> {
        let conn = self.db.lock();
        if SessionRepository::get(&conn, &self.token, id)?.is_none() {
            return Err(StoreError::SessionNotFound {
                id: id.to_string(),
            });
        }
        SessionRepository::touch(&conn, &self.token, id, &now_iso())?;
        SessionRepository::set_current(&conn, &self.token, id)?;
        SessionRepository::get(&conn, &self.token, id)?.ok_or_else(|| {
            StoreError::SessionNotFound {
                id: id.to_string(),
            }
        })
    }

    /// Close a session. Returns the closed session and the session that is
    /// current afterwards. Refuses to remove the only remaining entry.
    pub fn close(&self, id: &SessionId) -> Result<(Session, Session)> {
        let conn = self.db.lock();
        let closed = SessionRepository::get(&conn, &self.token, id)?.ok_or_else(|| {
            StoreError::SessionNotFound {
                id: id.to_string(),
            }
        })?;
        if SessionRepository::count(&conn, &self.token)? <= 1 {
            return Err(StoreError::LastSession);
        }
        let was_current =
            SessionRepository::current_id(&conn, &self.token)?.as_ref() == Some(id);
        let _ = SessionRepository::delete(&conn, &self.token, id)?;

        let new_current = if was_current {
            // First remaining session in creation order becomes current.
            let first = SessionRepository::list(&conn, &self.token)?
                .into_iter()
                .next()
                .ok_or(StoreError::LastSession)?;
            SessionRepository::set_current(&conn, &self.token, &first.id)?;
            first
        } else {
            self.current_in(&conn)?
        };
        debug!(closed = %closed.id, current = %new_current.id, "session closed");
        Ok((closed, new_current))
    }

    /// All sessions in creation order plus the current session's ID.
    ///
    /// Never returns an empty list; the default session is synthesized on
    /// first access.
    pub fn list(&self) -> Result<(Vec<Session>, SessionId)> {
        let conn = self.db.lock();
        let current = self.current_in(&conn)?;
        let sessions = SessionRepository::list(&conn, &self.token)?;
        Ok((sessions, current.id))
    }

    /// Fetch one session.
    pub fn get(&self, id: &SessionId) -> Result<Session> {
        let conn = self.db.lock();
        SessionRepository::get(&conn, &self.token, id)?.ok_or_else(|| {
            StoreError::SessionNotFound {
                id: id.to_string(),
            }
        })
    }

    /// Append a command to the session's history, trimming to the history
    /// limit (oldest evicted first).
    pub fn record_command(&self, id: &SessionId, command: &str) -> Result<()> {
        let conn = self.db.lock();
        let session = SessionRepository::get(&conn, &self.token, id)?.ok_or_else(|| {
            StoreError::SessionNotFound {
                id: id.to_string(),
            }
        })?;
        let mut history = session.history;
        history.push(command.to_owned());
        if history.len() > self.history_limit {
            let excess = history.len() - self.history_limit;
            history.drain(..excess);
        }
        SessionRepository::write_history(&conn, &self.token, id, &history, &now_iso())
    }

    /// Replace the session's variable mapping wholesale.
    ///
    /// The evaluator hands back the entire post-evaluation variable set,
    /// not a diff.
    pub fn write_variables(
        &self,
        id: &SessionId,
        variables: &BTreeMap<String, Value>,
    ) -> Result<()> {
        let conn = self.db.lock();
        if SessionRepository::get(&conn, &self.token, id)?.is_none() {
            return Err(StoreError::SessionNotFound {
                id: id.to_string(),
            });
        }
        SessionRepository::write_variables(&conn, &self.token, id, variables, &now_iso())
    }

    /// Empty the session's history and variables, keeping its identity.
    pub fn clear(&self, id: &SessionId) -> Result<()> {
        let conn = self.db.lock();
        if SessionRepository::get(&conn, &self.token, id)?.is_none() {
            return Err(StoreError::SessionNotFound {
                id: id.to_string(),
            });
        }
        let now = now_iso();
        SessionRepository::write_history(&conn, &self.token, id, &[], &now)?;
        SessionRepository::write_variables(&conn, &self.token, id, &BTreeMap::new(), &now)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
