//! Wire shapes at the transport boundary.
//!
//! Transport itself (HTTP routing, rendering) is out of scope; these types
//! are what a transport layer serializes.

use serde::{Deserialize, Serialize};

use lumen_core::{Rendered, SessionId};
use lumen_store::Session;

/// Outcome of one command, success or failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command as received (trimmed).
    pub command: String,
    /// Rendered result; absent on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Rendered>,
    /// Human-readable error message; absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable machine-readable error code; absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// Completion timestamp (ISO 8601).
    pub timestamp: String,
    /// Session the command ran against.
    pub session_id: SessionId,
    /// `"trusted"` or `"sandbox"`.
    pub mode: String,
}

/// One row of a session listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session identifier.
    pub id: SessionId,
    /// Display name.
    pub name: String,
    /// Commands currently held in history.
    pub command_count: usize,
    /// Variables currently bound.
    pub variable_count: usize,
    /// Whether this session is the store's current one.
    pub is_current: bool,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
    /// Last command / selection timestamp (ISO 8601).
    pub last_active: String,
}

impl SessionSummary {
    /// Summarize a session, marking it current when its ID matches.
    #[must_use]
    pub fn from_session(session: &Session, current: &SessionId) -> Self {
        Self {
            id: session.id.clone(),
            name: session.name.clone(),
            command_count: session.history.len(),
            variable_count: session.variables.len(),
            is_current: &session.id == current,
            created_at: session.created_at.clone(),
            last_active: session.last_active.clone(),
        }
    }
}

/// Full view of one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    /// Session identifier.
    pub id: SessionId,
    /// Display name.
    pub name: String,
    /// Raw command strings, oldest first.
    pub history: Vec<String>,
    /// Names of currently bound variables, sorted.
    pub variable_names: Vec<String>,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
    /// Last command / selection timestamp (ISO 8601).
    pub last_active: String,
}

impl SessionDetail {
    /// Detail view of a session.
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            name: session.name.clone(),
            history: session.history.clone(),
            variable_names: session.variables.keys().cloned().collect(),
            created_at: session.created_at.clone(),
            last_active: session.last_active.clone(),
        }
    }
}

/// All sessions of a store plus the current marker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionListing {
    /// Summaries in creation order.
    pub sessions: Vec<SessionSummary>,
    /// ID of the session marked current.
    pub current_session_id: SessionId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use lumen_core::Value;

    use super::*;

    fn session() -> Session {
        Session {
            id: SessionId::from("s1"),
            name: "Default Session".into(),
            history: vec!["1 + 1".into()],
            variables: BTreeMap::from([("x".to_owned(), Value::Number(1.0))]),
            created_at: "2026-01-01T00:00:00Z".into(),
            last_active: "2026-01-01T00:00:01Z".into(),
        }
    }

    #[test]
    fn summary_counts_and_current_flag() {
        let s = session();
        let summary = SessionSummary::from_session(&s, &SessionId::from("s1"));
        assert_eq!(summary.command_count, 1);
        assert_eq!(summary.variable_count, 1);
        assert!(summary.is_current);

        let other = SessionSummary::from_session(&s, &SessionId::from("s2"));
        assert!(!other.is_current);
    }

    #[test]
    fn success_response_omits_error_fields() {
        let response = CommandResponse {
            command: "2 + 3".into(),
            result: Some(Rendered::Text("5".into())),
            error: None,
            error_kind: None,
            timestamp: "2026-01-01T00:00:00Z".into(),
            session_id: SessionId::from("s1"),
            mode: "trusted".into(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["result"], "5");
        assert!(json.get("error").is_none());
        assert!(json.get("error_kind").is_none());
    }
}
