//! Command Orchestrator: the full path from raw command to wire response.
//!
//! Control flow for one command: environment gate → empty check → Security
//! Filter → (sandbox only) restricted check → history append → evaluation →
//! variable write-back → formatting. Gate failures, blocked commands, and
//! restricted commands are reported before any state mutation; failures past
//! that point still leave the attempted command in history.
//!
//! All collaborators are explicit handles; nothing lives in a global.

use lumen_core::{SessionId, StoreToken, format_value};
use lumen_eval::{ContextMode, EvalContext, EvalError, restricted};
use lumen_guard::{SecurityPolicy, is_blocked};
use lumen_settings::ConsoleSettings;
use lumen_store::{Database, ModelRegistry, RecordStore, Session, SessionStore};
use tracing::{debug, warn};

use crate::backend::SqliteBackend;
use crate::errors::{ConsoleError, Result};
use crate::helpers::AppHelpers;
use crate::types::{CommandResponse, SessionDetail, SessionListing, SessionSummary};

/// Get current UTC timestamp as ISO 8601 string.
fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn mode_label(mode: ContextMode) -> &'static str {
    match mode {
        ContextMode::Trusted => "trusted",
        ContextMode::Sandbox => "sandbox",
    }
}

/// One user context's console: session store, record store, helpers,
/// settings.
#[derive(Clone, Debug)]
pub struct ConsoleService {
    sessions: SessionStore,
    records: RecordStore,
    helpers: AppHelpers,
    settings: ConsoleSettings,
}

impl ConsoleService {
    /// Assemble a console over one database handle.
    #[must_use]
    pub fn new(
        db: Database,
        token: StoreToken,
        registry: ModelRegistry,
        helpers: AppHelpers,
        settings: ConsoleSettings,
    ) -> Self {
        let sessions = SessionStore::new(db.clone(), token, settings.history_limit);
        let records = RecordStore::new(db, registry);
        Self {
            sessions,
            records,
            helpers,
            settings,
        }
    }

    /// Run a command in the trusted context.
    pub fn execute(&self, command: &str) -> Result<CommandResponse> {
        self.run(command, ContextMode::Trusted)
    }

    /// Run a command in the sandbox context; every record mutation it makes
    /// is rolled back.
    pub fn sandbox_execute(&self, command: &str) -> Result<CommandResponse> {
        self.run(command, ContextMode::Sandbox)
    }

    fn run(&self, command: &str, mode: ContextMode) -> Result<CommandResponse> {
        if !self.settings.console_allowed() {
            warn!(environment = %self.settings.environment, "console gate refused access");
            return Err(ConsoleError::AccessDenied);
        }
        let session = self.sessions.current()?;
        let trimmed = command.trim();

        if trimmed.is_empty() {
            return Ok(failure(trimmed, &session.id, mode, &ConsoleError::EmptyCommand));
        }
        let policy = match mode {
            ContextMode::Trusted => SecurityPolicy::Standard,
            ContextMode::Sandbox => SecurityPolicy::SandboxStrict,
        };
        if is_blocked(trimmed, policy) {
            warn!(%policy, "command blocked");
            return Ok(failure(trimmed, &session.id, mode, &ConsoleError::BlockedCommand));
        }
        if mode == ContextMode::Sandbox && restricted::is_restricted(trimmed) {
            return Ok(failure(
                trimmed,
                &session.id,
                mode,
                &ConsoleError::Eval(EvalError::SandboxRestricted),
            ));
        }

        self.sessions.record_command(&session.id, trimmed)?;

        let registry = self.records.registry().clone();
        let (outcome, vars) = match mode {
            ContextMode::Trusted => self.records.with_conn(|conn| {
                let backend = SqliteBackend::new(conn, &registry);
                let mut ctx =
                    EvalContext::trusted(session.variables.clone(), &backend, Some(&self.helpers));
                let outcome = ctx.evaluate(trimmed);
                (outcome, ctx.into_vars())
            }),
            ContextMode::Sandbox => self.records.run_in_rollback(|conn| {
                let backend = SqliteBackend::new(conn, &registry);
                let mut ctx = EvalContext::sandbox(session.variables.clone(), &backend);
                let outcome = ctx.evaluate(trimmed);
                (outcome, ctx.into_vars())
            })?,
        };
        // Bindings made before a failure are kept, so partial assignments
        // survive the way they do in an interactive console.
        self.sessions.write_variables(&session.id, &vars)?;

        match outcome {
            Ok(value) => {
                debug!(session_id = %session.id, mode = mode_label(mode), "command evaluated");
                Ok(CommandResponse {
                    command: trimmed.to_owned(),
                    result: Some(format_value(&value, &self.settings.format)),
                    error: None,
                    error_kind: None,
                    timestamp: now_iso(),
                    session_id: session.id,
                    mode: mode_label(mode).to_owned(),
                })
            }
            Err(err) => Ok(failure(
                trimmed,
                &session.id,
                mode,
                &ConsoleError::Eval(err),
            )),
        }
    }

    /// Detail view of the current session, synthesizing the default session
    /// on first access.
    pub fn current_session(&self) -> Result<SessionDetail> {
        let session = self.sessions.current()?;
        Ok(SessionDetail::from_session(&session))
    }

    /// Create a session (default name when none is given) and make it
    /// current.
    pub fn new_session(&self, name: Option<String>) -> Result<SessionSummary> {
        let session = self.sessions.create(name)?;
        Ok(summary_of_current(&session))
    }

    /// Make `id` the current session.
    pub fn select_session(&self, id: &SessionId) -> Result<SessionSummary> {
        let session = self.sessions.select(id)?;
        Ok(summary_of_current(&session))
    }

    /// Close a session and return the store's remaining listing.
    pub fn close_session(&self, id: &SessionId) -> Result<SessionListing> {
        let _ = self.sessions.close(id)?;
        self.session_list()
    }

    /// All sessions plus the current marker.
    pub fn session_list(&self) -> Result<SessionListing> {
        let (sessions, current) = self.sessions.list()?;
        let summaries = sessions
            .iter()
            .map(|session| SessionSummary::from_session(session, &current))
            .collect();
        Ok(SessionListing {
            sessions: summaries,
            current_session_id: current,
        })
    }

    /// Empty a session's history and variables, keeping its identity.
    pub fn clear_history(&self, id: &SessionId) -> Result<SessionDetail> {
        self.sessions.clear(id)?;
        let session = self.sessions.get(id)?;
        Ok(SessionDetail::from_session(&session))
    }
}

fn summary_of_current(session: &Session) -> SessionSummary {
    SessionSummary::from_session(session, &session.id)
}

fn failure(
    command: &str,
    session_id: &SessionId,
    mode: ContextMode,
    err: &ConsoleError,
) -> CommandResponse {
    debug!(kind = err.kind().code(), "command failed");
    CommandResponse {
        command: command.to_owned(),
        result: None,
        error: Some(err.to_string()),
        error_kind: Some(err.kind().code().to_owned()),
        timestamp: now_iso(),
        session_id: session_id.clone(),
        mode: mode_label(mode).to_owned(),
    }
}
