//! Orchestrator error type: everything a command or session operation can
//! surface, folded into the wire taxonomy.

use lumen_core::ErrorKind;
use lumen_eval::EvalError;
use lumen_store::StoreError;
use thiserror::Error;

/// Result alias for console operations.
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Failures surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Command was empty or whitespace.
    #[error("Please enter a command")]
    EmptyCommand,

    /// Security Filter vetoed the command.
    #[error("Command blocked for security reasons")]
    BlockedCommand,

    /// Environment gate refused console access.
    #[error("Console is not available in this environment")]
    AccessDenied,

    /// Evaluation failed.
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ConsoleError {
    /// Coarse taxonomy label for the wire.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyCommand => ErrorKind::EmptyCommand,
            Self::BlockedCommand => ErrorKind::BlockedCommand,
            Self::AccessDenied => ErrorKind::AccessDenied,
            Self::Eval(err) => err.kind(),
            Self::Store(StoreError::SessionNotFound { .. }) => ErrorKind::SessionNotFound,
            Self::Store(StoreError::LastSession) => ErrorKind::LastSessionClose,
            Self::Store(_) => ErrorKind::Persistence,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
