//! Error taxonomy with stable wire codes.
//!
//! Every failure the console can surface maps onto one [`ErrorKind`]. The
//! kind travels on the wire as a stable uppercase code so clients can branch
//! on it without parsing messages.

use serde::{Deserialize, Serialize};

// ── Error code constants ────────────────────────────────────────────

/// Command was empty or whitespace.
pub const EMPTY_COMMAND: &str = "EMPTY_COMMAND";
/// Security Filter vetoed the command before evaluation.
pub const BLOCKED_COMMAND: &str = "BLOCKED_COMMAND";
/// Sandbox-specific pre-evaluation veto.
pub const SANDBOX_RESTRICTED: &str = "SANDBOX_RESTRICTED";
/// Unresolvable identifier or call.
pub const UNDEFINED_REFERENCE: &str = "UNDEFINED_REFERENCE";
/// The underlying operation itself failed (arithmetic, arity, type).
pub const EVALUATION_ERROR: &str = "EVALUATION_ERROR";
/// Session does not exist in the store.
pub const SESSION_NOT_FOUND: &str = "SESSION_NOT_FOUND";
/// Attempt to close the only remaining session.
pub const LAST_SESSION_CLOSE: &str = "LAST_SESSION_CLOSE";
/// Database / storage error.
pub const PERSISTENCE: &str = "PERSISTENCE";
/// Environment gate refused console access.
pub const ACCESS_DENIED: &str = "ACCESS_DENIED";

/// Coarse classification of a console failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Command was empty or whitespace.
    EmptyCommand,
    /// Security Filter veto; the command was never evaluated.
    BlockedCommand,
    /// Sandbox-specific veto; the command was never evaluated.
    SandboxRestricted,
    /// Unresolvable identifier or call in either context.
    UndefinedReference,
    /// The underlying operation failed during evaluation.
    EvaluationError,
    /// Session-management operation targeted a missing session.
    SessionNotFound,
    /// Refused to close the sole remaining session.
    LastSessionClose,
    /// Database / storage failure.
    Persistence,
    /// Environment gate refused console access.
    AccessDenied,
}

impl ErrorKind {
    /// Stable machine-readable wire code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::EmptyCommand => EMPTY_COMMAND,
            Self::BlockedCommand => BLOCKED_COMMAND,
            Self::SandboxRestricted => SANDBOX_RESTRICTED,
            Self::UndefinedReference => UNDEFINED_REFERENCE,
            Self::EvaluationError => EVALUATION_ERROR,
            Self::SessionNotFound => SESSION_NOT_FOUND,
            Self::LastSessionClose => LAST_SESSION_CLOSE,
            Self::Persistence => PERSISTENCE,
            Self::AccessDenied => ACCESS_DENIED,
        }
    }

    /// Whether this failure is an access-denied-class response.
    ///
    /// Gate failures and command blocking deny access; every other failure
    /// is a normal structured result.
    #[must_use]
    pub fn is_access_denied(self) -> bool {
        matches!(
            self,
            Self::AccessDenied | Self::BlockedCommand | Self::SandboxRestricted
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorKind::BlockedCommand.code(), "BLOCKED_COMMAND");
        assert_eq!(ErrorKind::LastSessionClose.code(), "LAST_SESSION_CLOSE");
        assert_eq!(ErrorKind::UndefinedReference.code(), "UNDEFINED_REFERENCE");
    }

    #[test]
    fn access_denied_classification() {
        assert!(ErrorKind::AccessDenied.is_access_denied());
        assert!(ErrorKind::BlockedCommand.is_access_denied());
        assert!(ErrorKind::SandboxRestricted.is_access_denied());
        assert!(!ErrorKind::EvaluationError.is_access_denied());
        assert!(!ErrorKind::SessionNotFound.is_access_denied());
        assert!(!ErrorKind::EmptyCommand.is_access_denied());
    }
}
