//! Evaluation error type.
//!
//! Nothing throws past the context boundary: every failure inside
//! evaluation is surfaced as an [`EvalError`] with a human-readable message
//! and a coarse [`ErrorKind`] label.

use lumen_core::ErrorKind;
use thiserror::Error;

/// Result alias for evaluation.
pub type EvalResult<T = lumen_core::Value> = std::result::Result<T, EvalError>;

fn undefined_suffix(sandbox: &bool) -> &'static str {
    if *sandbox { " for sandbox mode" } else { "" }
}

/// Failures produced while evaluating a command.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Unresolvable identifier or call.
    #[error("undefined local variable or method `{name}`{}", undefined_suffix(.sandbox))]
    UndefinedReference {
        /// The name that failed to resolve.
        name: String,
        /// Whether resolution failed under the sandbox whitelist.
        sandbox: bool,
    },

    /// The underlying operation itself failed (arithmetic, arity, type).
    #[error("{message}")]
    Evaluation {
        /// Human-readable description.
        message: String,
    },

    /// The command did not parse as an expression.
    #[error("{message}")]
    Parse {
        /// Human-readable description.
        message: String,
    },

    /// Sandbox-specific pre-evaluation veto.
    #[error("Command contains restricted operations for sandbox mode")]
    SandboxRestricted,
}

impl EvalError {
    /// Unresolvable name in the trusted context.
    #[must_use]
    pub fn undefined(name: impl Into<String>) -> Self {
        Self::UndefinedReference {
            name: name.into(),
            sandbox: false,
        }
    }

    /// Unresolvable name under the sandbox whitelist.
    #[must_use]
    pub fn undefined_sandbox(name: impl Into<String>) -> Self {
        Self::UndefinedReference {
            name: name.into(),
            sandbox: true,
        }
    }

    /// Failed operation with a message.
    #[must_use]
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// Malformed command text.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Coarse taxonomy label for the wire.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UndefinedReference { .. } => ErrorKind::UndefinedReference,
            Self::Evaluation { .. } | Self::Parse { .. } => ErrorKind::EvaluationError,
            Self::SandboxRestricted => ErrorKind::SandboxRestricted,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_reference_messages() {
        assert_eq!(
            EvalError::undefined("foo").to_string(),
            "undefined local variable or method `foo`"
        );
        assert_eq!(
            EvalError::undefined_sandbox("foo").to_string(),
            "undefined local variable or method `foo` for sandbox mode"
        );
    }

    #[test]
    fn kinds_map_to_the_taxonomy() {
        assert_eq!(EvalError::undefined("x").kind(), ErrorKind::UndefinedReference);
        assert_eq!(
            EvalError::evaluation("divided by 0").kind(),
            ErrorKind::EvaluationError
        );
        assert_eq!(EvalError::SandboxRestricted.kind(), ErrorKind::SandboxRestricted);
    }
}
