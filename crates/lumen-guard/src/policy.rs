//! Policy selection and the `is_blocked` verdict.

use tracing::debug;

use crate::patterns;

/// Which deny list applies to a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecurityPolicy {
    /// Standard deny list (trusted console).
    Standard,
    /// Standard deny list plus sandbox additions (sandbox console).
    SandboxStrict,
}

/// Return `true` when `command` matches any pattern of `policy`.
///
/// Pure and total: identical input and policy always produce the identical
/// verdict. Evaluation is ordered; the first matching pattern
/// short-circuits.
#[must_use]
pub fn is_blocked(command: &str, policy: SecurityPolicy) -> bool {
    if let Some(pattern) = first_match(command, policy) {
        debug!(%policy, pattern, "command blocked by security filter");
        return true;
    }
    false
}

/// The source of the first matching pattern, if any.
#[must_use]
pub fn first_match(command: &str, policy: SecurityPolicy) -> Option<&'static str> {
    let standard = patterns::standard()
        .iter()
        .find(|p| p.is_match(command))
        .map(|p| p.as_str());
    match (standard, policy) {
        (Some(hit), _) => Some(hit),
        (None, SecurityPolicy::Standard) => None,
        (None, SecurityPolicy::SandboxStrict) => patterns::sandbox_additions()
            .iter()
            .find(|p| p.is_match(command))
            .map(|p| p.as_str()),
    }
}

impl std::fmt::Display for SecurityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::SandboxStrict => f.write_str("sandbox_strict"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
