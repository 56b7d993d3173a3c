//! Sandbox-only pre-evaluation veto.
//!
//! Beyond the deny-list filter applied to every command, sandbox commands
//! are refused outright when they reach for host facilities the sandbox
//! whitelist will never resolve: filesystem and IO namespaces, runtime
//! introspection namespaces, and code loading. Rejecting the shape up front
//! gives a sandbox-specific error instead of a generic undefined reference.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

#[allow(clippy::unwrap_used)]
fn restricted_patterns() -> Vec<Regex> {
    vec![
        // Filesystem / IO namespaces
        Regex::new(r"File\.").unwrap(),
        Regex::new(r"Dir\.").unwrap(),
        Regex::new(r"IO\.").unwrap(),
        // Runtime introspection namespaces
        Regex::new(r"Object\.").unwrap(),
        Regex::new(r"Class\.").unwrap(),
        Regex::new(r"Module\.").unwrap(),
        Regex::new(r"Kernel\.").unwrap(),
        // Code loading and dynamic evaluation
        Regex::new(r"(?i)require\s*\(").unwrap(),
        Regex::new(r"(?i)load\s*\(").unwrap(),
        Regex::new(r"(?i)eval\s*\(").unwrap(),
        Regex::new(r"(?i)instance_eval").unwrap(),
        Regex::new(r"(?i)class_eval").unwrap(),
        Regex::new(r"(?i)module_eval").unwrap(),
    ]
}

fn table() -> &'static [Regex] {
    static TABLE: OnceLock<Vec<Regex>> = OnceLock::new();
    TABLE.get_or_init(restricted_patterns)
}

/// Whether a sandbox command touches a restricted namespace or shape.
#[must_use]
pub fn is_restricted(command: &str) -> bool {
    for pattern in table() {
        if pattern.is_match(command) {
            debug!(pattern = pattern.as_str(), "sandbox command restricted");
            return true;
        }
    }
    false
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
