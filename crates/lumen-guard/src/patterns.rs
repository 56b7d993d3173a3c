//! Compiled deny-list pattern tables.
//!
//! The standard table blocks process control, dynamic evaluation, module
//! surgery, and direct file-management shapes. The sandbox additions block
//! file-management and process-control command shapes on top of that.
//! Tables are compiled once and cached.

use std::sync::OnceLock;

use regex::Regex;

/// Patterns applied under every policy.
#[allow(clippy::unwrap_used)]
fn standard_patterns() -> Vec<Regex> {
    vec![
        // Process / shell escape
        Regex::new(r"(?i)system\s*\(").unwrap(),
        Regex::new(r"(?i)exec\s*\(").unwrap(),
        Regex::new(r"`.*`").unwrap(),
        Regex::new(r"%x\{").unwrap(),
        // Direct file management
        Regex::new(r"(?i)File\.delete").unwrap(),
        Regex::new(r"(?i)File\.unlink").unwrap(),
        Regex::new(r"(?i)FileUtils\.rm").unwrap(),
        Regex::new(r"(?i)Dir\.rmdir").unwrap(),
        // Process control
        Regex::new(r"(?i)exit").unwrap(),
        Regex::new(r"(?i)quit").unwrap(),
        Regex::new(r"(?i)fork").unwrap(),
        Regex::new(r"(?i)spawn").unwrap(),
        // Dynamic evaluation
        Regex::new(r"(?i)eval\s*\(").unwrap(),
        Regex::new(r"(?i)instance_eval").unwrap(),
        Regex::new(r"(?i)class_eval").unwrap(),
        Regex::new(r"(?i)module_eval").unwrap(),
        // Module surgery
        Regex::new(r"(?i)define_method").unwrap(),
        Regex::new(r"(?i)remove_method").unwrap(),
        Regex::new(r"(?i)undef_method").unwrap(),
        // Code loading
        Regex::new(r"(?i)load\s*\(").unwrap(),
        Regex::new(r"(?i)require\s*\(").unwrap(),
    ]
}

/// Additional patterns applied under the sandbox-strict policy.
#[allow(clippy::unwrap_used)]
fn sandbox_patterns() -> Vec<Regex> {
    vec![
        // File ownership / permissions
        Regex::new(r"(?i)chown\s+").unwrap(),
        Regex::new(r"(?i)chmod\s+").unwrap(),
        // File management command shapes
        Regex::new(r"(?i)rm\s+-rf").unwrap(),
        Regex::new(r"(?i)cp\s+-r").unwrap(),
        Regex::new(r"(?i)mv\s+").unwrap(),
        Regex::new(r"(?i)ln\s+").unwrap(),
        // File inspection / editing command shapes
        Regex::new(r"(?i)tail\s+").unwrap(),
        Regex::new(r"(?i)head\s+").unwrap(),
        Regex::new(r"(?i)cat\s+").unwrap(),
        Regex::new(r"(?i)less\s+").unwrap(),
        Regex::new(r"(?i)more\s+").unwrap(),
        Regex::new(r"(?i)nano\s+").unwrap(),
        Regex::new(r"(?i)vim\s+").unwrap(),
        Regex::new(r"(?i)emacs\s+").unwrap(),
        Regex::new(r"(?i)gedit\s+").unwrap(),
        Regex::new(r"(?i)open\s+").unwrap(),
        Regex::new(r"(?i)xdg-open\s+").unwrap(),
        // Process control command shapes
        Regex::new(r"(?i)kill\s+").unwrap(),
        Regex::new(r"(?i)pkill\s+").unwrap(),
        Regex::new(r"(?i)killall\s+").unwrap(),
        Regex::new(r"(?i)shutdown\s+").unwrap(),
        Regex::new(r"(?i)reboot\s+").unwrap(),
        Regex::new(r"(?i)halt\s+").unwrap(),
        Regex::new(r"(?i)poweroff\s+").unwrap(),
    ]
}

/// The standard deny list, compiled once.
pub fn standard() -> &'static [Regex] {
    static TABLE: OnceLock<Vec<Regex>> = OnceLock::new();
    TABLE.get_or_init(standard_patterns)
}

/// The sandbox-only additions, compiled once.
///
/// The sandbox-strict policy applies [`standard`] first, then these; the
/// union keeps sandbox-strict a strict superset of standard.
pub fn sandbox_additions() -> &'static [Regex] {
    static TABLE: OnceLock<Vec<Regex>> = OnceLock::new();
    TABLE.get_or_init(sandbox_patterns)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
