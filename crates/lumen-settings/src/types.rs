//! Settings type definitions.

use lumen_core::FormatLimits;
use serde::{Deserialize, Serialize};

/// Top-level console settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsoleSettings {
    /// Name of the environment this instance runs in.
    pub environment: String,
    /// Environments allowed to expose the console at all.
    pub allowed_environments: Vec<String>,
    /// Commands kept per session history (oldest evicted first).
    pub history_limit: usize,
    /// Result-formatter caps.
    pub format: FormatLimits,
    /// Persistence settings.
    pub database: DatabaseSettings,
}

/// Persistence settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatabaseSettings {
    /// SQLite file path. `None` selects an in-memory database.
    pub path: Option<String>,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            environment: "development".to_owned(),
            allowed_environments: vec!["development".to_owned(), "test".to_owned()],
            history_limit: 50,
            format: FormatLimits::default(),
            database: DatabaseSettings::default(),
        }
    }
}

impl ConsoleSettings {
    /// Environment gate: may this instance expose the console?
    #[must_use]
    pub fn console_allowed(&self) -> bool {
        self.allowed_environments.contains(&self.environment)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_refuses_unlisted_environment() {
        let settings = ConsoleSettings {
            environment: "production".to_owned(),
            ..ConsoleSettings::default()
        };
        assert!(!settings.console_allowed());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings: ConsoleSettings =
            serde_json::from_str(r#"{"environment": "test"}"#).unwrap();
        assert_eq!(settings.environment, "test");
        assert_eq!(settings.history_limit, 50);
        assert_eq!(settings.format.max_sequence_items, 10);
    }
}
