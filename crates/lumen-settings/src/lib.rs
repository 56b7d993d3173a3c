//! # lumen-settings
//!
//! Configuration management with layered sources for the Lumen console.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`ConsoleSettings::default()`]
//! 2. **User file** — `~/.lumen/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `LUMEN_*` overrides (highest priority)
//!
//! The settings carry the environment gate (which deployment environments
//! may expose the console at all), the history cap, and the formatter
//! limits.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::{ConsoleSettings, DatabaseSettings};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
