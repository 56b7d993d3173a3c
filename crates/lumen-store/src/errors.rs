//! Storage error type.

use thiserror::Error;

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures in the session or record stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Session-management operation targeted a missing session.
    #[error("Session not found")]
    SessionNotFound {
        /// The ID that was requested.
        id: String,
    },

    /// Refused to remove the only remaining session.
    #[error("Cannot close the last session")]
    LastSession,

    /// Record operation targeted a model the registry does not know.
    #[error("unknown model: {model}")]
    UnknownModel {
        /// The capitalized name that failed to resolve.
        model: String,
    },

    /// Underlying SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A persisted JSON column failed to parse.
    #[error("corrupt stored JSON: {0}")]
    Json(#[from] serde_json::Error),
}
