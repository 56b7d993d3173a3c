//! # lumen-store
//!
//! SQLite persistence for the Lumen console:
//!
//! - [`connection::Database`]: single-connection handle with pragmas applied
//! - [`sessions::SessionStore`]: session records (variables + history) keyed
//!   by a client-held store token, with the never-empty and last-session
//!   invariants
//! - [`records::RecordStore`]: the host application's domain records, plus
//!   [`records::RecordStore::run_in_rollback`] — the always-rolled-back
//!   transaction wrapper that makes sandbox evaluation safe against real
//!   data
//!
//! Stores hold one long-lived connection behind a mutex rather than a pool:
//! the rollback wrapper needs its `BEGIN`/`ROLLBACK` pair and every
//! statement in between on the same connection, and holding the lock for
//! the whole wrapped call doubles as the per-store mutual-exclusion
//! boundary for concurrent requests.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod records;
pub mod sessions;

pub use connection::Database;
pub use errors::{Result, StoreError};
pub use records::{ModelRegistry, RecordRepository, RecordStore};
pub use sessions::{Session, SessionStore};
