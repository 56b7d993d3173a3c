//! # lumen-console
//!
//! Command Orchestrator for the Lumen console. Ties the other crates
//! together into one [`service::ConsoleService`]:
//!
//! - **Security Filter** (`lumen-guard`) vets raw commands per policy
//! - **Evaluation Contexts** (`lumen-eval`) run them against session
//!   variables, backed here by [`backend::SqliteBackend`] over the record
//!   store
//! - **Sandbox** commands run inside `RecordStore::run_in_rollback`, so
//!   nothing they create, update, or delete survives
//! - **Result Formatter** (`lumen-core`) bounds what goes on the wire
//! - **Session Store** (`lumen-store`) persists history and variables
//!
//! The wire shapes a transport layer serializes live in [`types`].

#![deny(unsafe_code)]

pub mod backend;
pub mod errors;
pub mod helpers;
pub mod service;
pub mod types;

pub use backend::SqliteBackend;
pub use errors::{ConsoleError, Result};
pub use helpers::{AppHelpers, AppIntrospection};
pub use service::ConsoleService;
pub use types::{CommandResponse, SessionDetail, SessionListing, SessionSummary};
