//! # lumen-core
//!
//! Foundation types for the Lumen operator console.
//!
//! This crate provides the shared vocabulary that all other Lumen crates
//! depend on:
//!
//! - **Branded IDs**: [`ids::SessionId`], [`ids::StoreToken`] as newtypes
//! - **Values**: [`value::Value`] tagged union for everything an evaluation
//!   can produce, plus [`value::DomainRecord`] references into the host
//!   application's persistent store
//! - **Errors**: [`errors::ErrorKind`] taxonomy with stable wire codes
//! - **Formatting**: [`format::format_value`] renders evaluated values into
//!   bounded, inspectable text
//! - **Text**: UTF-8-safe truncation helpers in [`text`]
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other lumen crates.

#![deny(unsafe_code)]

pub mod errors;
pub mod format;
pub mod ids;
pub mod text;
pub mod value;

pub use errors::ErrorKind;
pub use format::{FormatLimits, Rendered, format_single_item, format_value};
pub use ids::{SessionId, StoreToken};
pub use value::{DomainRecord, Value};
