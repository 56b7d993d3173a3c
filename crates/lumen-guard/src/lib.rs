//! # lumen-guard
//!
//! Security Filter for the Lumen console: a stateless, ordered deny list
//! applied to raw commands before any evaluation.
//!
//! Two policies exist. [`SecurityPolicy::Standard`] is used by the trusted
//! console; [`SecurityPolicy::SandboxStrict`] is a strict superset used by
//! the sandbox console. Patterns are case-insensitive and unanchored, so the
//! filter is inherently best-effort: a legitimate identifier that happens to
//! contain a blocked word is denied too, and novel dangerous constructs not
//! matching a listed shape pass. The filter is a fast pre-filter, never the
//! sole safety boundary; the evaluation contexts resolve capabilities
//! through an explicit allow-list of their own.

#![deny(unsafe_code)]

pub mod patterns;
pub mod policy;

pub use policy::{SecurityPolicy, is_blocked};
