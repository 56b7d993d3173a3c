//! # lumen-eval
//!
//! The evaluation backend of the Lumen console: a small expression language
//! evaluated against one session's variable bindings and a deliberately
//! restricted capability set.
//!
//! The console recognizes only an assignment shape (`name = expression`) at
//! the command level; everything else is one expression handed to this
//! backend. Identifier resolution follows a fixed chain:
//!
//! 1. assignment marker → bind into the session variables
//! 2. existing session variable → its value
//! 3. Trusted context: capitalized names resolving to registered data-model
//!    types, lowercase names resolving to the helper registry
//! 4. Sandbox context: a fixed whitelist — operators, literals, data-model
//!    types (reads and writes allowed, always inside the caller's rollback
//!    transaction), and the `vars` / `sandbox_info` builtins
//! 5. otherwise [`errors::EvalError::UndefinedReference`]
//!
//! There is no reflection and no catch-all dispatch: the capability set is
//! the closed list of operations this crate resolves. Collaborator seams
//! are the [`backend::RecordBackend`] trait (data access) and the
//! [`helpers::HelperRegistry`] trait (trusted-only named functions).

#![deny(unsafe_code)]

pub mod ast;
pub mod backend;
pub mod context;
pub mod errors;
pub mod helpers;
pub mod lexer;
pub mod ops;
pub mod parser;
pub mod restricted;
pub mod testing;

pub use backend::RecordBackend;
pub use context::{ContextMode, EvalContext};
pub use errors::{EvalError, EvalResult};
pub use helpers::{CallArgs, HelperRegistry};
