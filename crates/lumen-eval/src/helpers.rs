//! Helper seam for trusted-context named functions.
//!
//! Helpers are host-provided conveniences (`models`, `db_info`, `find_by`,
//! ...) resolved after session variables and builtins. The registry is
//! consulted only in the trusted context; the sandbox whitelist does not
//! include it.

use lumen_core::Value;

use crate::backend::RecordBackend;
use crate::errors::{EvalError, EvalResult};

/// Evaluated arguments of a helper call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallArgs {
    /// Positional arguments, in order.
    pub positional: Vec<Value>,
    /// Named (`key: value`) arguments, in order.
    pub named: Vec<(String, Value)>,
}

impl CallArgs {
    /// True when the call carries no arguments at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Exactly `n` positional arguments and nothing named.
    pub fn expect_positional(&self, name: &str, n: usize) -> EvalResult<&[Value]> {
        if self.positional.len() == n && self.named.is_empty() {
            Ok(&self.positional)
        } else {
            Err(EvalError::evaluation(format!(
                "wrong number of arguments for `{name}`"
            )))
        }
    }

    /// Named argument by key.
    #[must_use]
    pub fn named_get(&self, key: &str) -> Option<&Value> {
        self.named
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// Named functions the trusted context may call.
pub trait HelperRegistry {
    /// Invoke `name` with `args`. `None` means the registry does not know
    /// the name and resolution should fall through to undefined-reference.
    fn call(&self, name: &str, args: &CallArgs, backend: &dyn RecordBackend)
    -> Option<EvalResult>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
