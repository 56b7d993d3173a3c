//! The evaluation context: one command evaluated against one session's
//! variables under a fixed capability set.
//!
//! Resolution order for a bare name:
//!
//! 1. assignment target → bind into the variables
//! 2. existing session variable
//! 3. builtins (`vars` everywhere, `sandbox_info` in the sandbox)
//! 4. trusted only: the helper registry
//! 5. undefined reference, labelled with the active mode
//!
//! Capitalized names resolve only through the record backend's model
//! registry. There is no further fallback anywhere.

use std::collections::BTreeMap;

use lumen_core::Value;
use lumen_core::text::clip_with_ellipsis;
use tracing::debug;

use crate::ast::{ArgList, BinaryOp, Expr};
use crate::backend::RecordBackend;
use crate::errors::{EvalError, EvalResult};
use crate::helpers::{CallArgs, HelperRegistry};
use crate::{ops, parser, restricted};

/// Banner returned by the `sandbox_info` builtin.
pub const SANDBOX_BANNER: &str = "SANDBOX MODE: Database changes will be automatically rolled back.\nYou can safely experiment with data without affecting the real database!";

/// Which capability set is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextMode {
    /// Full capability set: variables, models, helpers.
    Trusted,
    /// Whitelist: variables, models, `vars`, `sandbox_info`. The caller is
    /// responsible for wrapping evaluation in a rollback transaction.
    Sandbox,
}

/// One command's evaluation environment.
pub struct EvalContext<'a> {
    mode: ContextMode,
    vars: BTreeMap<String, Value>,
    backend: &'a dyn RecordBackend,
    helpers: Option<&'a dyn HelperRegistry>,
}

impl<'a> EvalContext<'a> {
    /// Trusted context with the full capability set.
    pub fn trusted(
        vars: BTreeMap<String, Value>,
        backend: &'a dyn RecordBackend,
        helpers: Option<&'a dyn HelperRegistry>,
    ) -> Self {
        Self {
            mode: ContextMode::Trusted,
            vars,
            backend,
            helpers,
        }
    }

    /// Sandbox context; helpers are never consulted.
    pub fn sandbox(vars: BTreeMap<String, Value>, backend: &'a dyn RecordBackend) -> Self {
        Self {
            mode: ContextMode::Sandbox,
            vars,
            backend,
            helpers: None,
        }
    }

    /// The active mode.
    #[must_use]
    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    /// Current variable bindings.
    #[must_use]
    pub fn vars(&self) -> &BTreeMap<String, Value> {
        &self.vars
    }

    /// Consume the context, yielding the (possibly updated) bindings.
    #[must_use]
    pub fn into_vars(self) -> BTreeMap<String, Value> {
        self.vars
    }

    /// Evaluate one command.
    pub fn evaluate(&mut self, command: &str) -> EvalResult {
        if self.mode == ContextMode::Sandbox && restricted::is_restricted(command) {
            return Err(EvalError::SandboxRestricted);
        }
        let expr = parser::parse(command)?;
        debug!(mode = ?self.mode, "evaluating command");
        self.eval_expr(&expr)
    }

    fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Text(s) => Ok(Value::Text(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Array(items) => {
                let values: Result<Vec<Value>, EvalError> =
                    items.iter().map(|item| self.eval_expr(item)).collect();
                Ok(Value::Sequence(values?))
            }
            Expr::Hash(pairs) => {
                let mut map = BTreeMap::new();
                for (key, value) in pairs {
                    map.insert(key.clone(), self.eval_expr(value)?);
                }
                Ok(Value::Mapping(map))
            }
            Expr::Assign { name, value } => {
                let value = self.eval_expr(value)?;
                self.vars.insert(name.clone(), value.clone());
                Ok(value)
            }
            Expr::Ident(name) => self.resolve_ident(name),
            Expr::Const(name) => self.resolve_const(name),
            Expr::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                ops::unary(*op, &operand)
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                // Short-circuit before touching the right side.
                match op {
                    BinaryOp::And if !left.is_truthy() => return Ok(left),
                    BinaryOp::Or if left.is_truthy() => return Ok(left),
                    _ => {}
                }
                let right = self.eval_expr(right)?;
                ops::binary(*op, &left, &right)
            }
            Expr::Call { name, args } => {
                let args = self.eval_args(args)?;
                self.call_function(name, &args)
            }
            Expr::MethodCall {
                receiver,
                name,
                args,
            } => {
                let receiver = self.eval_expr(receiver)?;
                let args = self.eval_args(args)?;
                self.call_method(&receiver, name, &args)
            }
        }
    }

    fn eval_args(&mut self, args: &ArgList) -> Result<CallArgs, EvalError> {
        let mut out = CallArgs::default();
        for arg in &args.positional {
            out.positional.push(self.eval_expr(arg)?);
        }
        for (key, value) in &args.named {
            let value = self.eval_expr(value)?;
            out.named.push((key.clone(), value));
        }
        Ok(out)
    }

    fn resolve_ident(&self, name: &str) -> EvalResult {
        if let Some(value) = self.vars.get(name) {
            return Ok(value.clone());
        }
        if name == "vars" {
            return Ok(self.vars_listing());
        }
        match self.mode {
            ContextMode::Sandbox => {
                if name == "sandbox_info" {
                    Ok(Value::Text(SANDBOX_BANNER.to_owned()))
                } else {
                    Err(EvalError::undefined_sandbox(name))
                }
            }
            ContextMode::Trusted => self
                .helpers
                .and_then(|registry| registry.call(name, &CallArgs::default(), self.backend))
                .unwrap_or_else(|| Err(EvalError::undefined(name))),
        }
    }

    fn resolve_const(&self, name: &str) -> EvalResult {
        if self.backend.is_model(name) {
            Ok(Value::Opaque(name.to_owned()))
        } else {
            match self.mode {
                ContextMode::Sandbox => Err(EvalError::undefined_sandbox(name)),
                ContextMode::Trusted => Err(EvalError::undefined(name)),
            }
        }
    }

    fn call_function(&self, name: &str, args: &CallArgs) -> EvalResult {
        if name == "vars" && args.is_empty() {
            return Ok(self.vars_listing());
        }
        match self.mode {
            ContextMode::Sandbox => {
                if name == "sandbox_info" && args.is_empty() {
                    Ok(Value::Text(SANDBOX_BANNER.to_owned()))
                } else {
                    Err(EvalError::undefined_sandbox(name))
                }
            }
            ContextMode::Trusted => self
                .helpers
                .and_then(|registry| registry.call(name, args, self.backend))
                .unwrap_or_else(|| Err(EvalError::undefined(name))),
        }
    }

    fn call_method(&self, receiver: &Value, name: &str, args: &CallArgs) -> EvalResult {
        match receiver {
            Value::Opaque(model) if self.backend.is_model(model) => {
                self.model_method(model, name, args)
            }
            Value::Record(record) => self.record_method(record, name, args),
            Value::RecordSet(records) if args.is_empty() => match name {
                "count" | "length" | "size" => number_from(records.len()),
                "first" => Ok(records.first().cloned().map_or(Value::Nil, Value::Record)),
                "last" => Ok(records.last().cloned().map_or(Value::Nil, Value::Record)),
                "empty?" => Ok(Value::Bool(records.is_empty())),
                _ => Err(no_method(name, receiver)),
            },
            Value::Sequence(items) if args.is_empty() => match name {
                "count" | "length" | "size" => number_from(items.len()),
                "first" => Ok(items.first().cloned().unwrap_or(Value::Nil)),
                "last" => Ok(items.last().cloned().unwrap_or(Value::Nil)),
                "empty?" => Ok(Value::Bool(items.is_empty())),
                _ => Err(no_method(name, receiver)),
            },
            Value::Mapping(map) if args.is_empty() => match name {
                "count" | "length" | "size" => number_from(map.len()),
                "keys" => Ok(Value::Sequence(
                    map.keys().map(|k| Value::Text(k.clone())).collect(),
                )),
                "empty?" => Ok(Value::Bool(map.is_empty())),
                _ => Err(no_method(name, receiver)),
            },
            Value::Text(s) if args.is_empty() => match name {
                "length" | "size" => number_from(s.chars().count()),
                "empty?" => Ok(Value::Bool(s.is_empty())),
                "upcase" => Ok(Value::Text(s.to_uppercase())),
                "downcase" => Ok(Value::Text(s.to_lowercase())),
                _ => Err(no_method(name, receiver)),
            },
            Value::Nil if args.is_empty() && name == "nil?" => Ok(Value::Bool(true)),
            _ => Err(no_method(name, receiver)),
        }
    }

    fn model_method(&self, model: &str, name: &str, args: &CallArgs) -> EvalResult {
        match name {
            "count" if args.is_empty() => number_from_i64(self.backend.count(model)?),
            "all" if args.is_empty() => Ok(Value::RecordSet(self.backend.all(model)?)),
            "first" if args.is_empty() => Ok(self
                .backend
                .first(model)?
                .map_or(Value::Nil, Value::Record)),
            "last" if args.is_empty() => {
                Ok(self.backend.last(model)?.map_or(Value::Nil, Value::Record))
            }
            "find" => {
                let positional = args.expect_positional("find", 1)?;
                let id = expect_id(&positional[0])?;
                match self.backend.find(model, id)? {
                    Some(record) => Ok(Value::Record(record)),
                    None => Err(EvalError::evaluation(format!(
                        "Couldn't find {model} with id {id}"
                    ))),
                }
            }
            "create" if args.positional.is_empty() => {
                let record = self.backend.create(model, &args.named)?;
                Ok(Value::Record(record))
            }
            "where" if args.positional.is_empty() => {
                let records = self.backend.find_where(model, &args.named, None)?;
                Ok(Value::RecordSet(records))
            }
            _ => Err(EvalError::evaluation(format!(
                "undefined method `{name}` for {model}"
            ))),
        }
    }

    fn record_method(
        &self,
        record: &lumen_core::DomainRecord,
        name: &str,
        args: &CallArgs,
    ) -> EvalResult {
        if args.is_empty() {
            match name {
                "id" => return number_from_i64(record.id),
                "attributes" => return Ok(Value::Mapping(record.attributes.clone())),
                "destroy" => {
                    let deleted = self.backend.destroy(&record.model, record.id)?;
                    return Ok(Value::Bool(deleted));
                }
                _ => {
                    if let Some(value) = record.attributes.get(name) {
                        return Ok(value.clone());
                    }
                }
            }
        }
        if name == "update" && args.positional.is_empty() && !args.named.is_empty() {
            let updated = self.backend.update(&record.model, record.id, &args.named)?;
            return Ok(Value::Record(updated));
        }
        Err(EvalError::evaluation(format!(
            "undefined method `{name}` for {}",
            record.reference_tag()
        )))
    }

    fn vars_listing(&self) -> Value {
        if self.vars.is_empty() {
            return Value::Text("No variables defined".to_owned());
        }
        let lines: Vec<String> = self
            .vars
            .iter()
            .map(|(name, value)| {
                format!("{name} = {}", clip_with_ellipsis(&value.inspect(), 100))
            })
            .collect();
        Value::Text(lines.join("\n"))
    }
}

#[allow(clippy::cast_precision_loss)]
fn number_from(n: usize) -> EvalResult {
    Ok(Value::Number(n as f64))
}

#[allow(clippy::cast_precision_loss)]
fn number_from_i64(n: i64) -> EvalResult {
    Ok(Value::Number(n as f64))
}

fn expect_id(value: &Value) -> Result<i64, EvalError> {
    match value {
        #[allow(clippy::cast_possible_truncation)]
        Value::Number(n) if n.fract() == 0.0 => Ok(*n as i64),
        other => Err(EvalError::evaluation(format!(
            "expected a record ID, got {}",
            other.type_name()
        ))),
    }
}

fn no_method(name: &str, receiver: &Value) -> EvalError {
    EvalError::evaluation(format!(
        "undefined method `{name}` for {}",
        receiver.type_name()
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
