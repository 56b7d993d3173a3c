//! Default helper registry: host-application conveniences available to the
//! trusted console.

use std::collections::BTreeMap;

use lumen_core::Value;
use lumen_eval::{CallArgs, EvalError, EvalResult, HelperRegistry, RecordBackend};

/// Text returned by `safe_reload` / `reload!`.
pub const RELOAD_DISABLED: &str =
    "Application reload is not supported in web console for safety reasons";

/// Static facts about the host application surfaced by helpers.
#[derive(Clone, Debug, Default)]
pub struct AppIntrospection {
    /// Route descriptions, one per line.
    pub routes: Vec<String>,
    /// Environment name this instance runs in.
    pub environment: String,
    /// Host application version string.
    pub version: String,
}

/// Helper registry backed by [`AppIntrospection`] and the record backend.
#[derive(Clone, Debug, Default)]
pub struct AppHelpers {
    introspection: AppIntrospection,
}

impl AppHelpers {
    /// Build the registry.
    #[must_use]
    pub fn new(introspection: AppIntrospection) -> Self {
        Self { introspection }
    }

    fn routes(&self) -> Value {
        Value::Sequence(
            self.introspection
                .routes
                .iter()
                .map(|r| Value::Text(r.clone()))
                .collect(),
        )
    }

    fn env_info(&self) -> Value {
        Value::Mapping(BTreeMap::from([
            (
                "environment".to_owned(),
                Value::Text(self.introspection.environment.clone()),
            ),
            (
                "version".to_owned(),
                Value::Text(self.introspection.version.clone()),
            ),
        ]))
    }

    #[allow(clippy::cast_precision_loss)]
    fn app_config(&self) -> Value {
        Value::Mapping(BTreeMap::from([
            (
                "environment".to_owned(),
                Value::Text(self.introspection.environment.clone()),
            ),
            (
                "version".to_owned(),
                Value::Text(self.introspection.version.clone()),
            ),
            (
                "routes".to_owned(),
                Value::Number(self.introspection.routes.len() as f64),
            ),
        ]))
    }
}

fn models(backend: &dyn RecordBackend) -> Value {
    Value::Sequence(
        backend
            .model_names()
            .into_iter()
            .map(Value::Text)
            .collect(),
    )
}

fn model_arg<'v>(helper: &str, value: &'v Value, backend: &dyn RecordBackend) -> EvalResult<&'v str> {
    match value {
        Value::Opaque(name) if backend.is_model(name) => Ok(name),
        other => Err(EvalError::evaluation(format!(
            "`{helper}` expects a model type, got {}",
            other.type_name()
        ))),
    }
}

#[allow(clippy::cast_precision_loss)]
fn model_info(args: &CallArgs, backend: &dyn RecordBackend) -> EvalResult {
    let positional = args.expect_positional("model_info", 1)?;
    let model = model_arg("model_info", &positional[0], backend)?;
    Ok(Value::Mapping(BTreeMap::from([
        ("model".to_owned(), Value::Text(model.to_owned())),
        ("count".to_owned(), Value::Number(backend.count(model)? as f64)),
    ])))
}

#[allow(clippy::cast_precision_loss)]
fn db_info(backend: &dyn RecordBackend) -> EvalResult {
    let names = backend.model_names();
    let mut total = 0i64;
    for name in &names {
        total += backend.count(name)?;
    }
    Ok(Value::Mapping(BTreeMap::from([
        ("adapter".to_owned(), Value::Text("sqlite".to_owned())),
        ("models".to_owned(), Value::Number(names.len() as f64)),
        ("records".to_owned(), Value::Number(total as f64)),
    ])))
}

fn find_by(args: &CallArgs, backend: &dyn RecordBackend) -> EvalResult {
    if args.positional.len() != 1 || args.named.is_empty() {
        return Err(EvalError::evaluation(
            "wrong number of arguments for `find_by`",
        ));
    }
    let model = model_arg("find_by", &args.positional[0], backend)?;
    let hits = backend.find_where(model, &args.named, Some(1))?;
    Ok(hits.into_iter().next().map_or(Value::Nil, Value::Record))
}

fn last_records(args: &CallArgs, backend: &dyn RecordBackend) -> EvalResult {
    let positional = args.expect_positional("last_records", 2)?;
    let model = model_arg("last_records", &positional[0], backend)?;
    let n = match &positional[1] {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 => *n as usize,
        other => {
            return Err(EvalError::evaluation(format!(
                "`last_records` expects a count, got {}",
                other.type_name()
            )));
        }
    };
    let mut records = backend.all(model)?;
    let keep = records.len().saturating_sub(n);
    let _ = records.drain(..keep);
    Ok(Value::RecordSet(records))
}

impl HelperRegistry for AppHelpers {
    fn call(
        &self,
        name: &str,
        args: &CallArgs,
        backend: &dyn RecordBackend,
    ) -> Option<EvalResult> {
        let result = match name {
            "routes" => args
                .expect_positional("routes", 0)
                .map(|_| self.routes()),
            "models" => args.expect_positional("models", 0).map(|_| models(backend)),
            "model_info" => model_info(args, backend),
            "db_info" => args
                .expect_positional("db_info", 0)
                .and_then(|_| db_info(backend)),
            "env_info" => args.expect_positional("env_info", 0).map(|_| self.env_info()),
            "app_config" => args
                .expect_positional("app_config", 0)
                .map(|_| self.app_config()),
            "find_by" => find_by(args, backend),
            "last_records" => last_records(args, backend),
            "safe_reload" | "reload!" => args
                .expect_positional(name, 0)
                .map(|_| Value::Text(RELOAD_DISABLED.to_owned())),
            _ => return None,
        };
        Some(result)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
