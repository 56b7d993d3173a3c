//! SQLite implementation of the evaluator's data-access seam.
//!
//! Borrows the already-locked connection for the duration of one command,
//! so trusted evaluation and the sandbox rollback wrapper share the exact
//! same code path; only the transaction discipline around it differs.

use std::collections::BTreeMap;

use rusqlite::Connection;

use lumen_core::{DomainRecord, Value};
use lumen_eval::{EvalError, EvalResult, RecordBackend};
use lumen_store::{ModelRegistry, RecordRepository, StoreError};

/// Record backend over one borrowed connection.
pub struct SqliteBackend<'a> {
    conn: &'a Connection,
    registry: &'a ModelRegistry,
}

impl<'a> SqliteBackend<'a> {
    /// Wrap a connection and the registered model names.
    #[must_use]
    pub fn new(conn: &'a Connection, registry: &'a ModelRegistry) -> Self {
        Self { conn, registry }
    }

    fn check(&self, model: &str) -> Result<(), EvalError> {
        if self.registry.contains(model) {
            Ok(())
        } else {
            Err(EvalError::undefined(model))
        }
    }
}

fn store_err(err: StoreError) -> EvalError {
    EvalError::evaluation(err.to_string())
}

fn to_map(attrs: &[(String, Value)]) -> BTreeMap<String, Value> {
    attrs.iter().cloned().collect()
}

impl RecordBackend for SqliteBackend<'_> {
    fn is_model(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    fn model_names(&self) -> Vec<String> {
        self.registry.names()
    }

    fn count(&self, model: &str) -> EvalResult<i64> {
        self.check(model)?;
        RecordRepository::count(self.conn, model).map_err(store_err)
    }

    fn all(&self, model: &str) -> EvalResult<Vec<DomainRecord>> {
        self.check(model)?;
        RecordRepository::all(self.conn, model).map_err(store_err)
    }

    fn find(&self, model: &str, id: i64) -> EvalResult<Option<DomainRecord>> {
        self.check(model)?;
        RecordRepository::find(self.conn, model, id).map_err(store_err)
    }

    fn first(&self, model: &str) -> EvalResult<Option<DomainRecord>> {
        self.check(model)?;
        let all = RecordRepository::all(self.conn, model).map_err(store_err)?;
        Ok(all.into_iter().next())
    }

    fn last(&self, model: &str) -> EvalResult<Option<DomainRecord>> {
        self.check(model)?;
        let mut tail = RecordRepository::last(self.conn, model, 1).map_err(store_err)?;
        Ok(tail.pop())
    }

    fn create(&self, model: &str, attrs: &[(String, Value)]) -> EvalResult<DomainRecord> {
        self.check(model)?;
        RecordRepository::create(self.conn, model, &to_map(attrs)).map_err(store_err)
    }

    fn find_where(
        &self,
        model: &str,
        attrs: &[(String, Value)],
        limit: Option<usize>,
    ) -> EvalResult<Vec<DomainRecord>> {
        self.check(model)?;
        RecordRepository::find_where(self.conn, model, &to_map(attrs), limit).map_err(store_err)
    }

    fn update(&self, model: &str, id: i64, attrs: &[(String, Value)]) -> EvalResult<DomainRecord> {
        self.check(model)?;
        RecordRepository::update(self.conn, model, id, &to_map(attrs))
            .map_err(store_err)?
            .ok_or_else(|| EvalError::evaluation(format!("Couldn't find {model} with id {id}")))
    }

    fn destroy(&self, model: &str, id: i64) -> EvalResult<bool> {
        self.check(model)?;
        RecordRepository::delete(self.conn, model, id).map_err(store_err)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
