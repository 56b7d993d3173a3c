//! Data-access seam between the evaluator and the host application's store.
//!
//! The evaluator never holds a connection of its own. Callers hand it a
//! [`RecordBackend`] scoped to whatever transaction discipline the current
//! mode requires — trusted calls run against the live store, sandbox calls
//! against a transaction the caller rolls back.

use lumen_core::{DomainRecord, Value};

use crate::errors::EvalResult;

/// Record operations the evaluator may perform.
pub trait RecordBackend {
    /// Whether `name` is a registered model type.
    fn is_model(&self, name: &str) -> bool;

    /// Registered model names, sorted.
    fn model_names(&self) -> Vec<String>;

    /// Number of rows for a model.
    fn count(&self, model: &str) -> EvalResult<i64>;

    /// All rows for a model, oldest first.
    fn all(&self, model: &str) -> EvalResult<Vec<DomainRecord>>;

    /// One row by ID.
    fn find(&self, model: &str, id: i64) -> EvalResult<Option<DomainRecord>>;

    /// Oldest row.
    fn first(&self, model: &str) -> EvalResult<Option<DomainRecord>>;

    /// Newest row.
    fn last(&self, model: &str) -> EvalResult<Option<DomainRecord>>;

    /// Insert a row with the given attributes.
    fn create(&self, model: &str, attrs: &[(String, Value)]) -> EvalResult<DomainRecord>;

    /// Rows whose attributes all match, oldest first, optionally limited.
    fn find_where(
        &self,
        model: &str,
        attrs: &[(String, Value)],
        limit: Option<usize>,
    ) -> EvalResult<Vec<DomainRecord>>;

    /// Merge attributes into an existing row and return the updated record.
    fn update(&self, model: &str, id: i64, attrs: &[(String, Value)]) -> EvalResult<DomainRecord>;

    /// Delete a row. Returns false when no such row exists.
    fn destroy(&self, model: &str, id: i64) -> EvalResult<bool>;
}
