//! In-memory [`RecordBackend`] for tests.
//!
//! Rows live in a `RefCell`, so a shared reference is enough for writes,
//! matching how the evaluator borrows its backend. Not for production use.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use lumen_core::{DomainRecord, Value};

use crate::backend::RecordBackend;
use crate::errors::{EvalError, EvalResult};

/// Fake store holding rows per model name.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    rows: RefCell<BTreeMap<String, Vec<DomainRecord>>>,
    next_id: Cell<i64>,
}

impl MemoryBackend {
    /// Backend with the given model names registered and no rows.
    #[must_use]
    pub fn new(models: &[&str]) -> Self {
        let rows = models
            .iter()
            .map(|name| ((*name).to_owned(), Vec::new()))
            .collect();
        Self {
            rows: RefCell::new(rows),
            next_id: Cell::new(0),
        }
    }

    /// Insert a row directly, bypassing the evaluator.
    #[allow(clippy::unwrap_used)]
    pub fn seed(&self, model: &str, attrs: &[(&str, Value)]) -> DomainRecord {
        let attrs: Vec<(String, Value)> = attrs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect();
        self.create(model, &attrs).unwrap()
    }

    fn with_model<T>(
        &self,
        model: &str,
        f: impl FnOnce(&mut Vec<DomainRecord>) -> T,
    ) -> EvalResult<T> {
        let mut rows = self.rows.borrow_mut();
        let rows = rows
            .get_mut(model)
            .ok_or_else(|| EvalError::evaluation(format!("unknown model {model}")))?;
        Ok(f(rows))
    }
}

impl RecordBackend for MemoryBackend {
    fn is_model(&self, name: &str) -> bool {
        self.rows.borrow().contains_key(name)
    }

    fn model_names(&self) -> Vec<String> {
        self.rows.borrow().keys().cloned().collect()
    }

    fn count(&self, model: &str) -> EvalResult<i64> {
        self.with_model(model, |rows| rows.len() as i64)
    }

    fn all(&self, model: &str) -> EvalResult<Vec<DomainRecord>> {
        self.with_model(model, |rows| rows.clone())
    }

    fn find(&self, model: &str, id: i64) -> EvalResult<Option<DomainRecord>> {
        self.with_model(model, |rows| {
            rows.iter().find(|row| row.id == id).cloned()
        })
    }

    fn first(&self, model: &str) -> EvalResult<Option<DomainRecord>> {
        self.with_model(model, |rows| rows.first().cloned())
    }

    fn last(&self, model: &str) -> EvalResult<Option<DomainRecord>> {
        self.with_model(model, |rows| rows.last().cloned())
    }

    fn create(&self, model: &str, attrs: &[(String, Value)]) -> EvalResult<DomainRecord> {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let record = DomainRecord {
            model: model.to_owned(),
            id,
            attributes: attrs.iter().cloned().collect(),
        };
        self.with_model(model, |rows| {
            rows.push(record.clone());
            record
        })
    }

    fn find_where(
        &self,
        model: &str,
        attrs: &[(String, Value)],
        limit: Option<usize>,
    ) -> EvalResult<Vec<DomainRecord>> {
        self.with_model(model, |rows| {
            let matched = rows.iter().filter(|row| {
                attrs
                    .iter()
                    .all(|(k, v)| row.attributes.get(k) == Some(v))
            });
            match limit {
                Some(n) => matched.take(n).cloned().collect(),
                None => matched.cloned().collect(),
            }
        })
    }

    fn update(&self, model: &str, id: i64, attrs: &[(String, Value)]) -> EvalResult<DomainRecord> {
        self.with_model(model, |rows| {
            let row = rows
                .iter_mut()
                .find(|row| row.id == id)
                .ok_or_else(|| {
                    EvalError::evaluation(format!("Couldn't find {model} with id {id}"))
                })?;
            for (k, v) in attrs {
                row.attributes.insert(k.clone(), v.clone());
            }
            Ok(row.clone())
        })?
    }

    fn destroy(&self, model: &str, id: i64) -> EvalResult<bool> {
        self.with_model(model, |rows| {
            let before = rows.len();
            rows.retain(|row| row.id != id);
            rows.len() < before
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_rows_are_queryable() {
        let backend = MemoryBackend::new(&["Post"]);
        let row = backend.seed("Post", &[("title", Value::Text("a".into()))]);
        assert_eq!(backend.count("Post").unwrap(), 1);
        assert_eq!(backend.find("Post", row.id).unwrap(), Some(row));
        assert!(backend.is_model("Post"));
        assert!(!backend.is_model("Missing"));
    }

    #[test]
    fn where_filters_and_limits() {
        let backend = MemoryBackend::new(&["Post"]);
        for i in 0..3 {
            backend.seed(
                "Post",
                &[("bucket", Value::Number(f64::from(i % 2)))],
            );
        }
        let attrs = vec![("bucket".to_owned(), Value::Number(0.0))];
        assert_eq!(backend.find_where("Post", &attrs, None).unwrap().len(), 2);
        assert_eq!(
            backend.find_where("Post", &attrs, Some(1)).unwrap().len(),
            1
        );
    }

    #[test]
    fn update_and_destroy() {
        let backend = MemoryBackend::new(&["Post"]);
        let row = backend.seed("Post", &[("views", Value::Number(1.0))]);
        let updated = backend
            .update("Post", row.id, &[("views".to_owned(), Value::Number(2.0))])
            .unwrap();
        assert_eq!(updated.attributes.get("views"), Some(&Value::Number(2.0)));
        assert!(backend.destroy("Post", row.id).unwrap());
        assert!(!backend.destroy("Post", row.id).unwrap());
    }
}
