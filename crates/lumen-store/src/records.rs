//! Domain-record store and the always-rollback transaction wrapper.
//!
//! Records are rows of the host application's persistent store: a
//! capitalized model name plus a JSON attribute payload. The evaluator
//! reads and writes them through this layer, never owning them.
//!
//! [`RecordStore::run_in_rollback`] is what makes sandbox mode safe: it
//! opens a transaction, runs the wrapped closure with read-your-writes
//! visibility, and rolls the transaction back on every exit path, including
//! panic unwinding. The connection lock is held for the whole call, so no
//! other request can interleave statements into the doomed transaction.

use std::collections::{BTreeMap, BTreeSet};

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, warn};

use lumen_core::{DomainRecord, Value};

use crate::connection::Database;
use crate::errors::{Result, StoreError};

/// Get current UTC timestamp as ISO 8601 string.
fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// The set of capitalized model names the host application exposes.
#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    names: BTreeSet<String>,
}

impl ModelRegistry {
    /// Build a registry from model names.
    #[must_use]
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `name` is a registered model.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// All registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }
}

/// Stateless SQL access for record rows.
pub struct RecordRepository;

impl RecordRepository {
    fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, String, String)> {
        Ok((row.get("id")?, row.get("model")?, row.get("attributes")?))
    }

    fn decode((id, model, attrs_json): (i64, String, String)) -> Result<DomainRecord> {
        let attrs: serde_json::Value = serde_json::from_str(&attrs_json)?;
        let attributes = match Value::from_plain_json(&attrs) {
            Value::Mapping(map) => map,
            _ => BTreeMap::new(),
        };
        Ok(DomainRecord {
            model,
            id,
            attributes,
        })
    }

    fn attrs_to_json(attributes: &BTreeMap<String, Value>) -> Result<String> {
        let map: serde_json::Map<String, serde_json::Value> = attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.to_plain_json()))
            .collect();
        Ok(serde_json::to_string(&serde_json::Value::Object(map))?)
    }

    /// Insert a record and return it with its assigned row ID.
    pub fn create(
        conn: &Connection,
        model: &str,
        attributes: &BTreeMap<String, Value>,
    ) -> Result<DomainRecord> {
        let now = now_iso();
        let _ = conn.execute(
            "INSERT INTO records (model, attributes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![model, Self::attrs_to_json(attributes)?, now],
        )?;
        let id = conn.last_insert_rowid();
        debug!(model, id, "record created");
        Ok(DomainRecord {
            model: model.to_owned(),
            id,
            attributes: attributes.clone(),
        })
    }

    /// Fetch one record by ID.
    pub fn find(conn: &Connection, model: &str, id: i64) -> Result<Option<DomainRecord>> {
        let row = conn
            .query_row(
                "SELECT id, model, attributes FROM records WHERE model = ?1 AND id = ?2",
                params![model, id],
                Self::record_from_row,
            )
            .optional()?;
        row.map(Self::decode).transpose()
    }

    /// All records of a model in insertion order.
    pub fn all(conn: &Connection, model: &str) -> Result<Vec<DomainRecord>> {
        let mut stmt = conn.prepare(
            "SELECT id, model, attributes FROM records WHERE model = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![model], Self::record_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(Self::decode(row?)?);
        }
        Ok(records)
    }

    /// Number of records of a model.
    pub fn count(conn: &Connection, model: &str) -> Result<i64> {
        let n = conn.query_row(
            "SELECT count(*) FROM records WHERE model = ?1",
            params![model],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// The last `n` records of a model (most recent last).
    pub fn last(conn: &Connection, model: &str, n: usize) -> Result<Vec<DomainRecord>> {
        let mut records = Self::all(conn, model)?;
        let keep = records.len().saturating_sub(n);
        let _ = records.drain(..keep);
        Ok(records)
    }

    /// Records whose attributes match every given condition, capped at
    /// `limit` when one is given.
    pub fn find_where(
        conn: &Connection,
        model: &str,
        conditions: &BTreeMap<String, Value>,
        limit: Option<usize>,
    ) -> Result<Vec<DomainRecord>> {
        let mut matches: Vec<DomainRecord> = Self::all(conn, model)?
            .into_iter()
            .filter(|record| {
                conditions
                    .iter()
                    .all(|(k, v)| record.attributes.get(k) == Some(v))
            })
            .collect();
        if let Some(cap) = limit {
            matches.truncate(cap);
        }
        Ok(matches)
    }

    /// Merge `updates` into a record's attributes. Returns the updated
    /// record, or `None` when it does not exist.
    pub fn update(
        conn: &Connection,
        model: &str,
        id: i64,
        updates: &BTreeMap<String, Value>,
    ) -> Result<Option<DomainRecord>> {
        let Some(mut record) = Self::find(conn, model, id)? else {
            return Ok(None);
        };
        record.attributes.extend(updates.clone());
        let _ = conn.execute(
            "UPDATE records SET attributes = ?3, updated_at = ?4
             WHERE model = ?1 AND id = ?2",
            params![model, id, Self::attrs_to_json(&record.attributes)?, now_iso()],
        )?;
        Ok(Some(record))
    }

    /// Delete a record. Returns whether a row existed.
    pub fn delete(conn: &Connection, model: &str, id: i64) -> Result<bool> {
        let n = conn.execute(
            "DELETE FROM records WHERE model = ?1 AND id = ?2",
            params![model, id],
        )?;
        Ok(n > 0)
    }
}

/// Rolls the open transaction back when dropped, on every exit path.
struct RollbackGuard<'a> {
    conn: &'a Connection,
}

impl Drop for RollbackGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.conn.execute_batch("ROLLBACK") {
            warn!(%err, "sandbox rollback failed");
        }
    }
}

/// Handle over the host application's persistent records.
#[derive(Clone, Debug)]
pub struct RecordStore {
    db: Database,
    registry: ModelRegistry,
}

impl RecordStore {
    /// Create a handle with the given model registry.
    #[must_use]
    pub fn new(db: Database, registry: ModelRegistry) -> Self {
        Self { db, registry }
    }

    /// The registered model names.
    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Run `f` with the locked connection, outside any transaction.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        self.db.with_conn(f)
    }

    /// Fail unless `model` is registered.
    pub fn check_model(&self, model: &str) -> Result<()> {
        if self.registry.contains(model) {
            Ok(())
        } else {
            Err(StoreError::UnknownModel {
                model: model.to_owned(),
            })
        }
    }

    /// Run `f` inside a transaction that is **unconditionally rolled back**.
    ///
    /// `f` sees a fully consistent, mutated view while it runs
    /// (read-your-writes); nothing it created, updated, or deleted is
    /// observable after this returns. The rollback happens on every exit
    /// path: normal return, error, or panic unwinding through the guard.
    pub fn run_in_rollback<T>(&self, f: impl FnOnce(&Connection) -> T) -> Result<T> {
        let conn = self.db.lock();
        conn.execute_batch("BEGIN")?;
        let guard = RollbackGuard { conn: &conn };
        let out = f(&conn);
        drop(guard);
        debug!("sandbox transaction rolled back");
        Ok(out)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    fn store() -> RecordStore {
        let db = Database::open_in_memory().unwrap();
        RecordStore::new(db, ModelRegistry::new(["Post", "User"]))
    }

    #[test]
    fn create_and_read_back() {
        let store = store();
        store.with_conn(|conn| {
            let created = RecordRepository::create(
                conn,
                "Post",
                &attrs(&[("title", Value::Text("hello".into()))]),
            )
            .unwrap();
            assert!(created.id > 0);

            let found = RecordRepository::find(conn, "Post", created.id).unwrap().unwrap();
            assert_eq!(found, created);
            assert_eq!(RecordRepository::count(conn, "Post").unwrap(), 1);
            assert_eq!(RecordRepository::count(conn, "User").unwrap(), 0);
        });
    }

    #[test]
    fn update_merges_attributes() {
        let store = store();
        store.with_conn(|conn| {
            let created = RecordRepository::create(
                conn,
                "Post",
                &attrs(&[("title", Value::Text("a".into())), ("views", Value::Number(1.0))]),
            )
            .unwrap();
            let updated = RecordRepository::update(
                conn,
                "Post",
                created.id,
                &attrs(&[("views", Value::Number(2.0))]),
            )
            .unwrap()
            .unwrap();
            assert_eq!(updated.attributes["title"], Value::Text("a".into()));
            assert_eq!(updated.attributes["views"], Value::Number(2.0));
        });
    }

    #[test]
    fn find_where_filters_on_attributes() {
        let store = store();
        store.with_conn(|conn| {
            for i in 0..4 {
                let _ = RecordRepository::create(
                    conn,
                    "Post",
                    &attrs(&[("bucket", Value::Number(f64::from(i % 2)))]),
                )
                .unwrap();
            }
            let hits = RecordRepository::find_where(
                conn,
                "Post",
                &attrs(&[("bucket", Value::Number(0.0))]),
                None,
            )
            .unwrap();
            assert_eq!(hits.len(), 2);
            let capped = RecordRepository::find_where(
                conn,
                "Post",
                &attrs(&[("bucket", Value::Number(0.0))]),
                Some(1),
            )
            .unwrap();
            assert_eq!(capped.len(), 1);
        });
    }

    #[test]
    fn last_returns_most_recent() {
        let store = store();
        store.with_conn(|conn| {
            for i in 0..5 {
                let _ = RecordRepository::create(
                    conn,
                    "Post",
                    &attrs(&[("n", Value::Number(f64::from(i)))]),
                )
                .unwrap();
            }
            let tail = RecordRepository::last(conn, "Post", 2).unwrap();
            assert_eq!(tail.len(), 2);
            assert_eq!(tail[1].attributes["n"], Value::Number(4.0));
        });
    }

    #[test]
    fn rollback_undoes_creates_updates_and_deletes() {
        let store = store();
        let keeper = store.with_conn(|conn| {
            RecordRepository::create(conn, "Post", &attrs(&[("title", Value::Text("keep".into()))]))
                .unwrap()
        });

        let inside_count = store
            .run_in_rollback(|conn| {
                let _ = RecordRepository::create(conn, "Post", &attrs(&[])).unwrap();
                let _ = RecordRepository::update(
                    conn,
                    "Post",
                    keeper.id,
                    &attrs(&[("title", Value::Text("mutated".into()))]),
                )
                .unwrap();
                // Read-your-writes inside the transaction.
                RecordRepository::count(conn, "Post").unwrap()
            })
            .unwrap();
        assert_eq!(inside_count, 2);

        store.with_conn(|conn| {
            assert_eq!(RecordRepository::count(conn, "Post").unwrap(), 1);
            let kept = RecordRepository::find(conn, "Post", keeper.id).unwrap().unwrap();
            assert_eq!(kept.attributes["title"], Value::Text("keep".into()));
        });
    }

    #[test]
    fn rollback_runs_even_when_the_closure_panics() {
        let store = store();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = store.run_in_rollback(|conn| {
                let _ = RecordRepository::create(conn, "Post", &BTreeMap::new()).unwrap();
                panic!("boom");
            });
        }));
        assert!(result.is_err());
        store.with_conn(|conn| {
            assert_eq!(RecordRepository::count(conn, "Post").unwrap(), 0);
        });
    }

    #[test]
    fn unknown_models_are_rejected() {
        let store = store();
        assert!(store.check_model("Post").is_ok());
        assert!(matches!(
            store.check_model("Widget").unwrap_err(),
            StoreError::UnknownModel { .. }
        ));
    }
}
