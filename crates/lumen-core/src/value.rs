//! The tagged value union produced by command evaluation.
//!
//! Values are late-bound: the evaluator works over one closed enum rather
//! than reflecting over live objects. [`DomainRecord`] and
//! [`Value::RecordSet`] are references into the host application's
//! persistent store — read and written through the data-access layer, never
//! owned by the evaluator.
//!
//! `Value` is serde-tagged so a session's variable mapping can round-trip
//! through its persisted row without losing variant information.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of evaluating (part of) a command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Absence of a value.
    Nil,
    /// Boolean.
    Bool(bool),
    /// Decimal number. Integral values display without a fractional part.
    Number(f64),
    /// Plain text.
    Text(String),
    /// Ordered sequence of values.
    Sequence(Vec<Value>),
    /// String-keyed mapping.
    Mapping(BTreeMap<String, Value>),
    /// One persisted domain record.
    Record(DomainRecord),
    /// Many persisted domain records.
    RecordSet(Vec<DomainRecord>),
    /// Anything without a structured rendering (e.g. a model-type reference).
    Opaque(String),
}

/// A reference to one row in the host application's persistent store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Capitalized model name (e.g. `Post`).
    pub model: String,
    /// Row ID. Inside a rollback transaction this identity is not durable.
    pub id: i64,
    /// Attribute name → value pairs.
    pub attributes: BTreeMap<String, Value>,
}

impl DomainRecord {
    /// Compact reference tag: `#<Post id: 1>`.
    #[must_use]
    pub fn reference_tag(&self) -> String {
        format!("#<{} id: {}>", self.model, self.id)
    }

    /// Full tag with all attribute pairs: `#<Post id: 1, title: "hi">`.
    #[must_use]
    pub fn full_tag(&self) -> String {
        let attrs: Vec<String> = self
            .attributes
            .iter()
            .map(|(k, v)| format!("{k}: {}", v.inspect()))
            .collect();
        if attrs.is_empty() {
            format!("#<{} id: {}>", self.model, self.id)
        } else {
            format!("#<{} id: {}, {}>", self.model, self.id, attrs.join(", "))
        }
    }
}

impl Value {
    /// Human-readable variant name for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
            Self::Record(_) => "record",
            Self::RecordSet(_) => "record set",
            Self::Opaque(_) => "opaque",
        }
    }

    /// Truthiness: only `Nil` and `Bool(false)` are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil | Self::Bool(false))
    }

    /// Generic literal representation (strings quoted, collections bracketed).
    #[must_use]
    pub fn inspect(&self) -> String {
        match self {
            Self::Nil => "nil".to_owned(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => format!("{s:?}"),
            Self::Sequence(items) => {
                let inner: Vec<String> = items.iter().map(Value::inspect).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::Mapping(map) => {
                let inner: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{k:?} => {}", v.inspect()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
            Self::Record(record) => record.reference_tag(),
            Self::RecordSet(records) => {
                let inner: Vec<String> =
                    records.iter().map(DomainRecord::reference_tag).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::Opaque(s) => s.clone(),
        }
    }

    /// Convert to plain (untagged) JSON for storage in a record row.
    ///
    /// Record and opaque values degrade to their literal representation;
    /// record attribute payloads are expected to be scalar-ish.
    #[must_use]
    pub fn to_plain_json(&self) -> serde_json::Value {
        match self {
            Self::Nil => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_plain_json).collect())
            }
            Self::Mapping(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_plain_json()))
                    .collect(),
            ),
            Self::Record(_) | Self::RecordSet(_) | Self::Opaque(_) => {
                serde_json::Value::String(self.inspect())
            }
        }
    }

    /// Convert plain (untagged) JSON back into a value.
    #[must_use]
    pub fn from_plain_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Nil,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.iter().map(Self::from_plain_json).collect())
            }
            serde_json::Value::Object(map) => Self::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_plain_json(v)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            other => f.write_str(&other.inspect()),
        }
    }
}

/// Render a number, omitting the fractional part for integral values.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(n: f64) -> String {
    // i64 can represent every integral f64 below 2^53 exactly.
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
