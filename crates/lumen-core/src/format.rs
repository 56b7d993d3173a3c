//! Result Formatter: bounded, deterministic rendering of evaluated values.
//!
//! `format_value` is total and pure with respect to the value given. Large
//! collections are capped and annotated with an overflow marker instead of
//! flooding the response:
//!
//! - sequences: first 10 elements + `"... (<N> more items)"`
//! - mappings: first 10 keys as `"key => value"` + `"... (<N> more keys)"`
//! - record sets: first 5 reference tags + `"... (<N> more records)"`
//! - item text: clipped to 100 characters with a trailing `"..."`

use serde::{Deserialize, Serialize};

use crate::text::clip_with_ellipsis;
use crate::value::{DomainRecord, Value, format_number};

/// Caps applied while rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatLimits {
    /// Maximum sequence elements rendered before the overflow marker.
    pub max_sequence_items: usize,
    /// Maximum mapping keys rendered before the overflow marker.
    pub max_mapping_keys: usize,
    /// Maximum record-set entries rendered before the overflow marker.
    pub max_record_preview: usize,
    /// Character cap for a single rendered item.
    pub max_item_chars: usize,
}

impl Default for FormatLimits {
    fn default() -> Self {
        Self {
            max_sequence_items: 10,
            max_mapping_keys: 10,
            max_record_preview: 5,
            max_item_chars: 100,
        }
    }
}

/// A rendered result: either one block of text or a list of lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rendered {
    /// Single text block.
    Text(String),
    /// One line per element / key / record.
    Lines(Vec<String>),
}

impl Rendered {
    /// Flatten to one string (lines joined by newlines).
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Lines(lines) => lines.join("\n"),
        }
    }
}

/// Render an evaluated value into its bounded response form.
#[must_use]
pub fn format_value(value: &Value, limits: &FormatLimits) -> Rendered {
    match value {
        Value::Nil => Rendered::Text("nil".to_owned()),
        Value::Bool(b) => Rendered::Text(b.to_string()),
        Value::Number(n) => Rendered::Text(format_number(*n)),
        // Text passes through unchanged and unquoted. Pre-formatted
        // multi-line diagnostics (lines of the `name = value` shape, as
        // produced by the `vars` helper) rely on this.
        Value::Text(s) => Rendered::Text(s.clone()),
        Value::Sequence(items) => Rendered::Lines(render_sequence(items, limits)),
        Value::Mapping(map) => {
            let mut lines: Vec<String> = map
                .iter()
                .take(limits.max_mapping_keys)
                .map(|(k, v)| format!("{k} => {}", format_single_item(v, limits)))
                .collect();
            if map.len() > limits.max_mapping_keys {
                let hidden = map.len() - limits.max_mapping_keys;
                lines.push(format!("... => ({hidden} more keys)"));
            }
            Rendered::Lines(lines)
        }
        Value::Record(record) => Rendered::Text(record.full_tag()),
        Value::RecordSet(records) => Rendered::Lines(render_record_set(records, limits)),
        Value::Opaque(s) => Rendered::Text(s.clone()),
    }
}

fn render_sequence(items: &[Value], limits: &FormatLimits) -> Vec<String> {
    let mut lines: Vec<String> = items
        .iter()
        .take(limits.max_sequence_items)
        .map(|item| format_single_item(item, limits))
        .collect();
    if items.len() > limits.max_sequence_items {
        let hidden = items.len() - limits.max_sequence_items;
        lines.push(format!("... ({hidden} more items)"));
    }
    lines
}

fn render_record_set(records: &[DomainRecord], limits: &FormatLimits) -> Vec<String> {
    let mut lines: Vec<String> = records
        .iter()
        .take(limits.max_record_preview)
        .map(DomainRecord::reference_tag)
        .collect();
    if records.len() > limits.max_record_preview {
        let hidden = records.len() - limits.max_record_preview;
        lines.push(format!("... ({hidden} more records)"));
    }
    lines
}

/// Render one element of a collection.
///
/// Records collapse to their compact reference tag, long text is clipped,
/// everything else falls back to the generic literal representation.
#[must_use]
pub fn format_single_item(value: &Value, limits: &FormatLimits) -> String {
    match value {
        Value::Record(record) => record.reference_tag(),
        Value::Text(s) => clip_with_ellipsis(s, limits.max_item_chars),
        other => other.inspect(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn limits() -> FormatLimits {
        FormatLimits::default()
    }

    #[allow(clippy::cast_precision_loss)]
    fn number_seq(n: usize) -> Value {
        Value::Sequence((0..n).map(|i| Value::Number(i as f64)).collect())
    }

    fn record(id: i64) -> DomainRecord {
        DomainRecord {
            model: "Post".into(),
            id,
            attributes: BTreeMap::from([("title".to_owned(), Value::Text("t".into()))]),
        }
    }

    #[test]
    fn scalars_render_as_text() {
        assert_eq!(format_value(&Value::Nil, &limits()), Rendered::Text("nil".into()));
        assert_eq!(
            format_value(&Value::Bool(true), &limits()),
            Rendered::Text("true".into())
        );
        assert_eq!(
            format_value(&Value::Number(5.0), &limits()),
            Rendered::Text("5".into())
        );
    }

    #[test]
    fn text_passes_through_unquoted() {
        let v = Value::Text("plain string".into());
        assert_eq!(format_value(&v, &limits()), Rendered::Text("plain string".into()));
    }

    #[test]
    fn preformatted_diagnostics_pass_through_unchanged() {
        let block = "x = 1\ny = \"two\"";
        let v = Value::Text(block.into());
        assert_eq!(format_value(&v, &limits()), Rendered::Text(block.into()));
    }

    #[test]
    fn sequence_of_ten_has_no_marker() {
        let Rendered::Lines(lines) = format_value(&number_seq(10), &limits()) else {
            panic!("expected lines");
        };
        assert_eq!(lines.len(), 10);
        assert!(!lines.iter().any(|l| l.starts_with("...")));
    }

    #[test]
    fn sequence_of_eleven_truncates_with_marker() {
        let Rendered::Lines(lines) = format_value(&number_seq(11), &limits()) else {
            panic!("expected lines");
        };
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[10], "... (1 more items)");
    }

    #[test]
    fn mapping_caps_at_ten_keys() {
        let map: BTreeMap<String, Value> = (0..12)
            .map(|i| (format!("k{i:02}"), Value::Number(f64::from(i))))
            .collect();
        let Rendered::Lines(lines) = format_value(&Value::Mapping(map), &limits()) else {
            panic!("expected lines");
        };
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "k00 => 0");
        assert_eq!(lines[10], "... => (2 more keys)");
    }

    #[test]
    fn record_renders_full_tag() {
        let v = Value::Record(record(1));
        assert_eq!(
            format_value(&v, &limits()),
            Rendered::Text("#<Post id: 1, title: \"t\">".into())
        );
    }

    #[test]
    fn record_set_over_five_is_sampled() {
        let v = Value::RecordSet((1..=8).map(record).collect());
        let Rendered::Lines(lines) = format_value(&v, &limits()) else {
            panic!("expected lines");
        };
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "#<Post id: 1>");
        assert_eq!(lines[5], "... (3 more records)");
    }

    #[test]
    fn record_set_of_five_renders_all() {
        let v = Value::RecordSet((1..=5).map(record).collect());
        let Rendered::Lines(lines) = format_value(&v, &limits()) else {
            panic!("expected lines");
        };
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn long_item_text_is_clipped() {
        let long = "x".repeat(150);
        let v = Value::Sequence(vec![Value::Text(long.clone())]);
        let Rendered::Lines(lines) = format_value(&v, &limits()) else {
            panic!("expected lines");
        };
        assert_eq!(lines[0].chars().count(), 100);
        assert!(lines[0].ends_with("..."));
        // Top-level text is never clipped.
        assert_eq!(format_value(&Value::Text(long.clone()), &limits()), Rendered::Text(long));
    }

    #[test]
    fn items_inside_sequences_use_inspect() {
        let v = Value::Sequence(vec![Value::Text("ab".into()), Value::Nil]);
        let Rendered::Lines(lines) = format_value(&v, &limits()) else {
            panic!("expected lines");
        };
        // Short text items pass through unquoted, like the single-item rule.
        assert_eq!(lines, vec!["ab".to_owned(), "nil".to_owned()]);
    }
}
