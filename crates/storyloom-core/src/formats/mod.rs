//! # Formats
//!
//! Pure data transformations in and out of the engine: the canonical
//! JSON document codec and the one-way Markdown report. File I/O
//! lives in the app layer.
//!
//! Both the document decoder and the batch ingestor read loosely
//! shaped JSON; the field helpers here implement the shared recovery
//! rule: every field read yields a validated value or a documented
//! default, never an error.

pub mod document;
pub mod report;

use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Read a string field; missing or wrong-typed values become `""`.
pub(crate) fn str_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Read a string field with an explicit fallback for missing or
/// wrong-typed values.
pub(crate) fn str_field_or(obj: &Map<String, Value>, key: &str, default: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Read a tag array; non-array values become the empty set and
/// non-string entries are skipped. Duplicates collapse.
pub(crate) fn tags_field(obj: &Map<String, Value>, key: &str) -> BTreeSet<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
