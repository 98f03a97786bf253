//! Structural validation of raw configuration documents.
//!
//! The pass walks the untyped JSON tree and collects every violation with
//! its field path before the typed [`ConfigDocument`] is constructed, so a
//! caller sees all problems at once rather than serde's first error.
//! Validation is pure: no I/O, no dependency on store state.

use std::collections::HashSet;
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::document::ConfigDocument;

/// One violated field: where it is, what was expected, what was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Wire-name path into the document, e.g. `targets[0].target-url`.
    /// Empty for top-level problems.
    pub path: String,
    pub expected: String,
    pub found: String,
}

impl Violation {
    fn new(path: impl Into<String>, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "expected {}, found {}", self.expected, self.found)
        } else {
            write!(
                f,
                "{}: expected {}, found {}",
                self.path, self.expected, self.found
            )
        }
    }
}

/// Schema validation failure carrying every violated field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema validation failed ({}): {}", count(.violations), summarize(.violations))]
pub struct SchemaError {
    pub violations: Vec<Violation>,
}

impl SchemaError {
    /// Single-violation error for problems outside the field table
    /// (unparseable input, top-level shape).
    pub fn malformed(found: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation::new("", "configuration document", found)],
        }
    }
}

fn count(violations: &[Violation]) -> String {
    if violations.len() == 1 {
        "1 violation".to_string()
    } else {
        format!("{} violations", violations.len())
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate a raw JSON tree and construct the typed document.
pub fn validate_document(raw: &Value) -> Result<ConfigDocument, SchemaError> {
    let Some(obj) = raw.as_object() else {
        return Err(SchemaError::malformed(json_type(raw)));
    };

    let mut out = Vec::new();

    if let Some(name) = require_str(obj, "name", "", &mut out) {
        check_document_name(name, &mut out);
    }
    optional_str(obj, "assistant-config-name", "", &mut out);
    optional_str(obj, "description", "", &mut out);
    require_str(obj, "app-name", "", &mut out);
    optional_str(obj, "app-config-url", "", &mut out);

    if let Some(targets) = require_array(obj, "targets", "", &mut out) {
        if targets.is_empty() {
            out.push(Violation::new("targets", "non-empty array", "empty array"));
        }
        for (i, target) in targets.iter().enumerate() {
            check_target(target, &format!("targets[{i}]"), &mut out);
        }
    }

    if let Some(conversions) = optional_array(obj, "file-conversions", "", &mut out) {
        let mut seen = HashSet::new();
        for (i, conversion) in conversions.iter().enumerate() {
            check_file_conversion(conversion, &format!("file-conversions[{i}]"), &mut seen, &mut out);
        }
    }

    if let Some(enrichments) = optional_array(obj, "enrichments", "", &mut out) {
        let mut seen = HashSet::new();
        for (i, enrichment) in enrichments.iter().enumerate() {
            check_enrichment(enrichment, &format!("enrichments[{i}]"), &mut seen, &mut out);
        }
    }

    if !out.is_empty() {
        return Err(SchemaError { violations: out });
    }

    // Zero violations guarantee the typed construction succeeds; a serde
    // failure here means the checks above have a gap.
    serde_json::from_value(raw.clone()).map_err(|e| SchemaError::malformed(e.to_string()))
}

/// The document name doubles as a filename stem, so it must be
/// filesystem-safe.
fn check_document_name(name: &str, out: &mut Vec<Violation>) {
    if name.is_empty() {
        out.push(Violation::new("name", "non-empty string", "empty string"));
        return;
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        out.push(Violation::new(
            "name",
            "filesystem-safe name",
            format!("{name:?}"),
        ));
    }
}

fn check_target(value: &Value, path: &str, out: &mut Vec<Violation>) {
    let Some(obj) = as_object(value, path, out) else {
        return;
    };

    require_str(obj, "repo-pid", path, out);
    require_str(obj, "repo-name", path, out);
    require_str(obj, "repo-display-name", path, out);
    require_str(obj, "bridge-module-class", path, out);
    optional_str(obj, "base-url", path, out);
    if let Some(url) = require_str(obj, "target-url", path, out) {
        if url.is_empty() {
            out.push(Violation::new(
                field_path(path, "target-url"),
                "non-empty string",
                "empty string",
            ));
        }
    }
    optional_str(obj, "target-url-params", path, out);
    optional_str(obj, "username", path, out);
    optional_str(obj, "password", path, out);
    optional_str(obj, "initial-release-version", path, out);

    if let Some(metadata) = present(obj, "metadata") {
        check_metadata(metadata, &field_path(path, "metadata"), out);
    }
    if let Some(input) = present(obj, "input") {
        check_input(input, &field_path(path, "input"), out);
    }
}

fn check_metadata(value: &Value, path: &str, out: &mut Vec<Violation>) {
    let Some(obj) = as_object(value, path, out) else {
        return;
    };

    if let Some(spec) = optional_array(obj, "specification", path, out) {
        for (i, item) in spec.iter().enumerate() {
            if !item.is_string() {
                out.push(Violation::new(
                    format!("{}[{i}]", field_path(path, "specification")),
                    "string",
                    json_type(item),
                ));
            }
        }
    }

    if let Some(items) = require_array(obj, "transformed-metadata", path, out) {
        let list_path = field_path(path, "transformed-metadata");
        if items.is_empty() {
            out.push(Violation::new(list_path.clone(), "non-empty array", "empty array"));
        }
        for (i, item) in items.iter().enumerate() {
            check_transformed_metadata(item, &format!("{list_path}[{i}]"), out);
        }
    }
}

fn check_transformed_metadata(value: &Value, path: &str, out: &mut Vec<Violation>) {
    let Some(obj) = as_object(value, path, out) else {
        return;
    };
    require_str(obj, "name", path, out);
    optional_str(obj, "transformer-url", path, out);
    optional_str(obj, "target-dir", path, out);
    optional_bool(obj, "restricted", path, out);
}

fn check_input(value: &Value, path: &str, out: &mut Vec<Violation>) {
    let Some(obj) = as_object(value, path, out) else {
        return;
    };
    require_str(obj, "from-target-name", path, out);
}

fn check_file_conversion(
    value: &Value,
    path: &str,
    seen_ids: &mut HashSet<String>,
    out: &mut Vec<Violation>,
) {
    let Some(obj) = as_object(value, path, out) else {
        return;
    };
    if let Some(id) = require_str(obj, "id", path, out) {
        check_unique_id(id, path, seen_ids, out);
    }
    require_str(obj, "origin-type", path, out);
    require_str(obj, "target-type", path, out);
    require_str(obj, "conversion-url", path, out);
    check_notifications(obj, path, out);
}

fn check_enrichment(
    value: &Value,
    path: &str,
    seen_ids: &mut HashSet<String>,
    out: &mut Vec<Violation>,
) {
    let Some(obj) = as_object(value, path, out) else {
        return;
    };
    if let Some(id) = require_str(obj, "id", path, out) {
        check_unique_id(id, path, seen_ids, out);
    }
    require_str(obj, "name", path, out);
    require_str(obj, "service-url", path, out);
    require_str(obj, "result-url", path, out);
    optional_str(obj, "permission", path, out);
    check_notifications(obj, path, out);
}

fn check_unique_id(id: &str, path: &str, seen: &mut HashSet<String>, out: &mut Vec<Violation>) {
    if !seen.insert(id.to_string()) {
        out.push(Violation::new(
            field_path(path, "id"),
            "id unique within the document",
            format!("duplicate {id:?}"),
        ));
    }
}

fn check_notifications(obj: &Map<String, Value>, path: &str, out: &mut Vec<Violation>) {
    if let Some(items) = optional_array(obj, "notification", path, out) {
        let list_path = field_path(path, "notification");
        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{list_path}[{i}]");
            let Some(obj) = as_object(item, &item_path, out) else {
                continue;
            };
            require_str(obj, "type", &item_path, out);
            require_str(obj, "conf", &item_path, out);
        }
    }
}

// ── Walker helpers ──────────────────────────────────────────────────────

fn field_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field is considered present only when set and non-null.
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

fn as_object<'a>(
    value: &'a Value,
    path: &str,
    out: &mut Vec<Violation>,
) -> Option<&'a Map<String, Value>> {
    match value.as_object() {
        Some(obj) => Some(obj),
        None => {
            out.push(Violation::new(path, "object", json_type(value)));
            None
        }
    }
}

fn require_str<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    prefix: &str,
    out: &mut Vec<Violation>,
) -> Option<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            out.push(Violation::new(field_path(prefix, key), "string", json_type(other)));
            None
        }
        None => {
            out.push(Violation::new(field_path(prefix, key), "string", "missing"));
            None
        }
    }
}

fn optional_str<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    prefix: &str,
    out: &mut Vec<Violation>,
) -> Option<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s),
        None | Some(Value::Null) => None,
        Some(other) => {
            out.push(Violation::new(
                field_path(prefix, key),
                "string or null",
                json_type(other),
            ));
            None
        }
    }
}

fn optional_bool(obj: &Map<String, Value>, key: &str, prefix: &str, out: &mut Vec<Violation>) {
    match obj.get(key) {
        None | Some(Value::Null) | Some(Value::Bool(_)) => {}
        Some(other) => {
            out.push(Violation::new(
                field_path(prefix, key),
                "boolean or null",
                json_type(other),
            ));
        }
    }
}

fn require_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    prefix: &str,
    out: &mut Vec<Violation>,
) -> Option<&'a Vec<Value>> {
    match obj.get(key) {
        Some(Value::Array(items)) => Some(items),
        Some(other) => {
            out.push(Violation::new(field_path(prefix, key), "array", json_type(other)));
            None
        }
        None => {
            out.push(Violation::new(field_path(prefix, key), "array", "missing"));
            None
        }
    }
}

fn optional_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    prefix: &str,
    out: &mut Vec<Violation>,
) -> Option<&'a Vec<Value>> {
    match obj.get(key) {
        Some(Value::Array(items)) => Some(items),
        None | Some(Value::Null) => None,
        Some(other) => {
            out.push(Violation::new(
                field_path(prefix, key),
                "array or null",
                json_type(other),
            ));
            None
        }
    }
}
