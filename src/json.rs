//! Lenient accessors over raw backend JSON
//!
//! Backend payloads are not trusted to be well-formed. Every accessor falls
//! back to an empty value instead of failing.

use serde_json::Value;

/// String field; numbers and booleans are stringified, anything else is empty
pub(crate) fn string(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Non-empty string field
pub(crate) fn opt_string(value: &Value, key: &str) -> Option<String> {
    Some(string(value, key)).filter(|s| !s.trim().is_empty())
}

/// List of non-empty strings; a bare string counts as a one-element list
pub(crate) fn string_list(value: &Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Array field as a slice, empty when missing or not an array
pub(crate) fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Unsigned integer field, accepting numeric strings
pub(crate) fn uint(value: &Value, key: &str) -> Option<u64> {
    match value.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Object at `data`, the envelope every backend response is wrapped in
pub(crate) fn data(value: &Value) -> &Value {
    value.get("data").unwrap_or(&Value::Null)
}

/// Join a CDN base and a relative path with exactly one slash
pub fn cdn_url(base: &str, relative: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}
