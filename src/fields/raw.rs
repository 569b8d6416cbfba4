// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Loosely-typed readers for the raw field snapshot.
//!
//! Stored values are whatever the forms wrote: strings, numbers, booleans or
//! nulls, sometimes for the same field.  The readers here normalize them.

use serde_json::{Map, Value};

/// A raw snapshot of a project's persisted fields.
pub type RawFields = Map<String, Value>;

/// Returns the trimmed string value of a field, or `None` if the field is
/// missing, not a string, or blank.
pub(crate) fn text<'a>(fields: &'a RawFields, key: &str) -> Option<&'a str> {
    match fields.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim()),
        _ => None,
    }
}

/// Returns the numeric value of a field.
///
/// Strings are read up to the first character that can't be part of a
/// number, so `"32A"` reads as `32`.  Non-finite values read as `None`.
pub(crate) fn number(fields: &RawFields, key: &str) -> Option<f64> {
    let value = match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

/// Returns the truthiness of a field, or `None` if it is missing or null.
pub(crate) fn flag(fields: &RawFields, key: &str) -> Option<bool> {
    match fields.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|n| n != 0.0)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "" | "false" | "0" | "no" => Some(false),
            _ => Some(true),
        },
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => Some(true),
    }
}

/// Returns the utility name stored on the nested `site` object.
pub(crate) fn site_utility(fields: &RawFields) -> Option<&str> {
    fields
        .get("site")?
        .get("utility")?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}
