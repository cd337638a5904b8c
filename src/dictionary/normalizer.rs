//! Conversion of raw dictionary data into canonical entries.
//!
//! Rules:
//! - a scalar becomes a one-form entry (`"car"` → `["car"]`)
//! - comment strings (`# ... #`) are stripped at every level
//! - `-- name` keys declare a list: each scalar becomes its own one-element group

use serde_json::{
    Map,
    Value,
};

use super::Dictionary;
use crate::types::{
    Entry,
    Form,
};

/// Key prefix of the list syntax (`"-- list": [...]`)
const LIST_PREFIX: &str = "--";

/// Returns true if `text` is a comment marker such as `# hello #`.
#[must_use]
pub fn is_comment(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('#') && text.ends_with('#')
}

/// Normalizes raw category data.
///
/// Values that cannot hold translations (`null`, objects) are skipped, as are
/// entries that consist of a single comment.
#[must_use]
pub fn normalize(raw: &Map<String, Value>) -> Dictionary {
    let mut dictionary = Dictionary::new();

    for (key, value) in raw {
        let (name, entry) = match list_name(key) {
            Some(name) => (name, normalize_list(value)),
            None => (key.as_str(), normalize_entry(value)),
        };

        match entry {
            Some(entry) => dictionary.insert(name, entry),
            None => tracing::warn!(key = %key, "Skipping dictionary value without translations"),
        }
    }

    dictionary
}

/// Strips the list prefix; `-- list` → `list`.
fn list_name(key: &str) -> Option<&str> {
    let rest = key.strip_prefix(LIST_PREFIX)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.trim_start();
    (!name.is_empty()).then_some(name)
}

fn normalize_entry(value: &Value) -> Option<Entry> {
    match value {
        Value::Array(items) => Some(items.iter().filter_map(normalize_form).collect()),
        Value::String(text) if is_comment(text) => None,
        _ => scalar_text(value).map(|text| vec![Form::Text(text)]),
    }
}

fn normalize_list(value: &Value) -> Option<Entry> {
    let Value::Array(items) = value else {
        return normalize_entry(value);
    };

    let rows = items
        .iter()
        .filter_map(|item| match normalize_form(item)? {
            Form::Text(text) => Some(Form::Group(vec![text])),
            group @ Form::Group(_) => Some(group),
        })
        .collect();
    Some(rows)
}

/// Normalizes one element of an entry array. Comments yield `None`.
fn normalize_form(item: &Value) -> Option<Form> {
    match item {
        Value::Array(inner) => Some(Form::Group(
            inner
                .iter()
                .filter_map(scalar_text)
                .filter(|text| !is_comment(text))
                .collect(),
        )),
        _ => scalar_text(item).filter(|text| !is_comment(text)).map(Form::Text),
    }
}

/// Text of a scalar value; numbers and booleans are written as in JSON.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
