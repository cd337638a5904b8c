//! Core types used throughout the project.

use std::collections::HashMap;

use serde::{
    Deserialize,
    Serialize,
};

/// Named placeholder values (`%name%` → value).
pub type Params = HashMap<String, String>;

/// One form of a translation entry.
///
/// Flat entries hold `Text` forms; grouped entries hold `Group` forms, one per related term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Form {
    /// A single string, e.g. `"%count% cars"`
    Text(String),
    /// A row of strings sharing one count, e.g. `["1 apple", "%count% apples"]`
    Group(Vec<String>),
}

/// Canonical translation entry: the ordered forms of one message.
pub type Entry = Vec<Form>;

/// Returns true if any form of the entry is a group.
#[must_use]
pub fn is_grouped(entry: &[Form]) -> bool {
    entry.iter().any(|form| matches!(form, Form::Group(_)))
}

/// The second argument of `translate`: a plural count or a parameter mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountOrParams {
    /// Explicit plural count; also exposed as the `%count%` placeholder
    Count(u64),
    /// Placeholder values used in place of a count
    Params(Params),
}

impl From<u64> for CountOrParams {
    fn from(count: u64) -> Self {
        Self::Count(count)
    }
}

impl From<Params> for CountOrParams {
    fn from(params: Params) -> Self {
        Self::Params(params)
    }
}

/// A resolved message. Mirrors the entry shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Translation {
    /// Result of a flat entry
    Text(String),
    /// Result of a grouped entry, one string per group
    List(Vec<String>),
}

impl Translation {
    /// Returns the text if this is a flat translation.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::List(_) => None,
        }
    }

    /// Returns the items if this is a grouped translation.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::List(items) => Some(items),
        }
    }

    /// Applies `f` to every string of the translation.
    #[must_use]
    pub fn map<F>(self, mut f: F) -> Self
    where
        F: FnMut(String) -> String,
    {
        match self {
            Self::Text(text) => Self::Text(f(text)),
            Self::List(items) => Self::List(items.into_iter().map(f).collect()),
        }
    }
}

impl From<&str> for Translation {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<&str>> for Translation {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_string).collect())
    }
}
