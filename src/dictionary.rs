//! Per-category dictionaries: normalization and loading.

mod loader;
mod normalizer;

use indexmap::IndexMap;
use serde::{
    Deserialize,
    Serialize,
};

pub use loader::{
    LoadedDictionary,
    VERSION_MARKER,
    dictionary_path,
    load_dictionary,
    parse_dictionary,
};
pub use normalizer::{
    is_comment,
    normalize,
};

use crate::types::Entry;

/// Normalized translations of one category, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    /// Message name → entry
    entries: IndexMap<String, Entry>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a message by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Inserts an entry; an existing entry of the same name is replaced in place.
    pub fn insert(&mut self, name: impl Into<String>, entry: Entry) {
        self.entries.insert(name.into(), entry);
    }

    /// Returns true if a message of that name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, entry)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}

impl FromIterator<(String, Entry)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (String, Entry)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}
