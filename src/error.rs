//! Errors surfaced by the translator.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that may occur while resolving a message.
///
/// A missing translation is not an error: `translate` returns `Ok(None)` for it.
#[derive(Error, Debug)]
pub enum TranslateError {
    /// The message key has fewer than three dot-separated segments
    #[error("Malformed message key '{key}': expected at least `path.category.name`")]
    MalformedKey {
        /// The offending key, after placeholder expansion
        key: String,
    },

    /// `translate_pairs` got key and value lists of different lengths
    #[error("Cannot pair translations: {keys} keys but {values} values")]
    LengthMismatch {
        /// Number of entries in the keys list
        keys: usize,
        /// Number of entries in the values list
        values: usize,
    },

    /// `translate_pairs` got something other than a list
    #[error("Translation '{key}' is not a list")]
    TypeMismatch {
        /// Message key that did not resolve to a list
        key: String,
    },

    /// The cache storage backend cannot be used
    #[error("Invalid cache storage: {0}")]
    InvalidStorage(String),

    /// The plural rule picked a form the entry does not define
    #[error("Plural form #{index} is missing (entry has {available} forms)")]
    MissingPluralForm {
        /// Form index computed by the plural rule
        index: usize,
        /// Number of forms the entry defines
        available: usize,
    },

    /// No plural rule is registered for the language
    #[error("No plural rule for language '{0}'")]
    UnknownLanguage(String),

    /// A dictionary file exists but could not be read or parsed
    #[error("Failed to load dictionary {}: {message}", path.display())]
    Dictionary {
        /// Dictionary file path
        path: PathBuf,
        /// Reader or parser message
        message: String,
    },

    /// The `# version #` marker is not a non-negative integer
    #[error("Invalid version marker in {}: {value}", path.display())]
    InvalidVersion {
        /// Dictionary file path
        path: PathBuf,
        /// The marker value as written in the file
        value: String,
    },
}

/// Failures of a cache storage backend.
///
/// The cache layer logs these and degrades to a miss; they never reach `translate` callers.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the persisted snapshot failed
    #[error("Cache storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted snapshot is not valid JSON for a cache record
    #[error("Cache snapshot is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}
