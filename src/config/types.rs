use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::plural::PluralRules;

/// Storage kinds accepted in `cache.storage`
const STORAGE_KINDS: &[&str] = &["none", "memory", "file"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "cache.path")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid JSON in configuration: {0}")]
    SyntaxError(String),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslatorSettings {
    /// Root directory of the dictionary files.
    pub directory: PathBuf,

    /// Language of the translations.
    pub language: String,

    pub cache: CacheSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheSettings {
    /// Storage backend: `none`, `memory` or `file`.
    ///
    /// Checked when the backend is built, not by `validate`.
    pub storage: String,

    /// Cache directory, required by the `file` storage.
    pub path: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { storage: "none".to_string(), path: None }
    }
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("translations"),
            language: "en".to_string(),
            cache: CacheSettings::default(),
        }
    }
}

impl TranslatorSettings {
    /// # Errors
    /// - Dictionary directory is empty
    /// - Language has no plural rule
    /// - File cache has an empty path
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.directory.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "directory",
                "The dictionary directory cannot be empty. Example: \"translations\"",
            ));
        }

        if self.language.is_empty() {
            errors.push(ValidationError::new(
                "language",
                "The language cannot be empty. Example: \"en\"",
            ));
        } else if !PluralRules::builtin().contains(&self.language) {
            errors.push(ValidationError::new(
                "language",
                format!("No plural rule is known for language '{}'", self.language),
            ));
        }

        if self.cache.storage == "file"
            && self.cache.path.as_ref().is_some_and(|path| path.as_os_str().is_empty())
        {
            errors.push(ValidationError::new(
                "cache.path",
                "The cache path cannot be empty. Please specify a directory or remove this field",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Returns true if `cache.storage` names a known backend.
    #[must_use]
    pub fn has_known_storage(&self) -> bool {
        STORAGE_KINDS.contains(&self.cache.storage.as_str())
    }
}
