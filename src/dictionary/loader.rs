//! Dictionary file loading.

use std::path::{
    Path,
    PathBuf,
};

use jsonc_parser::ParseOptions;
use serde_json::{
    Map,
    Value,
};

use super::{
    Dictionary,
    normalize,
};
use crate::error::TranslateError;

/// Reserved key carrying the dictionary version.
pub const VERSION_MARKER: &str = "# version #";

/// Extension of dictionary files
const DICTIONARY_EXTENSION: &str = "json";

/// A normalized dictionary together with its version marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedDictionary {
    pub data: Dictionary,
    /// `None` when the file has no version marker
    pub version: Option<u64>,
}

/// Path of the dictionary file for a category.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use dictionary_translator::dictionary::dictionary_path;
///
/// let path = dictionary_path(Path::new("data"), "web/pages/homepage", "promo", "en");
/// assert_eq!(path, Path::new("data/web/pages/homepage/en.promo.json"));
/// ```
#[must_use]
pub fn dictionary_path(directory: &Path, path: &str, category: &str, language: &str) -> PathBuf {
    let mut file = directory.to_path_buf();
    file.extend(path.split('/').filter(|segment| !segment.is_empty()));
    file.push(format!("{language}.{category}.{DICTIONARY_EXTENSION}"));
    file
}

/// Loads and normalizes the dictionary of a category.
///
/// A missing file yields an empty dictionary without a version.
///
/// # Errors
/// Returns error if the file exists but cannot be read or parsed.
pub fn load_dictionary(
    directory: &Path,
    path: &str,
    category: &str,
    language: &str,
) -> Result<LoadedDictionary, TranslateError> {
    let file = dictionary_path(directory, path, category, language);

    if !file.exists() {
        tracing::debug!(file = %file.display(), "Dictionary not found");
        return Ok(LoadedDictionary::default());
    }

    tracing::debug!(file = %file.display(), "Loading dictionary");

    let content = std::fs::read_to_string(&file).map_err(|e| TranslateError::Dictionary {
        path: file.clone(),
        message: format!("Failed to read dictionary file: {e}"),
    })?;

    parse_dictionary(&content, &file)
}

/// Parses dictionary text: extracts the version marker and normalizes the rest.
///
/// Comments (`//`, `/* */`) are allowed in the text. `file` is only used in errors.
///
/// # Errors
/// Returns error if the text is not a JSON object or the version marker is invalid.
pub fn parse_dictionary(content: &str, file: &Path) -> Result<LoadedDictionary, TranslateError> {
    let parsed = jsonc_parser::parse_to_serde_value(content, &ParseOptions::default()).map_err(
        |e| TranslateError::Dictionary {
            path: file.to_path_buf(),
            message: format!("Failed to parse JSON: {e}"),
        },
    )?;

    let raw = match parsed {
        None => return Ok(LoadedDictionary::default()),
        Some(Value::Object(raw)) => raw,
        Some(other) => {
            return Err(TranslateError::Dictionary {
                path: file.to_path_buf(),
                message: format!("Expected a JSON object, found {}", json_type(&other)),
            });
        }
    };

    let version = raw.get(VERSION_MARKER).map(|value| parse_version(value, file)).transpose()?;
    let raw: Map<String, Value> = raw.into_iter().filter(|(key, _)| key != VERSION_MARKER).collect();

    Ok(LoadedDictionary { data: normalize(&raw), version })
}

fn parse_version(value: &Value, file: &Path) -> Result<u64, TranslateError> {
    let version = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };

    version.ok_or_else(|| TranslateError::InvalidVersion {
        path: file.to_path_buf(),
        value: value.to_string(),
    })
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
