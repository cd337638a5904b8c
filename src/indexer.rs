//! Dictionary discovery.

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    GlobBuilder,
    GlobMatcher,
};
use ignore::WalkBuilder;
use thiserror::Error;

/// Extension of dictionary files
const DICTIONARY_EXTENSION: &str = ".json";

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Dictionary directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Invalid dictionary pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// A dictionary file found under the dictionary root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryFile {
    /// Directory relative to the root, segments joined by `/`
    pub path: String,
    pub category: String,
    /// Full path of the file
    pub file: PathBuf,
}

impl DictionaryFile {
    /// Key prefix addressing the messages of this dictionary (`web.pages.homepage.promo`).
    #[must_use]
    pub fn message_prefix(&self) -> String {
        if self.path.is_empty() {
            self.category.clone()
        } else {
            format!("{}.{}", self.path.replace('/', "."), self.category)
        }
    }
}

/// Finds every dictionary of `language` under `directory`, sorted by path and category.
///
/// Files ignored by `.gitignore` rules are skipped. Categories containing a dot cannot be
/// addressed by a message key and are skipped as well.
///
/// # Errors
/// - `directory` does not exist
/// - `language` produces an invalid glob
pub fn find_dictionaries(
    directory: &Path,
    language: &str,
) -> Result<Vec<DictionaryFile>, IndexerError> {
    if !directory.is_dir() {
        return Err(IndexerError::MissingDirectory(directory.to_path_buf()));
    }

    let matcher = dictionary_matcher(language)?;
    let prefix = format!("{language}.");
    let mut found = Vec::new();

    for result in WalkBuilder::new(directory)
        .hidden(false)
        .git_ignore(true)
        .git_exclude(true)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let Ok(relative_path) = entry.path().strip_prefix(directory) else {
            continue;
        };
        if !matcher.is_match(relative_path) {
            continue;
        }

        let Some(category) = relative_path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix(&prefix))
            .and_then(|name| name.strip_suffix(DICTIONARY_EXTENSION))
            .filter(|category| !category.is_empty() && !category.contains('.'))
        else {
            tracing::debug!(file = %relative_path.display(), "Skipping unaddressable dictionary");
            continue;
        };

        let path = relative_path
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default();

        found.push(DictionaryFile {
            path,
            category: category.to_string(),
            file: entry.path().to_path_buf(),
        });
    }

    found.sort_by(|a, b| (&a.path, &a.category).cmp(&(&b.path, &b.category)));
    tracing::debug!(count = found.len(), language, "Dictionaries found");
    Ok(found)
}

fn dictionary_matcher(language: &str) -> Result<GlobMatcher, IndexerError> {
    let pattern = format!("**/{}.*{DICTIONARY_EXTENSION}", globset::escape(language));
    GlobBuilder::new(&pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| IndexerError::InvalidPattern { pattern, source })
}
