//! Shared helpers for unit tests.
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use tempfile::TempDir;

use crate::types::Params;

/// Root of the fixture dictionaries (`tests/data`).
pub(crate) fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

/// Copies the fixture dictionaries into a fresh temporary directory.
///
/// Tests that edit dictionary files work on the copy.
pub(crate) fn copy_fixtures() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    copy_dir(&fixtures_dir(), temp_dir.path());
    temp_dir
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}

/// Builds a parameter mapping from pairs.
pub(crate) fn params(pairs: &[(&str, &str)]) -> Params {
    pairs.iter().map(|(name, value)| ((*name).to_string(), (*value).to_string())).collect()
}
