//! Cache storage backends.

use std::collections::HashMap;
use std::fmt;
use std::path::{
    Path,
    PathBuf,
};

use super::CacheRecord;
use crate::config::CacheSettings;
use crate::error::{
    StorageError,
    TranslateError,
};

/// File name of the persisted snapshot inside the cache directory
pub const SNAPSHOT_FILE: &str = "__translator.json";

/// Persists cache records between translator instances.
///
/// Implementors provide the load/save/invalidate capability set the cache layer relies on.
pub trait CacheStorage: fmt::Debug {
    /// Loads a persisted record, `None` if absent.
    fn load(&self, key: &str) -> Result<Option<CacheRecord>, StorageError>;

    /// Persists a record under `key`.
    fn save(&mut self, key: &str, record: &CacheRecord) -> Result<(), StorageError>;

    /// Discards every persisted record.
    fn invalidate(&mut self) -> Result<(), StorageError>;

    /// Checks that the backend can be used, before any record goes through it.
    ///
    /// # Errors
    /// A description of why the backend is unusable.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Keeps records in memory only.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: HashMap<String, CacheRecord>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<CacheRecord>, StorageError> {
        Ok(self.records.get(key).cloned())
    }

    fn save(&mut self, key: &str, record: &CacheRecord) -> Result<(), StorageError> {
        self.records.insert(key.to_string(), record.clone());
        Ok(())
    }

    fn invalidate(&mut self) -> Result<(), StorageError> {
        self.records.clear();
        Ok(())
    }
}

/// Persists all records in one JSON snapshot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.directory.join(SNAPSHOT_FILE)
    }

    fn read_snapshot(&self) -> Result<HashMap<String, CacheRecord>, StorageError> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl CacheStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<CacheRecord>, StorageError> {
        Ok(self.read_snapshot()?.remove(key))
    }

    fn save(&mut self, key: &str, record: &CacheRecord) -> Result<(), StorageError> {
        let mut snapshot = self.read_snapshot().unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable cache snapshot: {e}");
            HashMap::new()
        });
        snapshot.insert(key.to_string(), record.clone());

        std::fs::create_dir_all(&self.directory)?;
        std::fs::write(self.snapshot_path(), serde_json::to_string(&snapshot)?)?;
        Ok(())
    }

    fn invalidate(&mut self) -> Result<(), StorageError> {
        let path = self.snapshot_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn check(&self) -> Result<(), String> {
        if self.directory.as_os_str().is_empty() {
            return Err("file storage needs a directory".to_string());
        }
        if self.directory.exists() && !self.directory.is_dir() {
            return Err(format!("'{}' is not a directory", self.directory.display()));
        }
        Ok(())
    }
}

/// Builds the storage backend described by the settings.
///
/// `none` yields no backend.
///
/// # Errors
/// `InvalidStorage` for an unknown storage kind or an unusable backend.
pub fn storage_from_settings(
    settings: &CacheSettings,
) -> Result<Option<Box<dyn CacheStorage>>, TranslateError> {
    let storage: Box<dyn CacheStorage> = match settings.storage.as_str() {
        "none" => return Ok(None),
        "memory" => Box::new(MemoryStorage::new()),
        "file" => {
            let Some(path) = &settings.path else {
                return Err(TranslateError::InvalidStorage(
                    "file storage needs a `path`".to_string(),
                ));
            };
            Box::new(FileStorage::new(path))
        }
        other => {
            return Err(TranslateError::InvalidStorage(format!(
                "unknown storage kind '{other}' (expected \"none\", \"memory\" or \"file\")"
            )));
        }
    };

    storage.check().map_err(TranslateError::InvalidStorage)?;
    Ok(Some(storage))
}
