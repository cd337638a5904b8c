//! Version-aware dictionary cache.
//!
//! # Freshness
//!
//! Records are served until [`DictionaryCache::invalidate`] is called; nothing expires on its
//! own. After an invalidation the next request re-reads the dictionary file, and the version
//! marker decides what is served:
//!
//! | cached version | file version | served data |
//! |----------------|--------------|-------------|
//! | `Some(v)`      | `Some(v)`    | previously cached data |
//! | `Some(v)`      | `Some(w)`    | freshly loaded data |
//! | any            | `None`       | freshly loaded data |
//!
//! File content edited without a version bump is therefore not picked up.
//!
//! Retired records live for one invalidation cycle. The first lookup of a category drops its
//! retired record, and the next invalidation discards those that were never looked up.

mod storage;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{
    Deserialize,
    Serialize,
};
pub use storage::{
    CacheStorage,
    FileStorage,
    MemoryStorage,
    SNAPSHOT_FILE,
    storage_from_settings,
};

use crate::dictionary::{
    Dictionary,
    LoadedDictionary,
};
use crate::error::TranslateError;

/// A cached, normalized dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Composite key (`language:path/category`)
    pub key: String,
    pub data: Dictionary,
    /// Version marker of the file the data was loaded from
    pub version: Option<u64>,
}

/// In-memory index of dictionaries, optionally persisted through a [`CacheStorage`].
#[derive(Debug, Default)]
pub struct DictionaryCache {
    /// Live records
    records: HashMap<String, CacheRecord>,
    /// Records dropped by the last invalidation and not looked up since
    retired: HashMap<String, CacheRecord>,
    storage: Option<Box<dyn CacheStorage>>,
}

impl DictionaryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage backend.
    ///
    /// # Errors
    /// `InvalidStorage` if the backend reports it cannot be used.
    pub fn configure(&mut self, storage: Box<dyn CacheStorage>) -> Result<(), TranslateError> {
        storage.check().map_err(TranslateError::InvalidStorage)?;
        tracing::debug!(?storage, "Cache storage configured");
        self.storage = Some(storage);
        Ok(())
    }

    /// Returns true if a storage backend is configured.
    #[must_use]
    pub const fn has_storage(&self) -> bool {
        self.storage.is_some()
    }

    /// Looks up a record, restoring it from storage if the index does not hold it.
    pub fn get(&mut self, key: &str) -> Option<&CacheRecord> {
        match self.records.entry(key.to_string()) {
            Entry::Occupied(entry) => Some(&*entry.into_mut()),
            Entry::Vacant(entry) => {
                let record = load_persisted(self.storage.as_deref(), key)?;
                self.retired.remove(key);
                Some(&*entry.insert(record))
            }
        }
    }

    /// Looks up a record, calling `load` on a miss and storing its result.
    ///
    /// # Errors
    /// Whatever `load` returns.
    pub fn get_or_load<F>(&mut self, key: &str, load: F) -> Result<&CacheRecord, TranslateError>
    where
        F: FnOnce() -> Result<LoadedDictionary, TranslateError>,
    {
        match self.records.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                tracing::trace!(key, "Dictionary cache hit");
                Ok(&*entry.into_mut())
            }
            Entry::Vacant(entry) => {
                if let Some(record) = load_persisted(self.storage.as_deref(), key) {
                    self.retired.remove(key);
                    return Ok(&*entry.insert(record));
                }

                tracing::debug!(key, "Dictionary cache miss");
                let loaded = load()?;
                let record = refresh(self.retired.remove(key), key, loaded);
                persist(self.storage.as_deref_mut(), &record);
                Ok(&*entry.insert(record))
            }
        }
    }

    /// Stores a freshly loaded dictionary and persists it.
    ///
    /// If the last invalidation retired a record of the same version, that record is kept.
    pub fn put(&mut self, key: &str, data: Dictionary, version: Option<u64>) -> &CacheRecord {
        let record = refresh(self.retired.remove(key), key, LoadedDictionary { data, version });
        persist(self.storage.as_deref_mut(), &record);

        match self.records.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(record);
                &*entry.into_mut()
            }
            Entry::Vacant(entry) => &*entry.insert(record),
        }
    }

    /// Loads a record straight from the storage backend, bypassing the index.
    #[must_use]
    pub fn load_persisted(&self, key: &str) -> Option<CacheRecord> {
        load_persisted(self.storage.as_deref(), key)
    }

    /// Drops every record from the index and discards the persisted snapshot.
    ///
    /// Nothing is reloaded until the next request. Records retired by an earlier invalidation
    /// and never looked up since are discarded.
    pub fn invalidate(&mut self) {
        tracing::debug!(
            records = self.records.len(),
            discarded = self.retired.len(),
            "Invalidating dictionary cache"
        );
        self.retired = self.records.drain().collect();

        if let Some(storage) = self.storage.as_deref_mut()
            && let Err(e) = storage.invalidate()
        {
            tracing::warn!("Failed to invalidate cache storage: {e}");
        }
    }

    /// Number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Picks the record to store after a load: the retired one if its version still matches.
fn refresh(retired: Option<CacheRecord>, key: &str, loaded: LoadedDictionary) -> CacheRecord {
    match retired {
        Some(previous) if previous.version.is_some() && previous.version == loaded.version => {
            tracing::debug!(
                key,
                version = ?previous.version,
                "Version unchanged, keeping cached data"
            );
            previous
        }
        _ => CacheRecord { key: key.to_string(), data: loaded.data, version: loaded.version },
    }
}

fn load_persisted<S>(storage: Option<&S>, key: &str) -> Option<CacheRecord>
where
    S: CacheStorage + ?Sized,
{
    match storage?.load(key) {
        Ok(record) => {
            if record.is_some() {
                tracing::debug!(key, "Restored dictionary from cache storage");
            }
            record
        }
        Err(e) => {
            tracing::warn!(key, "Failed to load from cache storage: {e}");
            None
        }
    }
}

fn persist<S>(storage: Option<&mut S>, record: &CacheRecord)
where
    S: CacheStorage + ?Sized,
{
    if let Some(storage) = storage
        && let Err(e) = storage.save(&record.key, record)
    {
        tracing::warn!(key = %record.key, "Failed to persist cache record: {e}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use googletest::prelude::*;
    use tempfile::TempDir;

    use super::*;
    use crate::error::StorageError;
    use crate::types::Form;

    fn dictionary(value: &str) -> Dictionary {
        let mut data = Dictionary::new();
        data.insert("variable", vec![Form::Text(value.to_string())]);
        data
    }

    fn loaded(value: &str, version: Option<u64>) -> LoadedDictionary {
        LoadedDictionary { data: dictionary(value), version }
    }

    fn variable(record: &CacheRecord) -> Option<&Form> {
        record.data.get("variable").and_then(|entry| entry.first())
    }

    #[googletest::test]
    fn get_or_load_loads_once() {
        let mut cache = DictionaryCache::new();
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Ok(loaded("1", None))
        };

        cache.get_or_load("en:web/cached", load).unwrap();
        cache.get_or_load("en:web/cached", load).unwrap();

        expect_that!(calls.get(), eq(1));
        expect_that!(cache.len(), eq(1));
    }

    #[googletest::test]
    fn get_or_load_propagates_loader_errors() {
        let mut cache = DictionaryCache::new();

        let result = cache.get_or_load("en:web/broken", || {
            Err(TranslateError::MalformedKey { key: "x".to_string() })
        });

        expect_that!(result.is_err(), eq(true));
        expect_that!(cache.is_empty(), eq(true));
    }

    #[googletest::test]
    fn invalidate_keeps_data_when_version_is_unchanged() {
        let mut cache = DictionaryCache::new();
        cache.get_or_load("en:web/cached", || Ok(loaded("1", Some(1)))).unwrap();

        cache.invalidate();
        expect_that!(cache.get("en:web/cached"), none());

        let record = cache.get_or_load("en:web/cached", || Ok(loaded("2", Some(1)))).unwrap();
        expect_that!(variable(record), some(eq(&Form::Text("1".to_string()))));
    }

    #[googletest::test]
    fn invalidate_replaces_data_when_version_changes() {
        let mut cache = DictionaryCache::new();
        cache.get_or_load("en:web/cached", || Ok(loaded("1", Some(1)))).unwrap();

        cache.invalidate();

        let record = cache.get_or_load("en:web/cached", || Ok(loaded("2", Some(2)))).unwrap();
        expect_that!(variable(record), some(eq(&Form::Text("2".to_string()))));
        expect_that!(record.version, some(eq(2)));
    }

    #[googletest::test]
    fn invalidate_replaces_unversioned_data() {
        let mut cache = DictionaryCache::new();
        cache.put("en:web/simple", dictionary("1"), None);

        cache.invalidate();

        let record = cache.put("en:web/simple", dictionary("2"), None);
        expect_that!(variable(record), some(eq(&Form::Text("2".to_string()))));
    }

    #[googletest::test]
    fn records_are_persisted_and_restored() {
        let dir = TempDir::new().unwrap();

        let mut first = DictionaryCache::new();
        first.configure(Box::new(FileStorage::new(dir.path()))).unwrap();
        first.put("en:web/promo", dictionary("1"), Some(4));
        expect_that!(first.load_persisted("en:web/promo"), some(anything()));

        let mut second = DictionaryCache::new();
        second.configure(Box::new(FileStorage::new(dir.path()))).unwrap();
        let record = second
            .get_or_load("en:web/promo", || panic!("should be restored from storage"))
            .unwrap();
        expect_that!(record.version, some(eq(4)));
    }

    #[googletest::test]
    fn retired_record_is_dropped_by_next_lookup() {
        let mut cache = DictionaryCache::new();
        cache.get_or_load("en:web/cached", || Ok(loaded("1", Some(1)))).unwrap();
        cache.invalidate();
        expect_that!(cache.retired.len(), eq(1));

        cache.get_or_load("en:web/cached", || Ok(loaded("1", Some(1)))).unwrap();

        expect_that!(cache.retired.is_empty(), eq(true));
    }

    #[googletest::test]
    fn retired_records_last_one_invalidation() {
        let mut cache = DictionaryCache::new();
        cache.put("en:web/promo", dictionary("1"), Some(1));
        cache.invalidate();
        cache.put("en:web/simple", dictionary("1"), Some(1));

        cache.invalidate();

        expect_that!(cache.retired.len(), eq(1));
        expect_that!(cache.retired.contains_key("en:web/simple"), eq(true));
        let record = cache.put("en:web/promo", dictionary("2"), Some(1));
        expect_that!(variable(record), some(eq(&Form::Text("2".to_string()))));
    }

    #[googletest::test]
    fn invalidate_discards_persisted_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut cache = DictionaryCache::new();
        cache.configure(Box::new(FileStorage::new(dir.path()))).unwrap();
        cache.put("en:web/simple", dictionary("1"), None);

        cache.invalidate();

        expect_that!(cache.load_persisted("en:web/simple"), none());
        expect_that!(cache.is_empty(), eq(true));
    }

    #[googletest::test]
    fn configure_rejects_unusable_storage() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain-file");
        std::fs::write(&file, "").unwrap();
        let mut cache = DictionaryCache::new();

        let result = cache.configure(Box::new(FileStorage::new(file)));

        assert!(matches!(result, Err(TranslateError::InvalidStorage(_))));
        expect_that!(cache.has_storage(), eq(false));
    }

    /// Backend whose every operation fails.
    #[derive(Debug)]
    struct BrokenStorage;

    impl CacheStorage for BrokenStorage {
        fn load(&self, _key: &str) -> std::result::Result<Option<CacheRecord>, StorageError> {
            Err(StorageError::Io(std::io::Error::other("load failed")))
        }

        fn save(
            &mut self,
            _key: &str,
            _record: &CacheRecord,
        ) -> std::result::Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("save failed")))
        }

        fn invalidate(&mut self) -> std::result::Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("invalidate failed")))
        }
    }

    #[googletest::test]
    fn storage_failures_degrade_to_index_only() {
        let mut cache = DictionaryCache::new();
        cache.configure(Box::new(BrokenStorage)).unwrap();

        let record = cache.get_or_load("en:web/promo", || Ok(loaded("1", None))).unwrap();
        expect_that!(variable(record), some(eq(&Form::Text("1".to_string()))));

        cache.invalidate();
        expect_that!(cache.get("en:web/promo"), none());
    }
}
