//! Durable package store backed by a single JSON file.
//!
//! The file holds one JSON object mapping package name to serialized value;
//! the draft package survives process restarts through this store. Every
//! operation re-reads the file, so concurrent console invocations see each
//! other's writes (last write wins, as with any shared key/value store).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{StorageError, StorageResult};
use crate::store::PackageStore;

const STORE_FILE_NAME: &str = "packages.json";

/// File-backed [`PackageStore`].
#[derive(Debug, Clone)]
pub struct JsonFilePackageStore {
    file_path: PathBuf,
}

impl JsonFilePackageStore {
    /// Create a store rooted at `dir`. The backing file is created on first
    /// write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            file_path: dir.as_ref().join(STORE_FILE_NAME),
        }
    }

    /// Path of the backing file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.file_path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(err) => {
                return Err(StorageError::ReadFile {
                    path: self.file_path.clone(),
                    source: err,
                })
            }
        };

        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                // A broken store file must never wedge the console; start over.
                warn!(
                    event = "store.file_discarded",
                    path = %self.file_path.display(),
                    error = %err,
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).map_err(|err| StorageError::WriteFile {
                path: self.file_path.clone(),
                source: err,
            })?;
        }
        let data = serde_json::to_string_pretty(entries)?;
        fs::write(&self.file_path, data).map_err(|err| StorageError::WriteFile {
            path: self.file_path.clone(),
            source: err,
        })
    }
}

impl PackageStore for JsonFilePackageStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
