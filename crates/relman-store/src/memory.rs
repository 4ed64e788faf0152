//! In-memory package store.
//!
//! Backs session-scoped package snapshots and doubles as the test fake for
//! [`PackageStore`] consumers.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StorageResult;
use crate::store::PackageStore;

/// In-memory store backed by a `Mutex<HashMap>`. Contents live and die with
/// the process.
#[derive(Debug, Default)]
pub struct MemoryPackageStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryPackageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PackageStore for MemoryPackageStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        Ok(())
    }
}
