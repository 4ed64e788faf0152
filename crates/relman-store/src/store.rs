//! Storage trait definition for release package persistence.

use crate::error::StorageResult;

/// Key/value store for serialized release packages, keyed by package name.
///
/// Semantics: string values, last write wins, `remove` is a no-op for missing
/// keys. Operations are synchronous; the working set calls them inline from a
/// single logical session.
pub trait PackageStore: Send + Sync {
    /// Fetch the serialized value for a package name, if present.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store a serialized value under a package name, replacing any previous
    /// value.
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove the entry for a package name. No-op if absent.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
