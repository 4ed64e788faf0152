//! Contract tests for `PackageStore` implementations.
//!
//! These verify the behavioral contract of the storage port against both the
//! in-memory session store and the JSON-file store. Any conforming
//! implementation must pass these.

use relman_store::{JsonFilePackageStore, MemoryPackageStore, PackageStore};

// ===========================================================================
// MemoryPackageStore
// ===========================================================================

#[test]
fn memory_get_missing_returns_none() {
    let store = MemoryPackageStore::new();

    assert_eq!(store.get("releaseItem").unwrap(), None);
}

#[test]
fn memory_put_then_get_round_trip() {
    let store = MemoryPackageStore::new();
    store.put("releaseItem", "[]").unwrap();

    assert_eq!(store.get("releaseItem").unwrap().as_deref(), Some("[]"));
}

#[test]
fn memory_put_overwrites_previous_value() {
    let store = MemoryPackageStore::new();
    store.put("releaseItem", "old").unwrap();
    store.put("releaseItem", "new").unwrap();

    assert_eq!(store.get("releaseItem").unwrap().as_deref(), Some("new"));
}

#[test]
fn memory_remove_deletes_entry() {
    let store = MemoryPackageStore::new();
    store.put("releaseItem", "[]").unwrap();
    store.remove("releaseItem").unwrap();

    assert_eq!(store.get("releaseItem").unwrap(), None);
}

#[test]
fn memory_remove_missing_is_noop() {
    let store = MemoryPackageStore::new();
    // Should not error
    store.remove("never-stored").unwrap();
}

#[test]
fn memory_keys_are_independent() {
    let store = MemoryPackageStore::new();
    store.put("releaseItem", "draft").unwrap();
    store.put("pkg-20240105", "named").unwrap();
    store.remove("releaseItem").unwrap();

    assert_eq!(
        store.get("pkg-20240105").unwrap().as_deref(),
        Some("named")
    );
}

// ===========================================================================
// JsonFilePackageStore
// ===========================================================================

#[test]
fn file_get_missing_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFilePackageStore::new(dir.path());

    assert_eq!(store.get("releaseItem").unwrap(), None);
}

#[test]
fn file_put_then_get_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFilePackageStore::new(dir.path());
    store.put("releaseItem", r#"[{"name":"j1"}]"#).unwrap();

    assert_eq!(
        store.get("releaseItem").unwrap().as_deref(),
        Some(r#"[{"name":"j1"}]"#)
    );
}

#[test]
fn file_contents_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = JsonFilePackageStore::new(dir.path());
        store.put("releaseItem", "persisted").unwrap();
    }

    let reopened = JsonFilePackageStore::new(dir.path());
    assert_eq!(
        reopened.get("releaseItem").unwrap().as_deref(),
        Some("persisted")
    );
}

#[test]
fn file_remove_deletes_entry() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFilePackageStore::new(dir.path());
    store.put("releaseItem", "[]").unwrap();
    store.remove("releaseItem").unwrap();

    assert_eq!(store.get("releaseItem").unwrap(), None);
}

#[test]
fn file_remove_missing_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFilePackageStore::new(dir.path());

    store.remove("never-stored").unwrap();
    assert!(!store.file_path().exists());
}

#[test]
fn file_corrupt_store_recovers_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFilePackageStore::new(dir.path());
    std::fs::write(store.file_path(), "{not json").unwrap();

    assert_eq!(store.get("releaseItem").unwrap(), None);
}

#[test]
fn file_put_after_corruption_rewrites_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFilePackageStore::new(dir.path());
    std::fs::write(store.file_path(), "]]oops[[").unwrap();

    store.put("releaseItem", "fresh").unwrap();
    assert_eq!(store.get("releaseItem").unwrap().as_deref(), Some("fresh"));
}

#[test]
fn file_creates_parent_directory_on_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("state").join("relman");
    let store = JsonFilePackageStore::new(&nested);

    store.put("releaseItem", "[]").unwrap();
    assert!(store.file_path().exists());
}
