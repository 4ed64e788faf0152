//! Client-side persistence for release packages.
//!
//! The console keeps package contents on the client: named snapshots for the
//! current session and one durable draft under a well-known key. This crate
//! models that as a small synchronous key/value port keyed by package name,
//! with two implementations:
//!
//! - [`MemoryPackageStore`]: session-scoped; also the test fake
//! - [`JsonFilePackageStore`]: durable, one JSON object file on disk

pub mod error;
pub mod json_file;
pub mod memory;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use json_file::JsonFilePackageStore;
pub use memory::MemoryPackageStore;
pub use store::PackageStore;
