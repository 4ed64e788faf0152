//! Error types for the package storage layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the package storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backing file could not be read.
    #[error("failed to read store file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file could not be written.
    #[error("failed to write store file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store contents could not be encoded.
    #[error("failed to encode store contents: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
