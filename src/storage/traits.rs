//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path escapes the output root: {0}")]
    OutsideRoot(String),

    #[error("Storage task failed: {0}")]
    Task(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for storage backend implementations
///
/// Paths are relative to the store's root and use forward slashes, exactly
/// as produced by [`crate::url::to_local_path`]. Both operations create any
/// missing intermediate directories. Implementations are called from
/// blocking worker threads and must be thread-safe.
pub trait Store: Send + Sync {
    /// The directory every relative path is resolved under
    fn root(&self) -> &Path;

    /// Creates a directory (and its parents) under the root
    ///
    /// An empty path means the root itself.
    fn ensure_dir(&self, relative: &str) -> StoreResult<()>;

    /// Writes a file under the root, creating parent directories as needed
    fn write_file(&self, relative: &str, contents: &[u8]) -> StoreResult<()>;
}
