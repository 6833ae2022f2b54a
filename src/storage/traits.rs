//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::state::Checkpoint;
use crate::url::CollectionKey;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Corrupt checkpoint {}, line {line}: {message}", .path.display())]
    CorruptCheckpoint {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Failed to replace checkpoint: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for checkpoint backends
///
/// A backend persists the full record sequence of one collection. Loading a
/// collection that was never saved yields an empty checkpoint; loading data
/// that cannot be read back as records is an error and must not be repaired
/// silently.
pub trait CheckpointStore {
    /// Reads the persisted checkpoint for `key`
    fn load(&self, key: &CollectionKey) -> StorageResult<Checkpoint>;

    /// Replaces the persisted checkpoint for `key` in one step
    ///
    /// Creates the collection's storage location if it does not exist yet.
    fn save(&self, key: &CollectionKey, checkpoint: &Checkpoint) -> StorageResult<()>;
}
