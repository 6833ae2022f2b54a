//! Storage module for persisting crawl checkpoints
//!
//! This module handles checkpoint persistence, including:
//! - The `CheckpointStore` backend interface
//! - The CSV table layout (`id,url,name,page`)
//! - Atomic temp-then-rename saves so a crash never leaves a partial table

mod csv_store;
mod schema;
mod traits;

pub use csv_store::{CsvCheckpointStore, StagedCheckpoint};
pub use schema::CHECKPOINT_HEADER;
pub use traits::{CheckpointStore, StorageError, StorageResult};

use crate::config::OutputConfig;

/// Opens the checkpoint store described by the output configuration
pub fn open_store(config: &OutputConfig) -> CsvCheckpointStore {
    CsvCheckpointStore::from_config(config)
}
