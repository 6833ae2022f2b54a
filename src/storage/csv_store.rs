//! CSV checkpoint backend
//!
//! Each collection gets its own folder under the output root holding a single
//! checkpoint table. Saves go through a temp file in the same folder that is
//! renamed over the previous table, so readers only ever see a complete file.

use crate::config::OutputConfig;
use crate::state::Checkpoint;
use crate::storage::schema::{check_header, decode_row, encode_row, CHECKPOINT_HEADER};
use crate::storage::{CheckpointStore, StorageError, StorageResult};
use crate::url::CollectionKey;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Checkpoint store writing one CSV table per collection
#[derive(Debug, Clone)]
pub struct CsvCheckpointStore {
    root: PathBuf,
    file_name: String,
}

impl CsvCheckpointStore {
    /// Creates a store rooted at `root`, naming each table `file_name`
    pub fn new(root: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            file_name: file_name.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.root, &config.checkpoint_file)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder holding everything that belongs to one collection
    pub fn collection_dir(&self, key: &CollectionKey) -> PathBuf {
        self.root.join(key.directory_name())
    }

    /// Full path of the checkpoint table for `key`
    pub fn checkpoint_path(&self, key: &CollectionKey) -> PathBuf {
        self.collection_dir(key).join(&self.file_name)
    }

    /// Writes `checkpoint` to a temp file next to its final location
    ///
    /// Nothing is visible at the checkpoint path until the returned value is
    /// committed. Dropping it discards the temp file and leaves any previous
    /// checkpoint untouched.
    pub fn stage(
        &self,
        key: &CollectionKey,
        checkpoint: &Checkpoint,
    ) -> StorageResult<StagedCheckpoint> {
        let dir = self.collection_dir(key);
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            writer.write_record(CHECKPOINT_HEADER)?;
            for record in checkpoint.records() {
                writer.write_record(encode_row(record))?;
            }
            writer.flush()?;
        }
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        Ok(StagedCheckpoint {
            tmp,
            target: self.checkpoint_path(key),
            records: checkpoint.len(),
        })
    }

    fn read_table(path: &Path, file: File) -> StorageResult<Checkpoint> {
        let corrupt = |line: u64, message: String| StorageError::CorruptCheckpoint {
            path: path.to_path_buf(),
            line,
            message,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);

        let header = reader.headers().map_err(|e| csv_corruption(path, e))?;
        check_header(header).map_err(|msg| corrupt(1, msg))?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| csv_corruption(path, e))?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let record = decode_row(&row).map_err(|msg| corrupt(line, msg))?;
            records.push(record);
        }

        Ok(Checkpoint::from_records(records))
    }
}

/// Maps a CSV read failure to a corruption error, keeping IO errors distinct
fn csv_corruption(path: &Path, err: csv::Error) -> StorageError {
    if err.is_io_error() {
        return StorageError::Csv(err);
    }
    StorageError::CorruptCheckpoint {
        path: path.to_path_buf(),
        line: err.position().map(|p| p.line()).unwrap_or(0),
        message: err.to_string(),
    }
}

impl CheckpointStore for CsvCheckpointStore {
    fn load(&self, key: &CollectionKey) -> StorageResult<Checkpoint> {
        let path = self.checkpoint_path(key);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No checkpoint at {}, starting empty", path.display());
                return Ok(Checkpoint::new());
            }
            Err(e) => return Err(e.into()),
        };

        if file.metadata()?.len() == 0 {
            tracing::debug!("Checkpoint {} is empty", path.display());
            return Ok(Checkpoint::new());
        }

        let checkpoint = Self::read_table(&path, file)?;
        tracing::debug!(
            "Loaded {} records from {}",
            checkpoint.len(),
            path.display()
        );
        Ok(checkpoint)
    }

    fn save(&self, key: &CollectionKey, checkpoint: &Checkpoint) -> StorageResult<()> {
        self.stage(key, checkpoint)?.commit()?;
        Ok(())
    }
}

/// A fully written checkpoint waiting to replace the current one
#[derive(Debug)]
pub struct StagedCheckpoint {
    tmp: NamedTempFile,
    target: PathBuf,
    records: usize,
}

impl StagedCheckpoint {
    /// Path the checkpoint will occupy once committed
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically renames the staged file over the checkpoint path
    pub fn commit(self) -> StorageResult<PathBuf> {
        self.tmp.persist(&self.target)?;
        tracing::debug!(
            "Saved {} records to {}",
            self.records,
            self.target.display()
        );
        Ok(self.target)
    }
}
