//! Bounded-concurrency asset downloader
//!
//! The pool fans a finalized record list out over at most `workers` in-flight
//! requests and fans the results back in, one `Outcome` per record, in input
//! order. Failures stay local to their record.

use crate::config::DownloadConfig;
use crate::download::outcome::{DownloadError, Outcome};
use crate::download::sanitize::file_name_for;
use crate::state::Record;

use futures_util::stream::{self, StreamExt};
use reqwest::Client;
use std::ffi::OsString;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// Observer notified once per finished download
pub trait ProgressSink: Sync {
    /// Called as each record reaches its outcome; `completed` counts from 1
    fn on_outcome(&self, outcome: &Outcome, completed: usize, total: usize);
}

/// Progress sink that discards all events
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_outcome(&self, _outcome: &Outcome, _completed: usize, _total: usize) {}
}

/// Progress sink that logs each outcome through `tracing`
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_outcome(&self, outcome: &Outcome, completed: usize, total: usize) {
        match outcome {
            Outcome::Success { path, .. } => {
                tracing::info!("[{}/{}] Saved {}", completed, total, path.display());
            }
            Outcome::Failure { record, reason } => {
                tracing::warn!(
                    "[{}/{}] Failed {}: {}",
                    completed,
                    total,
                    record.asset_url(),
                    reason
                );
            }
        }
    }
}

/// Concurrent downloader for record assets
pub struct DownloadPool {
    client: Client,
    workers: usize,
    disambiguate: bool,
    cancel: Option<CancellationToken>,
}

impl DownloadPool {
    /// Creates a pool with `workers` concurrent downloads (at least one)
    pub fn new(client: Client, workers: usize) -> Self {
        Self {
            client,
            workers: workers.max(1),
            disambiguate: false,
            cancel: None,
        }
    }

    pub fn from_config(client: Client, config: &DownloadConfig) -> Self {
        Self::new(client, config.workers).with_disambiguation(config.disambiguate_names)
    }

    /// Appends record ids to file names
    pub fn with_disambiguation(mut self, enabled: bool) -> Self {
        self.disambiguate = enabled;
        self
    }

    /// Records not yet started when `token` fires fail with `Cancelled`
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Downloads every record's asset into `destination`
    ///
    /// Returns only after every record has an outcome. The result has one
    /// entry per input record, in the same order.
    pub async fn download_all(
        &self,
        records: &[Record],
        destination: &Path,
        progress: &dyn ProgressSink,
    ) -> Vec<Outcome> {
        let total = records.len();
        let completed = AtomicUsize::new(0);
        let completed = &completed;

        tracing::info!(
            "Downloading {} assets to {} with {} workers",
            total,
            destination.display(),
            self.workers
        );

        stream::iter(records.iter().cloned())
            .map(|record| async move {
                let outcome = self.download_one(record, destination).await;
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                progress.on_outcome(&outcome, done, total);
                outcome
            })
            .buffered(self.workers)
            .collect()
            .await
    }

    async fn download_one(&self, record: Record, destination: &Path) -> Outcome {
        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Outcome::Failure {
                record,
                reason: DownloadError::Cancelled,
            };
        }

        if record.asset_url().trim().is_empty() {
            return Outcome::Failure {
                record,
                reason: DownloadError::MissingUrl,
            };
        }

        let path = destination.join(file_name_for(&record, self.disambiguate));
        match self.fetch_to(record.asset_url(), destination, &path).await {
            Ok(bytes) => {
                tracing::debug!("Wrote {} bytes to {}", bytes, path.display());
                Outcome::Success { record, path }
            }
            Err(reason) => Outcome::Failure { record, reason },
        }
    }

    /// Streams `url` into `path` via a uniquely named sibling `.part` file
    ///
    /// Each download stages its own file, so records sharing a name never
    /// write into the same file; the last completed rename wins.
    async fn fetch_to(&self, url: &str, dir: &Path, path: &Path) -> Result<u64, DownloadError> {
        // create_dir_all succeeds when a sibling worker created it first
        tokio::fs::create_dir_all(dir).await?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus {
                status: status.as_u16(),
            });
        }

        // the staging file is removed on drop if anything below fails
        let (file, staged) = staging_file(dir, path)?.into_parts();
        let written = write_body(response, tokio::fs::File::from_std(file)).await?;

        staged.persist(path)?;
        Ok(written)
    }
}

fn staging_file(dir: &Path, path: &Path) -> std::io::Result<NamedTempFile> {
    let mut prefix = path.file_name().map(OsString::from).unwrap_or_default();
    prefix.push(".");
    tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".part")
        .tempfile_in(dir)
}

async fn write_body(
    response: reqwest::Response,
    mut file: tokio::fs::File,
) -> Result<u64, DownloadError> {
    let mut body = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}
