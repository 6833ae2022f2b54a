//! Download module for mirroring record assets
//!
//! This module turns a persisted checkpoint into files on disk:
//! - File name derivation from record labels
//! - A bounded download pool with per-record failure isolation
//! - Structured per-record outcomes and a summary report

mod outcome;
mod pool;
mod sanitize;

pub use outcome::{DownloadError, DownloadReport, Outcome};
pub use pool::{DownloadPool, LogProgress, NoProgress, ProgressSink};
pub use sanitize::{file_name_for, sanitize_label};

use crate::config::Config;
use crate::storage::{open_store, CheckpointStore};
use crate::url::CollectionKey;
use crate::HarvestError;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

/// Builds the HTTP client used for asset downloads
pub fn build_download_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .connect_timeout(config.download.connect_timeout())
        .timeout(config.download.request_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Downloads every asset listed in the collection's checkpoint
///
/// Files land in the collection folder next to the checkpoint. A missing
/// checkpoint downloads nothing; a corrupt one is returned as an error.
pub async fn run_download(
    config: &Config,
    key: &CollectionKey,
    cancel: CancellationToken,
) -> Result<DownloadReport, HarvestError> {
    let store = open_store(&config.output);
    let checkpoint = store.load(key)?;
    if checkpoint.is_empty() {
        tracing::warn!("No records for {}; nothing to download", key);
        return Ok(DownloadReport::default());
    }

    let client = build_download_client(config)?;
    let pool = DownloadPool::from_config(client, &config.download).with_cancellation(cancel);
    let destination = store.collection_dir(key);

    let outcomes = pool
        .download_all(checkpoint.records(), &destination, &LogProgress)
        .await;
    let report = DownloadReport::new(outcomes);

    tracing::info!(
        "Downloads finished: {} succeeded, {} failed",
        report.success_count(),
        report.failure_count()
    );
    Ok(report)
}
