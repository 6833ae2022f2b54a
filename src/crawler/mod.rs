//! Crawler module for walking storefront result pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of result pages
//! - HTML extraction strategies with sticky fallback
//! - The page loop with end-of-results detection and resume support

mod coordinator;
mod extractor;
mod fetcher;
mod parser;
mod report;

pub use coordinator::{Coordinator, CrawlOptions};
pub use extractor::{ExtractionError, HtmlPageExtractor, PageExtractor};
pub use fetcher::{build_http_client, fetch_html};
pub use parser::{default_strategies, CardGridStrategy, ExtractionStrategy, ItemListStrategy};
pub use report::{CrawlReport, CrawlStatus, StopReason};

use crate::config::Config;
use crate::state::Listing;
use crate::storage::open_store;
use crate::url::CollectionKey;
use crate::{HarvestError, UrlError};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Runs a complete crawl for one collection
///
/// This is the main entry point for a crawl. It will:
/// 1. Open the checkpoint store under the configured output root
/// 2. Build the HTTP client and page extractor
/// 3. Walk result pages from the resume page until a terminal condition
/// 4. Flush the checkpoint and return the run summary
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `key` - Seller and/or keyword identifying the collection
/// * `fresh` - Ignore the existing checkpoint and start from page 1
/// * `cancel` - Token observed between pages
pub async fn run_crawl(
    config: &Config,
    key: CollectionKey,
    fresh: bool,
    cancel: CancellationToken,
) -> Result<CrawlReport, HarvestError> {
    let store = open_store(&config.output);
    let client = build_http_client(config)?;
    let extractor = HtmlPageExtractor::from_config(client, config);
    let options = CrawlOptions::from_config(&config.crawler, fresh);

    tracing::info!(
        "Checkpoint for {}: {}",
        key,
        store.checkpoint_path(&key).display()
    );

    Coordinator::new(key, &extractor, &store, options, cancel)
        .run()
        .await
}

/// Extracts listings from a single page URL without touching any checkpoint
pub async fn probe(config: &Config, url: &str) -> Result<Vec<Listing>, ExtractionError> {
    let url = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;
    let client = build_http_client(config).map_err(|e| ExtractionError::Network(e.to_string()))?;
    let extractor = HtmlPageExtractor::from_config(client.clone(), config);

    let body = fetch_html(&client, &url).await?;
    let listings = extractor.extract_listings(&body);

    tracing::info!(
        "Probe found {} listings using {} extraction",
        listings.len(),
        extractor.active_strategy().unwrap_or("no")
    );
    Ok(listings)
}
