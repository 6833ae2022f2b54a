//! Page extractor interface and its HTML implementation

use crate::config::Config;
use crate::crawler::fetcher::fetch_html;
use crate::crawler::parser::{default_strategies, ExtractionStrategy};
use crate::state::Listing;
use crate::url::PageLocator;
use crate::UrlError;

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Reasons a single result page could not be turned into listings
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid page URL: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Source of listings for one result page at a time
///
/// Each call returns a freshly owned list; an empty list means the page has
/// no matches, which is distinct from an error.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn fetch_page(&self, locator: &PageLocator) -> Result<Vec<Listing>, ExtractionError>;
}

/// Extractor that requests search pages over HTTP and parses the markup
///
/// Strategies are tried in order. Once a later strategy produces listings it
/// stays selected for the rest of the run; earlier ones are not retried.
pub struct HtmlPageExtractor {
    client: Client,
    search_url: String,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    active: AtomicUsize,
}

impl HtmlPageExtractor {
    pub fn new(client: Client, search_url: impl Into<String>) -> Self {
        Self::with_strategies(client, search_url, default_strategies())
    }

    pub fn with_strategies(
        client: Client,
        search_url: impl Into<String>,
        strategies: Vec<Box<dyn ExtractionStrategy>>,
    ) -> Self {
        Self {
            client,
            search_url: search_url.into(),
            strategies,
            active: AtomicUsize::new(0),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(client, config.site.resolved_search_url())
    }

    /// Name of the strategy currently in use
    pub fn active_strategy(&self) -> Option<&'static str> {
        self.strategies
            .get(self.active.load(Ordering::Relaxed))
            .map(|s| s.name())
    }

    /// Runs the strategies over a page body, starting from the active one
    pub fn extract_listings(&self, html: &str) -> Vec<Listing> {
        let document = Html::parse_document(html);
        let start = self.active.load(Ordering::Relaxed);

        for (index, strategy) in self.strategies.iter().enumerate().skip(start) {
            let listings = strategy.extract(&document);
            if listings.is_empty() {
                continue;
            }
            if index != start {
                tracing::info!("Switching to {} extraction", strategy.name());
                self.active.store(index, Ordering::Relaxed);
            }
            return listings;
        }

        Vec::new()
    }
}

#[async_trait]
impl PageExtractor for HtmlPageExtractor {
    async fn fetch_page(&self, locator: &PageLocator) -> Result<Vec<Listing>, ExtractionError> {
        let url = locator.to_url(&self.search_url)?;
        tracing::debug!("Requesting {}", url);

        let body = fetch_html(&self.client, &url).await?;
        Ok(self.extract_listings(&body))
    }
}
