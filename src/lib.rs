//! Shelf-Harvest: an incremental storefront catalog mirror
//!
//! This crate walks a server-paginated listing catalog page by page, keeps a
//! resumable CSV checkpoint of every discovered listing, and mirrors the
//! referenced media assets to local storage with a bounded download pool.

pub mod config;
pub mod crawler;
pub mod download;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Shelf-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Extraction failed on page {page} ({records} records kept): {source}")]
    Extraction {
        page: u32,
        /// Records in the checkpoint flushed before the failure was returned
        records: usize,
        source: crawler::ExtractionError,
    },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid crawl phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Returns true if the error comes from an unreadable checkpoint
    pub fn is_corrupt_checkpoint(&self) -> bool {
        matches!(
            self,
            Self::Storage(storage::StorageError::CorruptCheckpoint { .. })
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Collection needs a seller or a keyword")]
    EmptyCollection,
}

/// Result type alias for Shelf-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{Checkpoint, CrawlPhase, Record};
pub use url::{normalize_asset_url, CollectionKey, PageLocator};
