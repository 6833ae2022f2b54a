use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Shelf-Harvest
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the crawl resumes relative to the highest page in the checkpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumePolicy {
    /// Resume at `max(page)` and re-verify it; dedup absorbs the repeat
    #[default]
    Reverify,
    /// Resume at `max(page) + 1`
    Skip,
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Listings per result page requested from the storefront
    #[serde(rename = "page-size")]
    pub page_size: Option<u32>,

    #[serde(rename = "resume-policy")]
    pub resume_policy: ResumePolicy,

    /// Stop as soon as the first listing of a page is already known
    #[serde(rename = "stop-on-leading-repeat")]
    pub stop_on_leading_repeat: bool,

    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,

    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_size: None,
            resume_policy: ResumePolicy::default(),
            stop_on_leading_repeat: true,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
        }
    }
}

impl CrawlerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Storefront search endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Search endpoint; `{ext}` is replaced by the locale extension
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// Locale extension of the storefront domain (e.g. "com", "de", "co.uk")
    pub extension: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            search_url: "https://www.ebay.{ext}/sch/i.html".to_string(),
            extension: "com".to_string(),
        }
    }
}

impl SiteConfig {
    /// Returns the search endpoint with the locale extension substituted
    pub fn resolved_search_url(&self) -> String {
        self.search_url.replace("{ext}", &self.extension)
    }
}

/// Asset download pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Number of downloads in flight at once
    pub workers: usize,

    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,

    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Append the listing id to every file name
    #[serde(rename = "disambiguate-names")]
    pub disambiguate_names: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 60_000,
            disambiguate_names: false,
        }
    }
}

impl DownloadConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub name: String,
    pub version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "shelf-harvest".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory under which one folder per collection is created
    pub root: String,

    /// File name of the checkpoint inside a collection folder
    #[serde(rename = "checkpoint-file")]
    pub checkpoint_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            checkpoint_file: "file_info_list.csv".to_string(),
        }
    }
}
