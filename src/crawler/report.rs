//! Crawl run results

use chrono::{DateTime, Utc};
use std::fmt;

/// Why a completed crawl stopped requesting pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The page returned no listings
    EmptyPage { page: u32 },

    /// The first listing on the page was already known
    LeadingRepeat { page: u32 },

    /// Every listing on the page was already known
    NoNewRecords { page: u32 },
}

impl StopReason {
    pub fn page(&self) -> u32 {
        match self {
            Self::EmptyPage { page } | Self::LeadingRepeat { page } | Self::NoNewRecords { page } => {
                *page
            }
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPage { page } => write!(f, "page {} was empty", page),
            Self::LeadingRepeat { page } => {
                write!(f, "first listing on page {} was already known", page)
            }
            Self::NoNewRecords { page } => write!(f, "page {} had no new listings", page),
        }
    }
}

/// Terminal status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStatus {
    /// End of results detected
    Completed(StopReason),

    /// Cancellation observed at a page boundary
    Interrupted,
}

impl CrawlStatus {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed(reason) => write!(f, "completed ({})", reason),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Summary of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub collection: String,
    pub status: CrawlStatus,
    pub records_before: usize,
    pub records_after: usize,
    /// Page the run started from
    pub first_page: u32,
    pub pages_fetched: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    pub fn records_added(&self) -> usize {
        self.records_after.saturating_sub(self.records_before)
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
