//! Output module for console summaries
//!
//! This module handles:
//! - Checkpoint statistics (records per page, resume page)
//! - Crawl run summaries
//! - Download run summaries with per-record failure reasons

mod report;
pub mod stats;

pub use report::{
    print_crawl_report, print_download_report, render_crawl_report, render_download_report,
};
pub use stats::{load_statistics, print_statistics, render_statistics, CheckpointStatistics};
