//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Listing` / `Record`: a catalog entry before and after it is placed on a page
//! - `Checkpoint`: the ordered record sequence and its derived resume cursor
//! - `DedupSet`: keys already seen in the current run
//! - `CrawlPhase`: the crawl engine's state machine

mod checkpoint;
mod crawl_phase;
mod record;

// Re-export main types
pub use checkpoint::{Checkpoint, DedupSet};
pub use crawl_phase::CrawlPhase;
pub use record::{DedupKey, Listing, Record};
