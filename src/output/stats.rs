//! Statistics derived from a collection's checkpoint
//!
//! This module provides functionality for summarizing what a checkpoint
//! holds: how many records each result page contributed, how many records
//! lack a listing id, and where the next crawl would resume.

use crate::config::ResumePolicy;
use crate::state::Checkpoint;
use crate::storage::CheckpointStore;
use crate::url::CollectionKey;
use crate::HarvestError;
use std::collections::BTreeMap;

/// Checkpoint statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointStatistics {
    /// Total number of records
    pub total_records: usize,

    /// Records per result page, ordered by page
    pub records_per_page: BTreeMap<u32, usize>,

    /// Records persisted without a listing id
    pub provisional_records: usize,

    /// Page the next crawl starts from
    pub resume_page: u32,
}

impl CheckpointStatistics {
    /// Computes statistics for an in-memory checkpoint
    pub fn from_checkpoint(checkpoint: &Checkpoint, policy: ResumePolicy) -> Self {
        let mut records_per_page = BTreeMap::new();
        for record in checkpoint.records() {
            *records_per_page.entry(record.page()).or_insert(0) += 1;
        }

        Self {
            total_records: checkpoint.len(),
            records_per_page,
            provisional_records: checkpoint
                .records()
                .iter()
                .filter(|r| r.is_provisional())
                .count(),
            resume_page: checkpoint.resume_cursor(policy),
        }
    }
}

/// Loads statistics for a collection from storage
///
/// # Returns
///
/// * `Ok(CheckpointStatistics)` - Statistics for the stored records
/// * `Err(HarvestError)` - The checkpoint could not be read
pub fn load_statistics(
    store: &dyn CheckpointStore,
    key: &CollectionKey,
    policy: ResumePolicy,
) -> Result<CheckpointStatistics, HarvestError> {
    let checkpoint = store.load(key)?;
    Ok(CheckpointStatistics::from_checkpoint(&checkpoint, policy))
}

/// Renders statistics as the text printed by `print_statistics`
pub fn render_statistics(key: &CollectionKey, stats: &CheckpointStatistics) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Checkpoint Statistics: {} ===\n\n", key));

    if stats.records_per_page.is_empty() {
        out.push_str("No records yet.\n");
    } else {
        out.push_str("Records by Page:\n");
        for (page, count) in &stats.records_per_page {
            out.push_str(&format!("  Page {}: {}\n", page, count));
        }
    }
    out.push('\n');

    out.push_str(&format!("Total records: {}\n", stats.total_records));
    if stats.provisional_records > 0 {
        out.push_str(&format!(
            "Records without listing id: {}\n",
            stats.provisional_records
        ));
    }
    out.push_str(&format!("Next crawl starts at page {}\n", stats.resume_page));
    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(key: &CollectionKey, stats: &CheckpointStatistics) {
    print!("{}", render_statistics(key, stats));
}
