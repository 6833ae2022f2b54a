//! Crawler coordinator - the page loop
//!
//! This module drives one crawl run for one collection:
//! - Loading the checkpoint and deriving the resume page
//! - Requesting result pages strictly one after another
//! - Deciding end-of-results from each page's listings
//! - Deduplicating against everything already recorded
//! - Observing cancellation at page boundaries
//! - Flushing the checkpoint exactly once before returning

use crate::config::{CrawlerConfig, ResumePolicy};
use crate::crawler::{CrawlReport, CrawlStatus, PageExtractor, StopReason};
use crate::state::{Checkpoint, CrawlPhase, DedupSet, Listing};
use crate::storage::CheckpointStore;
use crate::url::CollectionKey;
use crate::HarvestError;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// Knobs for one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    pub resume_policy: ResumePolicy,
    pub page_size: Option<u32>,
    pub stop_on_leading_repeat: bool,
    /// Ignore the persisted checkpoint and start from page 1
    pub fresh: bool,
}

impl CrawlOptions {
    pub fn from_config(config: &CrawlerConfig, fresh: bool) -> Self {
        Self {
            resume_policy: config.resume_policy,
            page_size: config.page_size,
            stop_on_leading_repeat: config.stop_on_leading_repeat,
            fresh,
        }
    }
}

/// What to do with one fetched page
#[derive(Debug)]
enum PageDecision {
    Stop(StopReason),
    Accept(Vec<Listing>),
}

/// Main crawl coordinator structure
pub struct Coordinator<'a> {
    key: CollectionKey,
    extractor: &'a dyn PageExtractor,
    store: &'a dyn CheckpointStore,
    options: CrawlOptions,
    cancel: CancellationToken,
    phase: CrawlPhase,
}

impl<'a> Coordinator<'a> {
    /// Creates a coordinator for one run over `key`
    pub fn new(
        key: CollectionKey,
        extractor: &'a dyn PageExtractor,
        store: &'a dyn CheckpointStore,
        options: CrawlOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            key,
            extractor,
            store,
            options,
            cancel,
            phase: CrawlPhase::Init,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Runs the page loop to a terminal condition
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - End of results or cancellation; checkpoint flushed
    /// * `Err(HarvestError::Storage)` - Checkpoint unreadable (nothing fetched or
    ///   written) or the final flush failed
    /// * `Err(HarvestError::Extraction)` - A page failed; records gathered up to
    ///   the previous page were flushed first
    pub async fn run(&mut self) -> Result<CrawlReport, HarvestError> {
        let started_at = Utc::now();

        let mut checkpoint = if self.options.fresh {
            tracing::info!("Fresh crawl for {}; previous checkpoint ignored", self.key);
            Checkpoint::new()
        } else {
            self.store.load(&self.key)?
        };

        let records_before = checkpoint.len();
        let mut seen = DedupSet::from_records(checkpoint.records());
        let first_page = checkpoint.resume_cursor(self.options.resume_policy);
        // A re-verified page is expected to repeat; only emptiness ends the run there
        let reverify_page = (!checkpoint.is_empty()
            && self.options.resume_policy == ResumePolicy::Reverify)
            .then_some(first_page);

        tracing::info!(
            "Crawling {} from page {} ({} known records)",
            self.key,
            first_page,
            records_before
        );

        self.transition(CrawlPhase::Fetching)?;

        let mut page = first_page;
        let mut pages_fetched = 0u32;

        let status = loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Cancellation requested; stopping before page {}", page);
                break CrawlStatus::Interrupted;
            }

            let locator = self.key.page(page, self.options.page_size);
            let listings = match self.extractor.fetch_page(&locator).await {
                Ok(listings) => listings,
                Err(source) => {
                    tracing::error!("Page {} failed: {}", page, source);
                    self.transition(CrawlPhase::Stopping)?;
                    match self.store.save(&self.key, &checkpoint) {
                        Ok(()) => tracing::info!(
                            "Checkpoint flushed with {} records after page {} failed",
                            checkpoint.len(),
                            page
                        ),
                        Err(e) => {
                            tracing::error!("Failed to flush checkpoint after page error: {}", e)
                        }
                    }
                    self.transition(CrawlPhase::Stopped)?;
                    return Err(HarvestError::Extraction {
                        page,
                        records: checkpoint.len(),
                        source,
                    });
                }
            };
            pages_fetched += 1;

            let repeat_checks = reverify_page != Some(page);
            match self.evaluate(page, listings, &seen, repeat_checks) {
                PageDecision::Stop(reason) => {
                    tracing::info!("Stopping: {}", reason);
                    break CrawlStatus::Completed(reason);
                }
                PageDecision::Accept(new_listings) => {
                    let before = checkpoint.len();
                    for listing in new_listings {
                        // repeats within the same page are dropped here
                        if seen.insert_listing(&listing) {
                            tracing::debug!("New record {} on page {}", listing.dedup_key(), page);
                            checkpoint.push(listing.at_page(page));
                        }
                    }
                    tracing::info!(
                        "Page {}: {} new records ({} total)",
                        page,
                        checkpoint.len() - before,
                        checkpoint.len()
                    );
                }
            }

            self.transition(CrawlPhase::Fetching)?;
            page = page.saturating_add(1);
        };

        self.transition(CrawlPhase::Stopping)?;
        self.store.save(&self.key, &checkpoint)?;
        self.transition(CrawlPhase::Stopped)?;

        let report = CrawlReport {
            collection: self.key.to_string(),
            status,
            records_before,
            records_after: checkpoint.len(),
            first_page,
            pages_fetched,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Crawl {}: {} records ({} added)",
            report.status,
            report.records_after,
            report.records_added()
        );

        Ok(report)
    }

    /// Applies the termination rules to one page's listings
    ///
    /// Order: empty page, leading repeat (if enabled), no new records. The
    /// repeat rules are skipped when `repeat_checks` is false.
    fn evaluate(
        &self,
        page: u32,
        listings: Vec<Listing>,
        seen: &DedupSet,
        repeat_checks: bool,
    ) -> PageDecision {
        let listings: Vec<Listing> = listings
            .into_iter()
            .filter(|l| {
                let usable = l.id.is_some() || !l.asset_url.trim().is_empty();
                if !usable {
                    tracing::warn!("Dropping listing with neither id nor asset URL");
                }
                usable
            })
            .collect();

        let Some(first) = listings.first() else {
            return PageDecision::Stop(StopReason::EmptyPage { page });
        };

        if repeat_checks
            && self.options.stop_on_leading_repeat
            && seen.contains_listing(first)
        {
            return PageDecision::Stop(StopReason::LeadingRepeat { page });
        }

        let new_listings: Vec<Listing> = listings
            .into_iter()
            .filter(|l| !seen.contains_listing(l))
            .collect();

        if new_listings.is_empty() && repeat_checks {
            return PageDecision::Stop(StopReason::NoNewRecords { page });
        }

        PageDecision::Accept(new_listings)
    }
}
