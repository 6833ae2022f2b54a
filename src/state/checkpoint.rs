use crate::config::ResumePolicy;
use crate::state::{DedupKey, Listing, Record};
use std::collections::HashSet;

/// In-memory resumable crawl state
///
/// Records are kept in discovery order and only ever appended. The resume
/// cursor is not stored; it is derived from the records on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkpoint {
    records: Vec<Record>,
}

impl Checkpoint {
    /// Creates an empty checkpoint
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps records loaded from storage, preserving their order
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a newly accepted record
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Highest page any record was discovered on
    pub fn max_page(&self) -> Option<u32> {
        self.records.iter().map(Record::page).max()
    }

    /// Next page to fetch under the given policy, or 1 for an empty checkpoint
    ///
    /// # Examples
    ///
    /// ```
    /// use shelf_harvest::config::ResumePolicy;
    /// use shelf_harvest::state::{Checkpoint, Record};
    ///
    /// let checkpoint = Checkpoint::from_records(vec![
    ///     Record::new(Some("a".into()), "https://x/a.jpg", None, 1),
    ///     Record::new(Some("b".into()), "https://x/b.jpg", None, 3),
    /// ]);
    /// assert_eq!(checkpoint.resume_cursor(ResumePolicy::Reverify), 3);
    /// assert_eq!(checkpoint.resume_cursor(ResumePolicy::Skip), 4);
    /// ```
    pub fn resume_cursor(&self, policy: ResumePolicy) -> u32 {
        match (self.max_page(), policy) {
            (None, _) => 1,
            (Some(max), ResumePolicy::Reverify) => max.max(1),
            (Some(max), ResumePolicy::Skip) => max.saturating_add(1),
        }
    }
}

/// Set of keys already present in a crawl
#[derive(Debug, Clone, Default)]
pub struct DedupSet {
    keys: HashSet<DedupKey>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the set from existing records
    ///
    /// Every record is keyed by its id (when present) and by its asset URL, so
    /// an id-less listing repeating a known record's asset is recognized.
    pub fn from_records(records: &[Record]) -> Self {
        let mut set = Self::new();
        for record in records {
            set.insert_keys(record.dedup_key(), record.asset_url());
        }
        set
    }

    pub fn contains(&self, key: &DedupKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns true if the listing repeats something already seen
    ///
    /// Listings with an id are compared by id; id-less listings by asset URL
    /// against every known record.
    pub fn contains_listing(&self, listing: &Listing) -> bool {
        self.contains(&listing.dedup_key())
    }

    /// Adds a listing's keys; returns false if it was already present
    pub fn insert_listing(&mut self, listing: &Listing) -> bool {
        self.insert_keys(listing.dedup_key(), &listing.asset_url)
    }

    fn insert_keys(&mut self, primary: DedupKey, asset_url: &str) -> bool {
        let inserted = self.keys.insert(primary);
        if !asset_url.trim().is_empty() {
            self.keys.insert(DedupKey::Url(asset_url.to_string()));
        }
        inserted
    }

    /// Number of keys held (ids and asset URLs)
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
