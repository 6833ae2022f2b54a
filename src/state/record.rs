/// Catalog record definitions
///
/// A `Listing` is what a page extractor sees on a result page. Once the crawl
/// engine accepts it, it is tagged with its page number and becomes an
/// immutable `Record`.
use std::fmt;

/// Key used to reject already-seen listings
///
/// Listings carrying an id are keyed by it; listings whose extraction lost the
/// id fall back to their asset URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Id(String),
    Url(String),
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id:{}", id),
            Self::Url(url) => write!(f, "url:{}", url),
        }
    }
}

fn dedup_key_for(id: Option<&str>, asset_url: &str) -> DedupKey {
    match id {
        Some(id) => DedupKey::Id(id.to_string()),
        None => DedupKey::Url(asset_url.to_string()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A listing extracted from one result page, not yet placed in a checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub id: Option<String>,
    pub asset_url: String,
    pub label: Option<String>,
}

impl Listing {
    /// Creates a listing; blank ids and labels count as absent
    pub fn new(id: Option<String>, asset_url: impl Into<String>, label: Option<String>) -> Self {
        Self {
            id: non_blank(id),
            asset_url: asset_url.into(),
            label: non_blank(label),
        }
    }

    pub fn dedup_key(&self) -> DedupKey {
        dedup_key_for(self.id.as_deref(), &self.asset_url)
    }

    /// Tags the listing with the page it was discovered on
    pub fn at_page(self, page: u32) -> Record {
        Record {
            id: self.id,
            asset_url: self.asset_url,
            label: self.label,
            page,
        }
    }
}

/// One catalog entry as persisted in a checkpoint
///
/// Fields are read-only; a record never changes after it has been accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: Option<String>,
    asset_url: String,
    label: Option<String>,
    page: u32,
}

impl Record {
    /// Creates a record discovered on `page` (1-based)
    pub fn new(
        id: Option<String>,
        asset_url: impl Into<String>,
        label: Option<String>,
        page: u32,
    ) -> Self {
        Listing::new(id, asset_url, label).at_page(page)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn asset_url(&self) -> &str {
        &self.asset_url
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns true if extraction could not recover a listing id
    pub fn is_provisional(&self) -> bool {
        self.id.is_none()
    }

    pub fn dedup_key(&self) -> DedupKey {
        dedup_key_for(self.id.as_deref(), &self.asset_url)
    }
}
