use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

/// Identity of a harvested collection: a seller's storefront, a keyword
/// search, or a keyword search within one seller's listings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionKey {
    seller: Option<String>,
    keyword: Option<String>,
}

impl CollectionKey {
    /// Creates a collection key; blank values count as absent
    ///
    /// # Returns
    ///
    /// * `Ok(CollectionKey)` - At least one of seller/keyword is present
    /// * `Err(UrlError::EmptyCollection)` - Neither is present
    pub fn new(seller: Option<&str>, keyword: Option<&str>) -> UrlResult<Self> {
        let seller = seller
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let keyword = keyword
            .map(|k| k.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|k| !k.is_empty());

        if seller.is_none() && keyword.is_none() {
            return Err(UrlError::EmptyCollection);
        }

        Ok(Self { seller, keyword })
    }

    pub fn seller(&self) -> Option<&str> {
        self.seller.as_deref()
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    /// Folder name for this collection's checkpoint and downloads
    ///
    /// The seller name wins when both are present; a keyword has its spaces
    /// replaced by underscores. Characters that could escape the output root
    /// are dropped.
    pub fn directory_name(&self) -> String {
        let raw = match (&self.seller, &self.keyword) {
            (Some(seller), _) => seller.as_str(),
            (None, Some(keyword)) => keyword.as_str(),
            (None, None) => "",
        };
        let name: String = raw
            .chars()
            .filter_map(|c| match c {
                c if c.is_whitespace() => Some('_'),
                c if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
                _ => None,
            })
            .collect();

        if name.is_empty() || name.chars().all(|c| c == '.') {
            "collection".to_string()
        } else {
            name
        }
    }

    /// Builds the locator for one result page of this collection
    pub fn page(&self, page: u32, page_size: Option<u32>) -> PageLocator {
        PageLocator {
            collection: self.clone(),
            page,
            page_size,
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.seller, &self.keyword) {
            (Some(seller), Some(keyword)) => write!(f, "seller '{}' / keyword '{}'", seller, keyword),
            (Some(seller), None) => write!(f, "seller '{}'", seller),
            (None, Some(keyword)) => write!(f, "keyword '{}'", keyword),
            (None, None) => write!(f, "<empty>"),
        }
    }
}

/// Addresses one result page of a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocator {
    pub collection: CollectionKey,
    /// 1-based page number
    pub page: u32,
    pub page_size: Option<u32>,
}

impl PageLocator {
    /// Renders the locator as a search URL against the given endpoint
    ///
    /// # Examples
    ///
    /// ```
    /// use shelf_harvest::url::CollectionKey;
    ///
    /// let key = CollectionKey::new(Some("acme"), Some("red shoes")).unwrap();
    /// let url = key.page(3, None).to_url("https://www.ebay.com/sch/i.html").unwrap();
    /// assert_eq!(
    ///     url.as_str(),
    ///     "https://www.ebay.com/sch/i.html?_ssn=acme&_nkw=red+shoes&_pgn=3"
    /// );
    /// ```
    pub fn to_url(&self, search_url: &str) -> UrlResult<Url> {
        let mut url = Url::parse(search_url).map_err(|e| UrlError::Parse(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        {
            let mut query = url.query_pairs_mut();
            if let Some(seller) = self.collection.seller() {
                query.append_pair("_ssn", seller);
            }
            if let Some(keyword) = self.collection.keyword() {
                query.append_pair("_nkw", keyword);
            }
            query.append_pair("_pgn", &self.page.to_string());
            if let Some(size) = self.page_size {
                query.append_pair("_ipg", &size.to_string());
            }
        }

        Ok(url)
    }
}
