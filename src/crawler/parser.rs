//! HTML extraction strategies for storefront result pages
//!
//! Result pages come in more than one markup shape. Each shape is handled by
//! an `ExtractionStrategy`; the page extractor tries them in order.
//!
//! # Item list (`li.s-item`)
//!
//! - id: digits of the `/itm/<id>` segment of the first listing link
//! - title: text of `.s-item__title`
//! - image: `img` `data-src`, else `src`
//! - listings without an id, or with the promo placeholder id, are dropped
//!
//! # Card grid (`li.s-card`, `div.s-card`)
//!
//! - id: the `data-listingid` attribute, else the `/itm/<id>` link segment
//! - title: text of `.s-card__title`
//! - image: as above
//! - cards without an id are kept as provisional listings

use crate::state::Listing;
use crate::url::normalize_asset_url;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static ITEM_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/itm/(?:[^/?#]*/)?(\d+)").expect("valid item id pattern"));

static ITEM_ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li.s-item").expect("valid selector"));
static ITEM_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".s-item__title").expect("valid selector"));
static CARD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li.s-card, div.s-card").expect("valid selector"));
static CARD_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".s-card__title").expect("valid selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("valid selector"));

/// Id the storefront uses for its injected promo listing
const PLACEHOLDER_ID: &str = "123456";

/// Badge text some layouts prepend to fresh listing titles
const NEW_LISTING_BADGE: &str = "New Listing";

/// One way of reading listings out of a parsed result page
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Returns every listing recognized on the page, in page order
    fn extract(&self, document: &Html) -> Vec<Listing>;
}

/// Classic list layout: one `li.s-item` per listing
#[derive(Debug, Default, Clone, Copy)]
pub struct ItemListStrategy;

impl ExtractionStrategy for ItemListStrategy {
    fn name(&self) -> &'static str {
        "item-list"
    }

    fn extract(&self, document: &Html) -> Vec<Listing> {
        let mut listings = Vec::new();

        for row in document.select(&ITEM_ROW) {
            let Some(id) = first_link(&row).and_then(|href| item_id(&href)) else {
                tracing::debug!("Skipping item row without listing id");
                continue;
            };
            if id == PLACEHOLDER_ID {
                continue;
            }

            let title = text_of(&row, &ITEM_TITLE);
            let image = image_url(&row).unwrap_or_default();
            listings.push(Listing::new(Some(id), image, title));
        }

        listings
    }
}

/// Card grid layout used by newer storefront pages
#[derive(Debug, Default, Clone, Copy)]
pub struct CardGridStrategy;

impl ExtractionStrategy for CardGridStrategy {
    fn name(&self) -> &'static str {
        "card-grid"
    }

    fn extract(&self, document: &Html) -> Vec<Listing> {
        let mut listings = Vec::new();

        for card in document.select(&CARD) {
            let id = card
                .value()
                .attr("data-listingid")
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .or_else(|| first_link(&card).and_then(|href| item_id(&href)));

            let image = image_url(&card);
            if id.is_none() && image.is_none() {
                tracing::warn!("Skipping card with neither a listing id nor an image");
                continue;
            }

            let title = text_of(&card, &CARD_TITLE);
            listings.push(Listing::new(id, image.unwrap_or_default(), title));
        }

        listings
    }
}

/// The default strategy order: item list first, card grid as fallback
pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![Box::new(ItemListStrategy), Box::new(CardGridStrategy)]
}

/// Pulls the numeric listing id out of an item link
pub(crate) fn item_id(href: &str) -> Option<String> {
    ITEM_ID
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Collapses whitespace and strips a leading "New Listing" badge
pub(crate) fn clean_title(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let title = collapsed
        .strip_prefix(NEW_LISTING_BADGE)
        .unwrap_or(&collapsed)
        .trim();
    (!title.is_empty()).then(|| title.to_string())
}

fn first_link(element: &ElementRef) -> Option<String> {
    element
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains("/itm/"))
        .map(str::to_string)
}

fn text_of(element: &ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|e| clean_title(&e.text().collect::<String>()))
}

fn image_url(element: &ElementRef) -> Option<String> {
    let img = element.select(&IMAGE).next()?;
    ["data-src", "src"]
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(str::trim)
        .find(|src| !src.is_empty() && !src.starts_with("data:"))
        .map(normalize_asset_url)
}
