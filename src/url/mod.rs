//! URL handling module for Shelf-Harvest
//!
//! This module provides:
//! - Asset URL normalization (thumbnail to full-resolution rewrite)
//! - Collection identity (`CollectionKey`) and its on-disk folder name
//! - Page locators that render to storefront search URLs

mod locator;
mod normalize;

pub use locator::{CollectionKey, PageLocator};
pub use normalize::normalize_asset_url;
