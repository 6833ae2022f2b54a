//! Integration tests for Shelf-Harvest
//!
//! These tests run the crawler and the download pool against wiremock
//! servers and real temporary directories.

mod crawl_tests;
mod download_tests;
