//! HTTP fetcher for result pages
//!
//! This module handles all page requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests for result pages
//! - Error classification (status, timeout, transport, body)
//!
//! There is no retry: a failed page fetch ends the run after the checkpoint
//! has been flushed.

use crate::config::Config;
use crate::crawler::ExtractionError;
use reqwest::{redirect::Policy, Client};
use url::Url;

/// Maximum redirect hops followed for one page request
const MAX_REDIRECTS: usize = 10;

/// Builds the HTTP client used for result page requests
///
/// # Example
///
/// ```no_run
/// use shelf_harvest::config::Config;
/// use shelf_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .connect_timeout(config.crawler.connect_timeout())
        .timeout(config.crawler.request_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one page and returns its body
///
/// # Error Classification
///
/// | Condition | Error |
/// |-----------|-------|
/// | Non-2xx status | `HttpStatus` |
/// | Request or body timeout | `Timeout` |
/// | Connection / TLS / redirect failure | `Network` |
/// | Body not readable as text | `Body` |
pub async fn fetch_html(client: &Client, url: &Url) -> Result<String, ExtractionError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractionError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    response.text().await.map_err(|e| {
        if e.is_timeout() {
            ExtractionError::Timeout(url.to_string())
        } else {
            ExtractionError::Body(e.to_string())
        }
    })
}

fn classify(url: &Url, err: reqwest::Error) -> ExtractionError {
    if err.is_timeout() {
        ExtractionError::Timeout(url.to_string())
    } else {
        ExtractionError::Network(err.to_string())
    }
}
