//! Remote book catalog access: primary search and per-key description lookup.
//!
//! Both lookups are fail-soft at this crate's boundary. A failed search yields
//! no hits and a failed detail lookup yields an empty description; neither
//! surfaces an error to the caller.

pub mod client;
pub mod enricher;

use std::time::Duration;

use bookadvisor_shared::{BookAdvisorError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;

pub use client::RemoteCatalogClient;
pub use enricher::{DescriptionEnricher, truncate_description};

/// Maximum number of redirects to follow for catalog requests.
const MAX_REDIRECTS: usize = 3;

/// User-Agent string for catalog requests.
const USER_AGENT: &str = concat!("BookAdvisor/", env!("CARGO_PKG_VERSION"));

/// Build a reqwest client with appropriate settings.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| BookAdvisorError::network(format!("failed to build HTTP client: {e}")))
}

/// GET `url` and decode a successful JSON response body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| BookAdvisorError::network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(BookAdvisorError::network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| BookAdvisorError::network(format!("{url}: failed to read body: {e}")))?;

    serde_json::from_str(&body).map_err(|e| BookAdvisorError::parse(format!("{url}: {e}")))
}
