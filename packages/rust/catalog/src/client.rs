//! Primary catalog search.

use bookadvisor_shared::{BookAdvisorError, CatalogConfig, MAX_RESULT_LIMIT, RawHit, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use url::Url;

use crate::fetch_json;

/// Search response envelope. Hits are kept as raw JSON so one malformed
/// entry does not discard its siblings.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<serde_json::Value>,
}

/// Issues the primary search request and parses hits.
#[derive(Debug, Clone)]
pub struct RemoteCatalogClient {
    client: Client,
    search_url: String,
    result_limit: usize,
}

impl RemoteCatalogClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        Ok(Self::with_client(crate::build_client(config.timeout_secs)?, config))
    }

    /// Create a client sharing an existing HTTP connection pool.
    pub fn with_client(client: Client, config: &CatalogConfig) -> Self {
        Self {
            client,
            search_url: config.search_url.clone(),
            result_limit: config.result_limit.clamp(1, MAX_RESULT_LIMIT),
        }
    }

    /// Search the catalog, returning at most `result_limit` hits in catalog
    /// order. Any failure is logged and yields an empty list.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn search(&self, query: &str) -> Vec<RawHit> {
        match self.try_search(query).await {
            Ok(hits) => {
                info!(hits = hits.len(), "catalog search complete");
                hits
            }
            Err(e) => {
                error!(error = %e, "catalog search failed");
                Vec::new()
            }
        }
    }

    /// Search the catalog, surfacing transport and parse failures.
    pub async fn try_search(&self, query: &str) -> Result<Vec<RawHit>> {
        let url = self.search_url_for(query)?;
        let response: SearchResponse = fetch_json(&self.client, url.as_str()).await?;
        Ok(parse_hits(response.docs, self.result_limit))
    }

    /// Build the search URL with `query` form-encoded into `q`.
    fn search_url_for(&self, query: &str) -> Result<Url> {
        Url::parse_with_params(&self.search_url, &[("q", query)]).map_err(|e| {
            BookAdvisorError::config(format!("invalid search_url '{}': {e}", self.search_url))
        })
    }
}

/// Keep the first `limit` docs and decode each one independently.
fn parse_hits(docs: Vec<serde_json::Value>, limit: usize) -> Vec<RawHit> {
    docs.into_iter()
        .take(limit)
        .enumerate()
        .filter_map(|(i, doc)| match serde_json::from_value::<RawHit>(doc) {
            Ok(hit) => Some(hit),
            Err(e) => {
                warn!(index = i, error = %e, "skipping malformed search hit");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/json/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn docs(count: usize) -> serde_json::Value {
        let docs: Vec<_> = (0..count)
            .map(|i| serde_json::json!({ "title": format!("Book {i}"), "key": format!("/works/OL{i}W") }))
            .collect();
        serde_json::json!({ "numFound": count, "docs": docs })
    }

    fn client_for(server: &MockServer) -> RemoteCatalogClient {
        RemoteCatalogClient::new(&CatalogConfig::with_base_url(&server.uri())).unwrap()
    }

    #[test]
    fn query_whitespace_is_plus_encoded() {
        let client = RemoteCatalogClient::new(&CatalogConfig::default()).unwrap();
        let url = client.search_url_for("the lord of the rings").unwrap();
        assert_eq!(url.query(), Some("q=the+lord+of+the+rings"));
        assert_eq!(url.path(), "/search.json");
    }

    #[test]
    fn parse_hits_skips_malformed_entries() {
        let docs = vec![
            serde_json::json!({ "title": "Good", "key": "/works/OL1W" }),
            serde_json::json!({ "title": 42 }),
            serde_json::json!({ "title": "Also good" }),
        ];
        let hits = parse_hits(docs, 10);
        let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, ["Good", "Also good"]);
    }

    #[test]
    fn parse_hits_keeps_null_title_or_key() {
        let docs = vec![
            serde_json::json!({ "title": null, "key": "/works/OL1W" }),
            serde_json::json!({ "title": "T", "key": null }),
        ];
        let hits = parse_hits(docs, 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "");
        assert_eq!(hits[0].key, "/works/OL1W");
        assert_eq!(hits[1].title, "T");
        assert_eq!(hits[1].key, "");
    }

    #[test]
    fn oversized_result_limit_is_capped() {
        let mut config = CatalogConfig::default();
        config.result_limit = 50;
        let client = RemoteCatalogClient::new(&config).unwrap();
        assert_eq!(client.result_limit, MAX_RESULT_LIMIT);
    }

    #[tokio::test]
    async fn search_maps_fixture_hits() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("q", "tolkien"))
            .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("search.fixture.json")))
            .mount(&server)
            .await;

        let hits = client_for(&server).search("tolkien").await;

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title, "The Hobbit");
        assert_eq!(hits[0].author(), "J.R.R. Tolkien");
        assert_eq!(hits[1].publish_date(), "1954");
        assert_eq!(hits[2].author(), "Unknown");
        assert_eq!(hits[2].cover_i, None);
        assert_eq!(hits[2].key, "/works/OL9999W");
    }

    #[tokio::test]
    async fn search_caps_results_in_catalog_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(docs(15)))
            .mount(&server)
            .await;

        let hits = client_for(&server).search("many books").await;

        assert_eq!(hits.len(), 10);
        for (i, hit) in hits.iter().enumerate() {
            assert_eq!(hit.title, format!("Book {i}"));
        }
    }

    #[tokio::test]
    async fn search_sends_plus_encoded_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("q", "war and peace"))
            .respond_with(ResponseTemplate::new(200).set_body_json(docs(1)))
            .expect(1)
            .mount(&server)
            .await;

        let hits = client_for(&server).search("war and peace").await;
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn search_http_error_yields_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.search("anything").await.is_empty());
        assert!(client.try_search("anything").await.is_err());
    }

    #[tokio::test]
    async fn search_invalid_payload_yields_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert!(client_for(&server).search("anything").await.is_empty());
    }

    #[tokio::test]
    async fn search_without_docs_yields_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "numFound": 0 })))
            .mount(&server)
            .await;

        let hits = client_for(&server).try_search("nothing").await.unwrap();
        assert!(hits.is_empty());
    }
}
