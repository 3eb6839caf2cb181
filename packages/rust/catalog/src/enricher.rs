//! Per-key description lookup.

use bookadvisor_shared::{CatalogConfig, ELLIPSIS, MAX_DESCRIPTION_CHARS, Result, single_line};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::fetch_json;

/// The slice of a detail payload we care about.
#[derive(Debug, Deserialize)]
struct WorkDetail {
    #[serde(default)]
    description: Option<DescriptionField>,
}

/// The catalog sends descriptions either as a bare string or as a typed text
/// object (`{"type": "/type/text", "value": "..."}`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DescriptionField {
    Plain(String),
    Typed {
        #[serde(default)]
        value: String,
    },
}

impl DescriptionField {
    fn into_text(self) -> String {
        match self {
            Self::Plain(text) => text,
            Self::Typed { value } => value,
        }
    }
}

/// Fetches and truncates the description behind a catalog key.
#[derive(Debug, Clone)]
pub struct DescriptionEnricher {
    client: Client,
    detail_base_url: String,
    detail_suffix: String,
    max_chars: usize,
}

impl DescriptionEnricher {
    /// Create an enricher with its own HTTP connection pool.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        Ok(Self::with_client(crate::build_client(config.timeout_secs)?, config))
    }

    /// Create an enricher sharing an existing HTTP connection pool.
    pub fn with_client(client: Client, config: &CatalogConfig) -> Self {
        Self {
            client,
            detail_base_url: config.detail_base_url.clone(),
            detail_suffix: config.detail_suffix.clone(),
            max_chars: config.description_max_chars.min(MAX_DESCRIPTION_CHARS),
        }
    }

    /// Return the (possibly truncated) description for `key`.
    ///
    /// A blank key, or one that is not a catalog path (leading `/`), returns
    /// `""` without touching the network. Every failure also returns `""`;
    /// one bad lookup never aborts the caller's batch. Line breaks are folded
    /// into spaces before truncation.
    pub async fn enrich(&self, key: &str) -> String {
        if key.trim().is_empty() {
            return String::new();
        }
        if !key.starts_with('/') {
            debug!(key, "key is not a catalog path, skipping lookup");
            return String::new();
        }

        match self.fetch_description(key).await {
            Ok(Some(text)) => truncate_description(&single_line(&text), self.max_chars),
            Ok(None) => {
                debug!(key, "detail payload has no description");
                String::new()
            }
            Err(e) => {
                debug!(key, error = %e, "description lookup failed");
                String::new()
            }
        }
    }

    async fn fetch_description(&self, key: &str) -> Result<Option<String>> {
        let url = self.detail_url(key);
        let detail: WorkDetail = fetch_json(&self.client, &url).await?;
        Ok(detail.description.map(DescriptionField::into_text))
    }

    fn detail_url(&self, key: &str) -> String {
        format!("{}{key}{}", self.detail_base_url, self.detail_suffix)
    }
}

/// Keep the first `max_chars` characters of `text`, appending `...` when
/// anything was cut.
pub fn truncate_description(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{any, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/json/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn enricher_for(server: &MockServer) -> DescriptionEnricher {
        DescriptionEnricher::new(&CatalogConfig::with_base_url(&server.uri())).unwrap()
    }

    #[test]
    fn truncate_short_text_unchanged() {
        assert_eq!(truncate_description("short", 150), "short");
        let exact = "x".repeat(150);
        assert_eq!(truncate_description(&exact, 150), exact);
    }

    #[test]
    fn truncate_long_text() {
        let long = "a".repeat(200);
        let result = truncate_description(&long, 150);
        assert_eq!(result.chars().count(), 153);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let long = "è".repeat(151);
        let result = truncate_description(&long, 150);
        assert_eq!(result.chars().count(), 153);
        assert!(result.starts_with("èè"));
    }

    #[test]
    fn detail_url_appends_key_and_suffix() {
        let enricher = DescriptionEnricher::new(&CatalogConfig::default()).unwrap();
        assert_eq!(
            enricher.detail_url("/works/OL27482W"),
            "https://openlibrary.org/works/OL27482W.json"
        );
    }

    #[tokio::test]
    async fn blank_key_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let enricher = enricher_for(&server);
        assert_eq!(enricher.enrich("").await, "");
        assert_eq!(enricher.enrich("   ").await, "");
    }

    #[tokio::test]
    async fn non_path_key_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let enricher = enricher_for(&server);
        assert_eq!(enricher.enrich("works/OL1W").await, "");
        assert_eq!(enricher.enrich("@evil.example/x").await, "");
    }

    #[tokio::test]
    async fn multi_paragraph_description_becomes_one_line() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/works/OL5W.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({ "description": "Para one.\r\n\r\nPara two." }),
            ))
            .mount(&server)
            .await;

        assert_eq!(
            enricher_for(&server).enrich("/works/OL5W").await,
            "Para one. Para two."
        );
    }

    #[test]
    fn oversized_max_chars_is_capped() {
        let mut config = CatalogConfig::default();
        config.description_max_chars = 1000;
        let enricher = DescriptionEnricher::new(&config).unwrap();
        assert_eq!(enricher.max_chars, MAX_DESCRIPTION_CHARS);
    }

    #[tokio::test]
    async fn plain_string_description() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/works/OL1W.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "description": "A plain description." })),
            )
            .mount(&server)
            .await;

        assert_eq!(enricher_for(&server).enrich("/works/OL1W").await, "A plain description.");
    }

    #[tokio::test]
    async fn typed_description_is_normalized() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/works/OL27482W.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("work.fixture.json")))
            .mount(&server)
            .await;

        let description = enricher_for(&server).enrich("/works/OL27482W").await;
        assert!(description.starts_with("Bilbo Baggins"));
        assert!(!description.ends_with("..."));
    }

    #[tokio::test]
    async fn long_description_is_truncated() {
        let server = MockServer::start().await;
        let long = "d".repeat(200);

        Mock::given(method("GET"))
            .and(path("/works/OL2W.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "description": long })),
            )
            .mount(&server)
            .await;

        let description = enricher_for(&server).enrich("/works/OL2W").await;
        assert_eq!(description.chars().count(), 153);
        assert!(description.ends_with("..."));
    }

    #[tokio::test]
    async fn missing_description_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/works/OL3W.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "title": "x" })))
            .mount(&server)
            .await;

        assert_eq!(enricher_for(&server).enrich("/works/OL3W").await, "");
    }

    #[tokio::test]
    async fn failed_lookup_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert_eq!(enricher_for(&server).enrich("/works/OL404W").await, "");
    }
}
