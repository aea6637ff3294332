//! Brave Search client used by the search agent's tool step.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const BRAVE_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave rejects queries longer than this many characters.
const MAX_QUERY_CHARS: usize = 400;

#[derive(Debug, Error)]
pub enum WebSearchError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search API error ({status}): {body}")]
    Status { status: u16, body: String },
}

/// One web hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Web search backed by the Brave Search API.
#[derive(Clone)]
pub struct WebSearch {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl WebSearch {
    /// Returns `None` if `BRAVE_API_KEY` is not set.
    pub fn from_env(client: reqwest::Client) -> Option<Self> {
        let api_key = std::env::var("BRAVE_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())?;
        Some(Self::new(client, api_key, BRAVE_ENDPOINT))
    }

    pub fn new(client: reqwest::Client, api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    pub async fn search(&self, query: &str, count: u32) -> Result<Vec<WebResult>, WebSearchError> {
        let query: String = query.chars().take(MAX_QUERY_CHARS).collect();
        let count = count.clamp(1, 20).to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query.as_str()), ("count", count.as_str())])
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(WebSearchError::Status { status, body });
        }

        let body: BraveSearchResponse = response.json().await?;
        Ok(body.web.map(|w| w.results).unwrap_or_default())
    }
}

/// Render results as a numbered list for the model.
pub(crate) fn format_results(results: &[WebResult]) -> String {
    let mut output = String::new();
    for (i, result) in results.iter().enumerate() {
        let desc = result.description.as_deref().unwrap_or("No description");
        let _ = writeln!(
            output,
            "{}. {}\n   {}\n   {}\n",
            i + 1,
            result.title,
            result.url,
            desc
        );
    }
    output
}

#[derive(Deserialize)]
struct BraveSearchResponse {
    web: Option<WebResults>,
}

#[derive(Deserialize)]
struct WebResults {
    results: Vec<WebResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn search_parses_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "rust"))
            .and(query_param("count", "3"))
            .and(header("X-Subscription-Token", "key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "web": {"results": [
                    {"title": "Rust", "url": "https://rust-lang.org", "description": "lang"}
                ]}
            })))
            .mount(&server)
            .await;

        let search = WebSearch::new(reqwest::Client::new(), "key", server.uri());
        let results = search.search("rust", 3).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://rust-lang.org");
    }

    #[tokio::test]
    async fn missing_web_section_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let search = WebSearch::new(reqwest::Client::new(), "key", server.uri());
        assert!(search.search("anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let search = WebSearch::new(reqwest::Client::new(), "key", server.uri());
        let err = search.search("q", 5).await.unwrap_err();
        assert!(matches!(err, WebSearchError::Status { status: 401, .. }));
    }

    #[test]
    fn format_results_numbered_list() {
        let results = vec![
            WebResult {
                title: "First".to_string(),
                url: "https://example.com/1".to_string(),
                description: Some("First description".to_string()),
            },
            WebResult {
                title: "Second".to_string(),
                url: "https://example.com/2".to_string(),
                description: None,
            },
        ];

        let output = format_results(&results);
        assert!(output.contains("1. First"));
        assert!(output.contains("First description"));
        assert!(output.contains("2. Second"));
        assert!(output.contains("No description"));
    }
}
