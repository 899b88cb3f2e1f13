use super::{SearchProvider, SearchRecord, SearchRequest};
use crate::config::HttpSettings;
use crate::credentials::{resolve_api_key, CredentialStore};
use crate::error::{BrowseError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

pub const EXA_BASE_URL: &str = "https://api.exa.ai";

/// Option keys that the search endpoint expects inside the `contents` object
/// rather than at the top level of the request body.
const CONTENT_KEYS: &[&str] = &["text", "highlights", "summary", "livecrawl", "subpages", "extras"];

/// Exa search-and-contents client.
pub struct ExaClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ExaClient {
    pub fn new(api_key: impl Into<String>, http: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.as_str())
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()
            .map_err(|e| BrowseError::Internal(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: EXA_BASE_URL.to_string(),
        })
    }

    /// Build from stored credentials or `EXA_API_KEY`.
    pub fn from_store(store: &dyn CredentialStore, http: &HttpSettings) -> Result<Self> {
        let key = resolve_api_key(store, "exa").ok_or_else(|| {
            BrowseError::Configuration(
                "EXA_API_KEY not configured: set EXA_API_KEY or run 'exabrowse config set exa'"
                    .into(),
            )
        })?;
        Self::new(key, http)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| BrowseError::Configuration(e.to_string()))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

/// Translate a [`SearchRequest`] into the `/search` request body.
pub fn build_search_body(request: &SearchRequest) -> Value {
    let mut body = Map::new();
    let mut contents = Map::new();
    body.insert("query".to_string(), json!(request.query));

    for (key, value) in &request.options {
        if CONTENT_KEYS.contains(&key.as_str()) {
            contents.insert(key.clone(), value.clone());
        } else if key == "contents" {
            if let Some(obj) = value.as_object() {
                for (k, v) in obj {
                    contents.insert(k.clone(), v.clone());
                }
            }
        } else {
            body.insert(key.clone(), value.clone());
        }
    }

    if !contents.is_empty() {
        body.insert("contents".to_string(), Value::Object(contents));
    }
    Value::Object(body)
}

#[derive(Debug, Deserialize)]
struct ExaSearchResponse {
    results: Vec<SearchRecord>,
}

/// Parse a `/search` response body into records.
pub fn parse_search_response(body: &str) -> Result<Vec<SearchRecord>> {
    let parsed: ExaSearchResponse = serde_json::from_str(body)
        .map_err(|e| BrowseError::provider("Exa", format!("malformed response: {}", e)))?;
    let total = parsed.results.len();
    let records: Vec<SearchRecord> = parsed
        .results
        .into_iter()
        .filter(|r| !r.url.trim().is_empty())
        .collect();
    if records.len() < total {
        tracing::debug!(dropped = total - records.len(), "Dropped records without a URL");
    }
    Ok(records)
}

#[async_trait]
impl SearchProvider for ExaClient {
    fn name(&self) -> &'static str {
        "Exa"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchRecord>> {
        let body = build_search_body(request);
        tracing::debug!(query = %request.query, "Executing Exa search");

        let resp = self
            .client
            .post(format!("{}/search", self.base_url))
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(BrowseError::HttpRequest)?;

        let status = resp.status();
        let text = resp.text().await.map_err(BrowseError::HttpRequest)?;

        if !status.is_success() {
            return Err(BrowseError::provider(
                "Exa",
                format!("{} - {}", status, text),
            ));
        }

        parse_search_response(&text)
    }
}
