use super::{RedListProvider, RedListTaxon};
use crate::config::HttpSettings;
use crate::credentials::{resolve_api_key, CredentialStore};
use crate::error::{BrowseError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const IUCN_BASE_URL: &str = "https://api.iucnredlist.org/api/v4";

/// IUCN Red List v4 client.
pub struct IucnClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl IucnClient {
    pub fn new(api_key: impl Into<String>, http: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.as_str())
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()
            .map_err(|e| BrowseError::Internal(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: IUCN_BASE_URL.to_string(),
        })
    }

    /// Build from stored credentials or `IUCN_API_KEY`.
    pub fn from_store(store: &dyn CredentialStore, http: &HttpSettings) -> Result<Self> {
        let key = resolve_api_key(store, "iucn").ok_or_else(|| {
            BrowseError::Configuration(
                "IUCN_API_KEY not configured: set IUCN_API_KEY or run 'exabrowse config set iucn'"
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

    async fn get(&self, path: &str) -> Result<String> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(BrowseError::HttpRequest)?;

        let status = resp.status();
        let text = resp.text().await.map_err(BrowseError::HttpRequest)?;
        if !status.is_success() {
            return Err(BrowseError::provider("IUCN", format!("{} - {}", status, text)));
        }
        Ok(text)
    }
}

/// Path of the taxon lookup for a scientific name, percent-encoded.
pub fn taxa_path(scientific_name: &str) -> String {
    format!("/taxa/scientific_name/{}", urlencoding::encode(scientific_name))
}

#[derive(Debug, Deserialize)]
struct TaxaResponse {
    #[serde(default)]
    taxa: Vec<RedListTaxon>,
}

pub fn parse_taxa(body: &str) -> Result<Vec<RedListTaxon>> {
    let parsed: TaxaResponse = serde_json::from_str(body)
        .map_err(|e| BrowseError::provider("IUCN", format!("malformed response: {}", e)))?;
    Ok(parsed.taxa)
}

#[async_trait]
impl RedListProvider for IucnClient {
    fn name(&self) -> &'static str {
        "IUCN"
    }

    async fn taxa_by_name(&self, scientific_name: &str) -> Result<Vec<RedListTaxon>> {
        tracing::debug!(scientific_name, "Looking up Red List taxon");
        let body = self.get(&taxa_path(scientific_name)).await?;
        parse_taxa(&body)
    }

    async fn assessment(&self, assessment_id: u64) -> Result<Value> {
        let body = self.get(&format!("/assessment/{}", assessment_id)).await?;
        serde_json::from_str(&body)
            .map_err(|e| BrowseError::provider("IUCN", format!("malformed response: {}", e)))
    }
}
