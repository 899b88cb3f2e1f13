use super::{TaxonEntity, TaxonHit, TaxonomyProvider};
use crate::config::HttpSettings;
use crate::error::{BrowseError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const WIKIDATA_API_URL: &str = "https://www.wikidata.org/w/api.php";

/// Property holding a taxon's scientific name.
const TAXON_NAME_PROPERTY: &str = "P225";

const SEARCH_LIMIT: u32 = 10;

/// Wikidata entity search and lookup client. Needs no credentials.
pub struct WikidataClient {
    client: Client,
    api_url: String,
}

impl WikidataClient {
    pub fn new(http: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.as_str())
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()
            .map_err(|e| BrowseError::Internal(e.to_string()))?;
        Ok(Self {
            client,
            api_url: WIKIDATA_API_URL.to_string(),
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<String> {
        let resp = self
            .client
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .map_err(BrowseError::HttpRequest)?;

        let status = resp.status();
        let text = resp.text().await.map_err(BrowseError::HttpRequest)?;
        if !status.is_success() {
            return Err(BrowseError::provider("Wikidata", format!("{} - {}", status, text)));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    search: Vec<TaxonHit>,
}

/// Parse a `wbsearchentities` response.
pub fn parse_search_hits(body: &str) -> Result<Vec<TaxonHit>> {
    let parsed: SearchResponse = serde_json::from_str(body)
        .map_err(|e| BrowseError::provider("Wikidata", format!("malformed response: {}", e)))?;
    Ok(parsed.search)
}

/// Parse a `wbgetentities` response, keeping the order of `ids`.
pub fn parse_entities(body: &str, ids: &[String]) -> Result<Vec<TaxonEntity>> {
    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| BrowseError::provider("Wikidata", format!("malformed response: {}", e)))?;
    let Some(entities) = parsed.get("entities").and_then(|e| e.as_object()) else {
        return Ok(Vec::new());
    };

    Ok(ids
        .iter()
        .filter_map(|id| entities.get(id).map(|entity| to_entity(id, entity)))
        .collect())
}

fn to_entity(id: &str, entity: &Value) -> TaxonEntity {
    let english = |field: &str| {
        entity
            .pointer(&format!("/{}/en/value", field))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };
    TaxonEntity {
        id: id.to_string(),
        label: english("labels"),
        description: english("descriptions"),
        taxon_name: taxon_name_claim(entity),
    }
}

/// First taxon-name claim that carries a non-empty value.
pub fn taxon_name_claim(entity: &Value) -> Option<String> {
    entity
        .get("claims")?
        .get(TAXON_NAME_PROPERTY)?
        .as_array()?
        .first()?
        .pointer("/mainsnak/datavalue/value")
        .and_then(|v| v.as_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl TaxonomyProvider for WikidataClient {
    fn name(&self) -> &'static str {
        "Wikidata"
    }

    async fn search_entities(&self, query: &str) -> Result<Vec<TaxonHit>> {
        tracing::debug!(query, "Searching Wikidata entities");
        let limit = SEARCH_LIMIT.to_string();
        let body = self
            .get(&[
                ("action", "wbsearchentities"),
                ("search", query),
                ("language", "en"),
                ("type", "item"),
                ("limit", limit.as_str()),
                ("format", "json"),
                ("origin", "*"),
            ])
            .await?;
        parse_search_hits(&body)
    }

    async fn get_entities(&self, ids: &[String]) -> Result<Vec<TaxonEntity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.join("|");
        let body = self
            .get(&[
                ("action", "wbgetentities"),
                ("ids", joined.as_str()),
                ("props", "claims|labels|descriptions"),
                ("languages", "en"),
                ("format", "json"),
                ("origin", "*"),
            ])
            .await?;
        parse_entities(&body, ids)
    }
}
