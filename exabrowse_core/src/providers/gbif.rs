use super::{OccurrenceProvider, RawOccurrence};
use crate::config::HttpSettings;
use crate::error::{BrowseError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const GBIF_BASE_URL: &str = "https://api.gbif.org/v1";

/// GBIF species-match and occurrence-search client. Needs no credentials.
pub struct GbifClient {
    client: Client,
    base_url: String,
}

impl GbifClient {
    pub fn new(http: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.as_str())
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()
            .map_err(|e| BrowseError::Internal(e.to_string()))?;
        Ok(Self {
            client,
            base_url: GBIF_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<String> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(params)
            .send()
            .await
            .map_err(BrowseError::HttpRequest)?;

        let status = resp.status();
        let text = resp.text().await.map_err(BrowseError::HttpRequest)?;
        if !status.is_success() {
            return Err(BrowseError::provider("GBIF", format!("{} - {}", status, text)));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchResponse {
    #[serde(default)]
    usage_key: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OccurrencePage {
    #[serde(default)]
    results: Vec<RawOccurrence>,
}

pub fn parse_usage_key(body: &str) -> Result<Option<u64>> {
    let parsed: MatchResponse = serde_json::from_str(body)
        .map_err(|e| BrowseError::provider("GBIF", format!("malformed response: {}", e)))?;
    Ok(parsed.usage_key)
}

pub fn parse_occurrences(body: &str) -> Result<Vec<RawOccurrence>> {
    let parsed: OccurrencePage = serde_json::from_str(body)
        .map_err(|e| BrowseError::provider("GBIF", format!("malformed response: {}", e)))?;
    Ok(parsed.results)
}

#[async_trait]
impl OccurrenceProvider for GbifClient {
    fn name(&self) -> &'static str {
        "GBIF"
    }

    async fn match_taxon(&self, name: &str) -> Result<Option<u64>> {
        let body = self
            .get("/species/match", &[("name", name.to_string())])
            .await?;
        parse_usage_key(&body)
    }

    async fn occurrences(&self, taxon_key: u64, limit: u32) -> Result<Vec<RawOccurrence>> {
        tracing::debug!(taxon_key, limit, "Searching GBIF occurrences");
        let body = self
            .get(
                "/occurrence/search",
                &[
                    ("taxonKey", taxon_key.to_string()),
                    ("hasCoordinate", "true".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        parse_occurrences(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_key_is_optional() {
        assert_eq!(parse_usage_key(r#"{"usageKey":5219404,"matchType":"EXACT"}"#).unwrap(), Some(5219404));
        assert_eq!(parse_usage_key(r#"{"matchType":"NONE"}"#).unwrap(), None);
    }

    #[test]
    fn parses_occurrence_page() {
        let records = parse_occurrences(
            r#"{"offset":0,"results":[{"decimalLatitude":-1.5,"decimalLongitude":35.2,"year":2020,"country":"Kenya"},{"decimalLatitude":2.0}]}"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].decimal_longitude, Some(35.2));
        assert!(records[1].decimal_longitude.is_none());
    }
}
