//! Request and response types for multi-channel searches.

use crate::error::{BrowseError, Result};
use crate::providers::{SearchRecord, SearchRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Provider behaviour hint for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Adaptive search, provider decides whether to recrawl.
    #[default]
    Auto,
    /// Cached content only, no live crawling.
    Fast,
}

impl SearchMode {
    /// Write the mode-derived base parameters into `request`.
    pub fn apply(&self, request: &mut SearchRequest) {
        match self {
            SearchMode::Auto => {
                request.set("type", "auto");
            }
            SearchMode::Fast => {
                request.set("type", "fast");
                request.set("livecrawl", "never");
            }
        }
    }

    /// Lenient parse used at the JSON boundary: anything but `"fast"` is auto.
    pub fn from_loose(value: Option<&str>) -> Self {
        match value {
            Some("fast") => SearchMode::Fast,
            _ => SearchMode::Auto,
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Auto => write!(f, "auto"),
            SearchMode::Fast => write!(f, "fast"),
        }
    }
}

/// A validated multi-channel search.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateQuery {
    pub query: String,
    pub mode: SearchMode,
    /// Requested channel ids; empty means "the table's default channel".
    pub channels: Vec<String>,
    /// Merged into every per-channel provider request, after channel defaults.
    pub options: Option<Map<String, Value>>,
}

impl AggregateQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            mode: SearchMode::Auto,
            channels: Vec::new(),
            options: None,
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_options(mut self, options: Map<String, Value>) -> Self {
        self.options = Some(options);
        self
    }

    /// Parse the JSON request body `{query, mode?, resultTypes?, options?}`.
    ///
    /// Only structural problems fail here; an empty query is rejected later by
    /// the aggregator so every entry point shares one check.
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: RawAggregateRequest = serde_json::from_str(body)
            .map_err(|_| BrowseError::InvalidInput("Invalid JSON body.".into()))?;
        Ok(raw.into())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAggregateRequest {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    result_types: Option<Vec<String>>,
    #[serde(default)]
    options: Option<Map<String, Value>>,
}

impl From<RawAggregateRequest> for AggregateQuery {
    fn from(raw: RawAggregateRequest) -> Self {
        Self {
            query: raw.query.map(|q| q.trim().to_string()).unwrap_or_default(),
            mode: SearchMode::from_loose(raw.mode.as_deref()),
            channels: raw.result_types.unwrap_or_default(),
            options: raw.options,
        }
    }
}

/// Outcome of one channel within a single aggregate call.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelOutcome {
    Records(Vec<SearchRecord>),
    Failed(String),
}

/// Per-channel partitioned result of one multi-channel search.
///
/// `results` only contains channels that returned at least one record, and
/// `errors` is omitted from the wire form when no channel failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResponse {
    pub mode: SearchMode,
    pub results: BTreeMap<String, Vec<SearchRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl AggregateResponse {
    pub fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            results: BTreeMap::new(),
            errors: None,
        }
    }

    /// Record one channel's outcome. Empty record lists are dropped.
    pub fn add_outcome(&mut self, channel: impl Into<String>, outcome: ChannelOutcome) {
        match outcome {
            ChannelOutcome::Records(records) if records.is_empty() => {}
            ChannelOutcome::Records(records) => {
                self.results.insert(channel.into(), records);
            }
            ChannelOutcome::Failed(message) => {
                self.errors
                    .get_or_insert_with(BTreeMap::new)
                    .insert(channel.into(), message);
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// True when every channel failed and nothing came back.
    pub fn all_failed(&self) -> bool {
        self.results.is_empty() && self.has_errors()
    }

    pub fn total_count(&self) -> usize {
        self.results.values().map(|r| r.len()).sum()
    }

    /// All records across channels, in channel-key order.
    pub fn all_records(&self) -> Vec<&SearchRecord> {
        self.results.values().flat_map(|r| r.iter()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_request() {
        let query = AggregateQuery::from_json(
            r#"{"query":"  honey bees ","mode":"fast","resultTypes":["video","news"],"options":{"numResults":3}}"#,
        )
        .unwrap();
        assert_eq!(query.query, "honey bees");
        assert_eq!(query.mode, SearchMode::Fast);
        assert_eq!(query.channels, vec!["video", "news"]);
        assert_eq!(query.options.unwrap()["numResults"], json!(3));
    }

    #[test]
    fn unknown_mode_falls_back_to_auto() {
        let query = AggregateQuery::from_json(r#"{"query":"x","mode":"turbo"}"#).unwrap();
        assert_eq!(query.mode, SearchMode::Auto);
        assert!(query.channels.is_empty());
    }

    #[test]
    fn malformed_body_is_input_error() {
        let err = AggregateQuery::from_json("{not json").unwrap_err();
        assert!(matches!(err, BrowseError::InvalidInput(_)));
    }

    #[test]
    fn fast_mode_disables_live_crawl() {
        let mut request = SearchRequest::new("q");
        SearchMode::Fast.apply(&mut request);
        assert_eq!(request.option("type"), Some(&json!("fast")));
        assert_eq!(request.option("livecrawl"), Some(&json!("never")));

        let mut request = SearchRequest::new("q");
        SearchMode::Auto.apply(&mut request);
        assert_eq!(request.option("type"), Some(&json!("auto")));
        assert!(request.option("livecrawl").is_none());
    }

    #[test]
    fn response_partitions_outcomes() {
        let mut response = AggregateResponse::new(SearchMode::Auto);
        response.add_outcome(
            "video",
            ChannelOutcome::Records(vec![SearchRecord::new("a", "https://a")]),
        );
        response.add_outcome("news", ChannelOutcome::Records(vec![]));
        response.add_outcome("social", ChannelOutcome::Failed("boom".into()));

        assert_eq!(response.results.len(), 1);
        assert!(!response.results.contains_key("news"));
        assert_eq!(response.errors.as_ref().unwrap()["social"], "boom");
        assert!(!response.all_failed());
        assert_eq!(response.total_count(), 1);
    }

    #[test]
    fn errors_field_omitted_when_empty() {
        let response = AggregateResponse::new(SearchMode::Fast);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["mode"], "fast");
        assert!(value.get("errors").is_none());
        assert_eq!(value["results"], json!({}));
    }
}
