//! Narrow interfaces to the external services the application depends on.
//!
//! Each provider is a trait with one HTTP implementation. Everything above this
//! layer talks to the traits only, so tests inject in-process doubles.

pub mod chat_completions;
pub mod exa;
pub mod gbif;
pub mod iucn;
pub mod stripe;
pub mod wikidata;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub use chat_completions::ChatCompletionsClient;
pub use exa::ExaClient;
pub use gbif::GbifClient;
pub use iucn::IucnClient;
pub use stripe::StripeClient;
pub use wikidata::WikidataClient;

/// One record returned by the search/content provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Empty when the provider sent no URL; such records are dropped on parse.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    /// Extracted page text, present only when full content was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// ISO-8601 timestamp or date as reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SearchRecord {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_published_date(mut self, date: impl Into<String>) -> Self {
        self.published_date = Some(date.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single search call: the query plus provider options in the provider's
/// own wire vocabulary (`type`, `numResults`, `includeDomains`, `text`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            options: Map::new(),
        }
    }

    /// Set one option, replacing any previous value.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.options.insert(key.to_string(), value.into());
    }

    /// Merge `overrides` on top of the current options; overrides win.
    pub fn merge(&mut self, overrides: &Map<String, Value>) {
        for (k, v) in overrides {
            self.options.insert(k.clone(), v.clone());
        }
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Human-readable provider name used in error messages.
    fn name(&self) -> &'static str;

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchRecord>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    /// Model override; the provider's default is used when `None`.
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask the provider to constrain output to a JSON object.
    pub json_object: bool,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the assistant's raw text reply.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntentRequest {
    pub amount_cents: u64,
    pub currency: String,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Creates a payment intent and returns its client secret.
    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<String>;
}

// ============================================================================
// Species data
// ============================================================================

/// One knowledge-base search hit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaxonHit {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A knowledge-base entity with its English label and description and the
/// value of its taxon-name claim, if it has one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonEntity {
    pub id: String,
    pub label: String,
    pub description: String,
    pub taxon_name: Option<String>,
}

#[async_trait]
pub trait TaxonomyProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search_entities(&self, query: &str) -> Result<Vec<TaxonHit>>;

    /// Entities in the order of `ids`. Ids the provider doesn't know are skipped.
    async fn get_entities(&self, ids: &[String]) -> Result<Vec<TaxonEntity>>;
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommonName {
    #[serde(default)]
    pub name: Option<String>,
}

/// Reference to one published assessment of a taxon.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssessmentRef {
    pub assessment_id: u64,
    #[serde(default, alias = "year_published")]
    pub year: Option<Value>,
    #[serde(default)]
    pub scopes: Vec<Value>,
}

impl AssessmentRef {
    /// Assessment year, whether sent as a number or a numeric string.
    pub fn year(&self) -> Option<u32> {
        match self.year.as_ref()? {
            Value::Number(n) => n.as_u64().and_then(|y| u32::try_from(y).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_global(&self) -> bool {
        self.scopes.iter().any(|scope| {
            let description = scope.get("description");
            description.and_then(|d| d.as_str()) == Some("Global")
                || description.and_then(|d| d.get("en")).and_then(|d| d.as_str())
                    == Some("Global")
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RedListTaxon {
    #[serde(default)]
    pub taxon_id: Option<u64>,
    #[serde(default)]
    pub sis_taxon_id: Option<u64>,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default, alias = "kingdom_name")]
    pub kingdom: Option<String>,
    #[serde(default)]
    pub common_names: Vec<CommonName>,
    #[serde(default)]
    pub assessments: Vec<AssessmentRef>,
}

#[async_trait]
pub trait RedListProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn taxa_by_name(&self, scientific_name: &str) -> Result<Vec<RedListTaxon>>;

    /// The full assessment document, left loosely typed.
    async fn assessment(&self, assessment_id: u64) -> Result<Value>;
}

/// One occurrence record as the provider reports it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOccurrence {
    #[serde(default)]
    pub decimal_latitude: Option<f64>,
    #[serde(default)]
    pub decimal_longitude: Option<f64>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub country: Option<String>,
}

#[async_trait]
pub trait OccurrenceProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Backbone taxon key for a scientific name, if it matches one.
    async fn match_taxon(&self, name: &str) -> Result<Option<u64>>;

    async fn occurrences(&self, taxon_key: u64, limit: u32) -> Result<Vec<RawOccurrence>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assessment_year_and_scope_are_lenient() {
        let a: AssessmentRef = serde_json::from_value(json!({
            "assessment_id": 7,
            "year_published": "2019",
            "scopes": [{"description": {"en": "Global"}}]
        }))
        .unwrap();
        assert_eq!(a.year(), Some(2019));
        assert!(a.is_global());

        let b: AssessmentRef = serde_json::from_value(json!({
            "assessment_id": 8,
            "year": 2021,
            "scopes": [{"description": "Europe"}]
        }))
        .unwrap();
        assert_eq!(b.year(), Some(2021));
        assert!(!b.is_global());
    }

    #[test]
    fn record_parses_provider_shape() {
        let record: SearchRecord = serde_json::from_value(json!({
            "id": "https://example.com/a",
            "title": null,
            "url": "https://example.com/a",
            "publishedDate": "2024-06-01T00:00:00.000Z",
            "author": "Jane",
            "score": 0.42,
            "image": "ignored"
        }))
        .unwrap();
        assert_eq!(record.title, "");
        assert_eq!(record.published_date.as_deref(), Some("2024-06-01T00:00:00.000Z"));
        assert_eq!(record.author.as_deref(), Some("Jane"));
        assert!(record.text.is_none());
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = SearchRecord::new("T", "https://x").with_published_date("2024-01-01");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["publishedDate"], "2024-01-01");
        assert!(value.get("text").is_none());
    }

    #[test]
    fn request_merge_overrides_existing_keys() {
        let mut request = SearchRequest::new("bees")
            .with("numResults", 10)
            .with("type", "auto");
        let overrides = json!({"numResults": 3, "startPublishedDate": "2024-01-01"});
        request.merge(overrides.as_object().unwrap());
        assert_eq!(request.option("numResults"), Some(&json!(3)));
        assert_eq!(request.option("type"), Some(&json!("auto")));
        assert_eq!(request.option("startPublishedDate"), Some(&json!("2024-01-01")));
    }
}
