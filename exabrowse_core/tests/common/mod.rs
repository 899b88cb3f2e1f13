//! In-process provider doubles shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use exabrowse_core::providers::{
    CompletionProvider, CompletionRequest, OccurrenceProvider, PaymentIntentRequest,
    PaymentProvider, RawOccurrence, RedListProvider, RedListTaxon, SearchProvider, SearchRecord,
    SearchRequest, TaxonEntity, TaxonHit, TaxonomyProvider,
};
use exabrowse_core::{BrowseError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use serde_json::Value;
use std::time::Duration;

#[derive(Clone)]
pub enum Behavior {
    Records(Vec<SearchRecord>),
    Fail(String),
    Delayed(Duration, Vec<SearchRecord>),
}

type Matcher = Box<dyn Fn(&SearchRequest) -> bool + Send + Sync>;

/// Search double. Rules are checked in insertion order; the first match decides
/// the outcome, otherwise `fallback` applies.
pub struct MockSearch {
    rules: Vec<(Matcher, Behavior)>,
    fallback: Behavior,
    calls: AtomicUsize,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::with_fallback(Behavior::Records(Vec::new()))
    }

    pub fn with_fallback(fallback: Behavior) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Match requests whose domain allow-list contains `domain`.
    pub fn on_domain(mut self, domain: &'static str, behavior: Behavior) -> Self {
        self.rules.push((
            Box::new(move |r: &SearchRequest| {
                r.option("includeDomains")
                    .and_then(|d| d.as_array())
                    .is_some_and(|d| d.iter().any(|v| v.as_str() == Some(domain)))
            }),
            behavior,
        ));
        self
    }

    pub fn on_category(mut self, category: &'static str, behavior: Behavior) -> Self {
        self.rules.push((
            Box::new(move |r: &SearchRequest| {
                r.option("category").and_then(|c| c.as_str()) == Some(category)
            }),
            behavior,
        ));
        self
    }

    pub fn on_query(mut self, fragment: &'static str, behavior: Behavior) -> Self {
        self.rules.push((
            Box::new(move |r: &SearchRequest| r.query.contains(fragment)),
            behavior,
        ));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn behavior_for(&self, request: &SearchRequest) -> Behavior {
        self.rules
            .iter()
            .find(|(matches, _)| matches(request))
            .map(|(_, b)| b.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        match self.behavior_for(request) {
            Behavior::Records(records) => Ok(records),
            Behavior::Fail(message) => Err(BrowseError::provider("Mock", message)),
            Behavior::Delayed(delay, records) => {
                tokio::time::sleep(delay).await;
                Ok(records)
            }
        }
    }
}

pub fn record(title: &str, url: &str) -> SearchRecord {
    SearchRecord::new(title, url)
}

/// Completion double returning a fixed reply and keeping every request.
pub struct MockCompletion {
    reply: std::result::Result<String, String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletion {
    fn name(&self) -> &'static str {
        "MockLLM"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply
            .clone()
            .map_err(|m| BrowseError::provider("MockLLM", m))
    }
}

#[derive(Default)]
pub struct MockPayment {
    requests: Mutex<Vec<PaymentIntentRequest>>,
}

impl MockPayment {
    pub fn requests(&self) -> Vec<PaymentIntentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProvider for MockPayment {
    fn name(&self) -> &'static str {
        "MockPay"
    }

    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(format!("pi_{}_secret", request.amount_cents))
    }
}

/// Taxonomy double. `None` for either list makes that call fail.
pub struct MockTaxonomy {
    pub hits: Option<Vec<TaxonHit>>,
    pub entities: Option<Vec<TaxonEntity>>,
    entity_requests: Mutex<Vec<Vec<String>>>,
}

impl MockTaxonomy {
    pub fn new(hits: Option<Vec<TaxonHit>>, entities: Option<Vec<TaxonEntity>>) -> Self {
        Self {
            hits,
            entities,
            entity_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn entity_requests(&self) -> Vec<Vec<String>> {
        self.entity_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaxonomyProvider for MockTaxonomy {
    fn name(&self) -> &'static str {
        "MockTaxonomy"
    }

    async fn search_entities(&self, _query: &str) -> Result<Vec<TaxonHit>> {
        self.hits
            .clone()
            .ok_or_else(|| BrowseError::provider("MockTaxonomy", "search down"))
    }

    async fn get_entities(&self, ids: &[String]) -> Result<Vec<TaxonEntity>> {
        self.entity_requests.lock().unwrap().push(ids.to_vec());
        let entities = self
            .entities
            .clone()
            .ok_or_else(|| BrowseError::provider("MockTaxonomy", "lookup down"))?;
        Ok(ids
            .iter()
            .filter_map(|id| entities.iter().find(|e| &e.id == id).cloned())
            .collect())
    }
}

pub fn taxon_hit(id: &str, description: &str) -> TaxonHit {
    TaxonHit {
        id: id.to_string(),
        label: id.to_string(),
        description: Some(description.to_string()),
    }
}

pub fn taxon_entity(id: &str, taxon_name: Option<&str>) -> TaxonEntity {
    TaxonEntity {
        id: id.to_string(),
        label: format!("{} label", id),
        description: "species".to_string(),
        taxon_name: taxon_name.map(str::to_string),
    }
}

/// Red List double. `None` makes the call fail.
pub struct MockRedList {
    pub taxa: Option<Vec<RedListTaxon>>,
    pub assessment: Option<Value>,
    names: Mutex<Vec<String>>,
    assessment_ids: Mutex<Vec<u64>>,
}

impl MockRedList {
    pub fn new(taxa: Option<Vec<RedListTaxon>>, assessment: Option<Value>) -> Self {
        Self {
            taxa,
            assessment,
            names: Mutex::new(Vec::new()),
            assessment_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.names.lock().unwrap().clone()
    }

    pub fn assessment_ids(&self) -> Vec<u64> {
        self.assessment_ids.lock().unwrap().clone()
    }
}

#[async_trait]
impl RedListProvider for MockRedList {
    fn name(&self) -> &'static str {
        "MockRedList"
    }

    async fn taxa_by_name(&self, scientific_name: &str) -> Result<Vec<RedListTaxon>> {
        self.names.lock().unwrap().push(scientific_name.to_string());
        self.taxa
            .clone()
            .ok_or_else(|| BrowseError::provider("MockRedList", "401 Unauthorized"))
    }

    async fn assessment(&self, assessment_id: u64) -> Result<Value> {
        self.assessment_ids.lock().unwrap().push(assessment_id);
        self.assessment
            .clone()
            .ok_or_else(|| BrowseError::provider("MockRedList", "500 Internal Server Error"))
    }
}

/// Occurrence double. `records: None` makes the search fail.
pub struct MockOccurrences {
    pub taxon_key: Option<u64>,
    pub records: Option<Vec<RawOccurrence>>,
    limits: Mutex<Vec<u32>>,
}

impl MockOccurrences {
    pub fn new(taxon_key: Option<u64>, records: Option<Vec<RawOccurrence>>) -> Self {
        Self {
            taxon_key,
            records,
            limits: Mutex::new(Vec::new()),
        }
    }

    pub fn limits(&self) -> Vec<u32> {
        self.limits.lock().unwrap().clone()
    }
}

#[async_trait]
impl OccurrenceProvider for MockOccurrences {
    fn name(&self) -> &'static str {
        "MockOccurrences"
    }

    async fn match_taxon(&self, _name: &str) -> Result<Option<u64>> {
        Ok(self.taxon_key)
    }

    async fn occurrences(&self, _taxon_key: u64, limit: u32) -> Result<Vec<RawOccurrence>> {
        self.limits.lock().unwrap().push(limit);
        self.records
            .clone()
            .ok_or_else(|| BrowseError::provider("MockOccurrences", "timeout"))
    }
}
