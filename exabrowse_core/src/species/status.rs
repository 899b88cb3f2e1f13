use crate::providers::{AssessmentRef, RedListProvider, RedListTaxon};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub const IUCN_SITE_URL: &str = "https://www.iucnredlist.org";

/// Assessment threats kept in the summary.
const MAX_THREATS: usize = 3;

static HTML_TAG: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"<[^>]+>").ok());
static WHITESPACE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\s+").ok());

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonSummary {
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub kingdom: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub red_list_category: String,
    pub red_list_category_name: String,
    pub population_trend: String,
    pub population_trend_name: String,
    pub population_size: Option<String>,
    pub native_countries: Vec<String>,
    pub threats: Vec<String>,
    pub iucn_url: String,
    pub year: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesStatus {
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxon: Option<TaxonSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<AssessmentSummary>,
}

impl SpeciesStatus {
    pub fn not_found() -> Self {
        Self::default()
    }
}

/// First two words of `name`: genus and species epithet.
pub fn search_name(name: &str) -> String {
    name.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}

/// Global-scope assessments first, then the most recent. Ties keep input order.
pub fn best_assessment(assessments: &[AssessmentRef]) -> Option<&AssessmentRef> {
    let mut ranked: Vec<&AssessmentRef> = assessments.iter().collect();
    ranked.sort_by(|a, b| {
        b.is_global()
            .cmp(&a.is_global())
            .then_with(|| b.year().unwrap_or(0).cmp(&a.year().unwrap_or(0)))
    });
    ranked.into_iter().next()
}

/// Replace tags with spaces and collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let mut text = html.to_string();
    if let Some(re) = HTML_TAG.as_ref() {
        text = re.replace_all(&text, " ").into_owned();
    }
    if let Some(re) = WHITESPACE.as_ref() {
        text = re.replace_all(&text, " ").into_owned();
    }
    text.trim().to_string()
}

/// A text field sent as a string, a number, or a `{"en": ...}` object.
fn text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("en").and_then(|v| v.as_str()).map(str::to_string),
        _ => None,
    };
    text.filter(|s| !s.is_empty())
}

fn is_code(value: Option<&Value>, code: i64) -> bool {
    match value {
        Some(Value::Number(n)) => n.as_i64() == Some(code),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok() == Some(code),
        _ => false,
    }
}

/// ISO2 codes of countries where the species is native and extant.
pub fn native_countries(assessment: &Value) -> Vec<String> {
    let Some(countries) = assessment
        .pointer("/geographical_range/countries")
        .and_then(|c| c.as_array())
    else {
        return Vec::new();
    };

    countries
        .iter()
        .filter(|c| {
            let native = is_code(c.get("origin"), 1)
                || text(c.get("origin_description")).as_deref() == Some("Native");
            let extant = is_code(c.get("presence"), 1)
                || text(c.get("presence_description")).as_deref() == Some("Extant");
            native && extant
        })
        .filter_map(|c| text(c.pointer("/country/iso2")))
        .collect()
}

/// Species page when a taxon id is known, otherwise a site search.
pub fn iucn_url(taxon_id: Option<u64>, assessment_id: u64, search_name: &str) -> String {
    match taxon_id.filter(|id| *id != 0) {
        Some(id) => format!("{}/species/{}/{}", IUCN_SITE_URL, id, assessment_id),
        None => format!(
            "{}/search?query={}",
            IUCN_SITE_URL,
            urlencoding::encode(search_name)
        ),
    }
}

pub fn summarize_assessment(
    assessment: &Value,
    best: &AssessmentRef,
    taxon: &RedListTaxon,
    search_name: &str,
) -> AssessmentSummary {
    let field = |pointer: &str| text(assessment.pointer(pointer));

    let threats = assessment
        .get("threats")
        .and_then(|t| t.as_array())
        .map(|threats| {
            threats
                .iter()
                .take(MAX_THREATS)
                .filter_map(|t| text(t.get("title")))
                .map(|title| strip_html(&title))
                .collect()
        })
        .unwrap_or_default();

    let taxon_id = taxon.taxon_id.filter(|id| *id != 0).or(taxon.sis_taxon_id);

    AssessmentSummary {
        red_list_category: field("/red_list_category/code").unwrap_or_else(|| "NE".into()),
        red_list_category_name: field("/red_list_category/description")
            .unwrap_or_else(|| "Not Evaluated".into()),
        population_trend: field("/population_trend/code").unwrap_or_else(|| "Unknown".into()),
        population_trend_name: field("/population_trend/description")
            .unwrap_or_else(|| "Unknown".into()),
        population_size: field("/documentation/population").map(|p| strip_html(&p)),
        native_countries: native_countries(assessment),
        threats,
        iucn_url: iucn_url(taxon_id, best.assessment_id, search_name),
        year: best.year().filter(|y| *y != 0),
    }
}

fn taxon_summary(taxon: &RedListTaxon, search_name: &str) -> TaxonSummary {
    TaxonSummary {
        scientific_name: taxon
            .scientific_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| search_name.to_string()),
        common_name: taxon
            .common_names
            .first()
            .and_then(|c| c.name.clone())
            .filter(|n| !n.is_empty()),
        kingdom: taxon.kingdom.clone().filter(|k| !k.is_empty()),
    }
}

/// Conservation status of a species by scientific name.
pub struct RedListLookup {
    provider: Arc<dyn RedListProvider>,
}

impl RedListLookup {
    pub fn new(provider: Arc<dyn RedListProvider>) -> Self {
        Self { provider }
    }

    /// `found: false` on blank input, no match, or any provider failure.
    pub async fn lookup(&self, name: &str) -> SpeciesStatus {
        let search_name = search_name(name);
        if search_name.is_empty() {
            return SpeciesStatus::not_found();
        }

        let taxa = match self.provider.taxa_by_name(&search_name).await {
            Ok(taxa) => taxa,
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "Taxon lookup failed");
                return SpeciesStatus::not_found();
            }
        };
        let Some(taxon) = taxa.first() else {
            return SpeciesStatus::not_found();
        };
        let Some(best) = best_assessment(&taxon.assessments) else {
            return SpeciesStatus::not_found();
        };

        let assessment = match self.provider.assessment(best.assessment_id).await {
            Ok(assessment) => assessment,
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    assessment_id = best.assessment_id,
                    error = %e,
                    "Assessment fetch failed"
                );
                return SpeciesStatus::not_found();
            }
        };

        SpeciesStatus {
            found: true,
            taxon: Some(taxon_summary(taxon, &search_name)),
            assessment: Some(summarize_assessment(&assessment, best, taxon, &search_name)),
        }
    }
}
