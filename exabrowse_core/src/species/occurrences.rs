use crate::providers::{OccurrenceProvider, RawOccurrence};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Upper bound and default for one occurrence request.
pub const MAX_OCCURRENCES: u32 = 300;

/// A georeferenced sighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub lat: f64,
    pub lng: f64,
    pub year: Option<i32>,
    pub country: Option<String>,
}

pub fn clamp_limit(requested: Option<u32>) -> u32 {
    requested.unwrap_or(MAX_OCCURRENCES).min(MAX_OCCURRENCES)
}

/// Drops records without both coordinates. A zero year counts as unknown.
pub fn to_occurrences(raw: Vec<RawOccurrence>) -> Vec<Occurrence> {
    raw.into_iter()
        .filter_map(|r| {
            Some(Occurrence {
                lat: r.decimal_latitude?,
                lng: r.decimal_longitude?,
                year: r.year.filter(|y| *y != 0),
                country: r.country.filter(|c| !c.is_empty()),
            })
        })
        .collect()
}

pub struct OccurrenceLookup {
    provider: Arc<dyn OccurrenceProvider>,
}

impl OccurrenceLookup {
    pub fn new(provider: Arc<dyn OccurrenceProvider>) -> Self {
        Self { provider }
    }

    /// Empty on blank input, no taxon match, or any provider failure.
    pub async fn lookup(&self, name: &str, limit: Option<u32>) -> Vec<Occurrence> {
        let name = name.trim();
        if name.is_empty() {
            return Vec::new();
        }

        let taxon_key = match self.provider.match_taxon(name).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                tracing::debug!(name, "No backbone match");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "Taxon match failed");
                return Vec::new();
            }
        };

        match self.provider.occurrences(taxon_key, clamp_limit(limit)).await {
            Ok(raw) => to_occurrences(raw),
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "Occurrence search failed");
                Vec::new()
            }
        }
    }
}
