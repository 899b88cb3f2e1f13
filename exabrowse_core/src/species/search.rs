use crate::providers::{TaxonEntity, TaxonHit, TaxonomyProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Descriptions containing any of these (case-insensitive) are not organisms.
pub const DESCRIPTION_BLOCKLIST: &[&str] = &[
    "film",
    "album",
    "song",
    "band",
    "city",
    "given name",
    "surname",
    "family name",
    "fictional character",
    "television series",
    "video game",
    "book",
    "novel",
    "magazine",
    "newspaper",
    "programming language",
    "software",
    "company",
    "sports team",
    "military unit",
    "automobile",
    "ship",
    "aircraft",
    "rocket",
    "satellite",
    "disambiguation page",
    "wikimedia",
];

/// Hits passed on to the entity lookup.
pub const MAX_ENTITY_LOOKUPS: usize = 8;
pub const MAX_CANDIDATES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesCandidate {
    pub id: String,
    pub label: String,
    pub description: String,
    pub scientific_name: String,
}

pub fn is_blocked(description: &str) -> bool {
    let description = description.to_lowercase();
    DESCRIPTION_BLOCKLIST
        .iter()
        .any(|term| description.contains(term))
}

/// Ids of the hits worth a full lookup, in search order.
pub fn candidate_ids(hits: &[TaxonHit]) -> Vec<String> {
    hits.iter()
        .filter(|hit| !is_blocked(hit.description.as_deref().unwrap_or_default()))
        .take(MAX_ENTITY_LOOKUPS)
        .map(|hit| hit.id.clone())
        .collect()
}

/// Entities that carry a taxon name, capped at [`MAX_CANDIDATES`].
pub fn select_candidates(entities: Vec<TaxonEntity>) -> Vec<SpeciesCandidate> {
    entities
        .into_iter()
        .filter_map(|entity| {
            let scientific_name = entity.taxon_name?;
            Some(SpeciesCandidate {
                id: entity.id,
                label: entity.label,
                description: entity.description,
                scientific_name,
            })
        })
        .take(MAX_CANDIDATES)
        .collect()
}

/// Turns a common or partial name into taxon candidates.
pub struct SpeciesSearch {
    provider: Arc<dyn TaxonomyProvider>,
}

impl SpeciesSearch {
    pub fn new(provider: Arc<dyn TaxonomyProvider>) -> Self {
        Self { provider }
    }

    /// Empty on blank input or any provider failure.
    pub async fn search(&self, query: &str) -> Vec<SpeciesCandidate> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let hits = match self.provider.search_entities(query).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "Species search failed");
                return Vec::new();
            }
        };

        let ids = candidate_ids(&hits);
        if ids.is_empty() {
            return Vec::new();
        }

        match self.provider.get_entities(&ids).await {
            Ok(entities) => select_candidates(entities),
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "Species entity lookup failed");
                Vec::new()
            }
        }
    }
}
