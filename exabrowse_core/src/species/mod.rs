//! Species lookup: candidate taxa for a free-text name, conservation status
//! from the Red List, and where the species has been recorded.
//!
//! Every lookup degrades to an empty answer when its provider fails, so a
//! caller always gets a well-formed value.

mod occurrences;
mod search;
mod status;

pub use occurrences::{clamp_limit, to_occurrences, Occurrence, OccurrenceLookup, MAX_OCCURRENCES};
pub use search::{
    candidate_ids, is_blocked, select_candidates, SpeciesCandidate, SpeciesSearch,
    DESCRIPTION_BLOCKLIST, MAX_CANDIDATES, MAX_ENTITY_LOOKUPS,
};
pub use status::{
    best_assessment, iucn_url, native_countries, search_name, strip_html, summarize_assessment,
    AssessmentSummary, RedListLookup, SpeciesStatus, TaxonSummary,
};
