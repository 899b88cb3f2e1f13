mod common;

use common::{taxon_entity, taxon_hit, MockOccurrences, MockRedList, MockTaxonomy};
use exabrowse_core::providers::{AssessmentRef, CommonName, RawOccurrence, RedListTaxon};
use exabrowse_core::{OccurrenceLookup, RedListLookup, SpeciesSearch};
use serde_json::json;
use std::sync::Arc;

fn lion_taxon() -> RedListTaxon {
    RedListTaxon {
        sis_taxon_id: Some(15951),
        scientific_name: Some("Panthera leo".to_string()),
        kingdom: Some("ANIMALIA".to_string()),
        common_names: vec![CommonName {
            name: Some("Lion".to_string()),
        }],
        assessments: vec![
            AssessmentRef {
                assessment_id: 100,
                year: Some(json!("2023")),
                scopes: vec![json!({"description": {"en": "Mediterranean"}})],
            },
            AssessmentRef {
                assessment_id: 200,
                year: Some(json!("2016")),
                scopes: vec![json!({"description": {"en": "Global"}})],
            },
        ],
        ..RedListTaxon::default()
    }
}

#[tokio::test]
async fn test_species_search_filters_and_selects() {
    let mock = Arc::new(MockTaxonomy::new(
        Some(vec![
            taxon_hit("Q140", "species of big cat"),
            taxon_hit("Q1", "1994 animated film"),
            taxon_hit("Q2", "genus of mammals"),
            taxon_hit("Q3", "Wikimedia disambiguation page"),
        ]),
        Some(vec![
            taxon_entity("Q2", None),
            taxon_entity("Q140", Some("Panthera leo")),
        ]),
    ));
    let candidates = SpeciesSearch::new(mock.clone()).search("lion").await;

    assert_eq!(mock.entity_requests(), vec![vec!["Q140".to_string(), "Q2".to_string()]]);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, "Q140");
    assert_eq!(candidates[0].scientific_name, "Panthera leo");
}

#[tokio::test]
async fn test_species_search_empty_cases() {
    let mock = Arc::new(MockTaxonomy::new(Some(vec![taxon_hit("Q1", "film")]), Some(vec![])));
    let search = SpeciesSearch::new(mock.clone());
    assert!(search.search("   ").await.is_empty());
    assert!(search.search("jaws").await.is_empty());
    assert!(mock.entity_requests().is_empty());

    let failing = SpeciesSearch::new(Arc::new(MockTaxonomy::new(None, None)));
    assert!(failing.search("lion").await.is_empty());

    let lookup_down = SpeciesSearch::new(Arc::new(MockTaxonomy::new(
        Some(vec![taxon_hit("Q140", "species")]),
        None,
    )));
    assert!(lookup_down.search("lion").await.is_empty());
}

#[tokio::test]
async fn test_red_list_lookup_uses_best_assessment() {
    let mock = Arc::new(MockRedList::new(
        Some(vec![lion_taxon()]),
        Some(json!({
            "red_list_category": {"code": "VU", "description": {"en": "Vulnerable"}},
            "population_trend": {"code": "1", "description": {"en": "Decreasing"}},
            "geographical_range": {"countries": [
                {"origin": 1, "presence": 1, "country": {"iso2": "KE"}}
            ]},
            "threats": [{"title": "Hunting"}]
        })),
    ));
    let status = RedListLookup::new(mock.clone())
        .lookup("Panthera leo melanochaita")
        .await;

    assert_eq!(mock.names(), vec!["Panthera leo"]);
    assert_eq!(mock.assessment_ids(), vec![200]);
    assert!(status.found);

    let taxon = status.taxon.unwrap();
    assert_eq!(taxon.common_name.as_deref(), Some("Lion"));
    assert_eq!(taxon.kingdom.as_deref(), Some("ANIMALIA"));

    let assessment = status.assessment.unwrap();
    assert_eq!(assessment.red_list_category, "VU");
    assert_eq!(assessment.native_countries, vec!["KE"]);
    assert_eq!(assessment.threats, vec!["Hunting"]);
    assert_eq!(assessment.year, Some(2016));
    assert_eq!(assessment.iucn_url, "https://www.iucnredlist.org/species/15951/200");
}

#[tokio::test]
async fn test_red_list_lookup_not_found_paths() {
    let no_taxa = Arc::new(MockRedList::new(Some(vec![]), Some(json!({}))));
    assert!(!RedListLookup::new(no_taxa).lookup("Nothing here").await.found);

    let auth_error = Arc::new(MockRedList::new(None, None));
    let status = RedListLookup::new(auth_error).lookup("Panthera leo").await;
    assert!(!status.found);
    assert!(status.taxon.is_none());

    let unassessed = RedListTaxon {
        assessments: vec![],
        ..lion_taxon()
    };
    let no_assessments = Arc::new(MockRedList::new(Some(vec![unassessed]), Some(json!({}))));
    assert!(!RedListLookup::new(no_assessments.clone()).lookup("Panthera leo").await.found);
    assert!(no_assessments.assessment_ids().is_empty());

    let assessment_down = Arc::new(MockRedList::new(Some(vec![lion_taxon()]), None));
    assert!(!RedListLookup::new(assessment_down).lookup("Panthera leo").await.found);

    let blank = Arc::new(MockRedList::new(Some(vec![lion_taxon()]), Some(json!({}))));
    assert!(!RedListLookup::new(blank.clone()).lookup("  ").await.found);
    assert!(blank.names().is_empty());
}

#[tokio::test]
async fn test_occurrence_lookup_maps_and_clamps() {
    let mock = Arc::new(MockOccurrences::new(
        Some(5219404),
        Some(vec![
            RawOccurrence {
                decimal_latitude: Some(-1.3),
                decimal_longitude: Some(36.8),
                year: Some(2021),
                country: Some("Kenya".to_string()),
            },
            RawOccurrence {
                decimal_latitude: Some(-2.0),
                ..RawOccurrence::default()
            },
        ]),
    ));
    let lookup = OccurrenceLookup::new(mock.clone());

    let occurrences = lookup.lookup("Panthera leo", Some(1000)).await;
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].lng, 36.8);

    lookup.lookup("Panthera leo", None).await;
    lookup.lookup("Panthera leo", Some(25)).await;
    assert_eq!(mock.limits(), vec![300, 300, 25]);
}

#[tokio::test]
async fn test_occurrence_lookup_empty_cases() {
    let unmatched = Arc::new(MockOccurrences::new(None, Some(vec![])));
    assert!(OccurrenceLookup::new(unmatched.clone()).lookup("Nonexistent", None).await.is_empty());
    assert!(unmatched.limits().is_empty());

    let failing = Arc::new(MockOccurrences::new(Some(1), None));
    assert!(OccurrenceLookup::new(failing).lookup("Panthera leo", None).await.is_empty());

    let blank = Arc::new(MockOccurrences::new(Some(1), Some(vec![])));
    assert!(OccurrenceLookup::new(blank.clone()).lookup(" ", None).await.is_empty());
    assert!(blank.limits().is_empty());
}
