//! Fan-out and filter tests for the thesaurus registry.

use std::sync::Arc;

use geolex_core::{ConceptStore, IsoLanguage, ThesaurusState};
use geolex_db::test_fixtures::{concept_fixture, thesaurus_fixture};
use geolex_db::MemoryThesaurus;
use geolex_registry::{RegistryFilter, ThesaurusRegistry};

fn two_thesauri() -> ThesaurusRegistry {
    let geo = MemoryThesaurus::new(thesaurus_fixture("geo", &["en", "fr"]));
    geo.seed(concept_fixture("urn:geo:ocean", &[("Ocean", "en")]));

    let mut disabled_meta = thesaurus_fixture("legacy", &["en"]);
    disabled_meta.state = ThesaurusState::Disabled;
    let legacy = MemoryThesaurus::new(disabled_meta);
    legacy.seed(concept_fixture("urn:legacy:ocean", &[("Ocean", "en")]));

    ThesaurusRegistry::new(vec![
        Arc::new(geo) as Arc<dyn ConceptStore>,
        Arc::new(legacy) as Arc<dyn ConceptStore>,
    ])
}

#[tokio::test]
async fn disabled_thesauri_are_excluded_by_default() {
    let registry = two_thesauri();

    let matches = registry
        .find_labels("Ocean", &RegistryFilter::default())
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].thesaurus_uri, "urn:geolex:thesaurus:geo");
}

#[tokio::test]
async fn disabled_thesauri_can_be_opted_in() {
    let registry = two_thesauri();

    let filter = RegistryFilter {
        include_disabled: true,
        ..RegistryFilter::default()
    };
    let matches = registry.find_labels("Ocean", &filter).await.unwrap();

    assert_eq!(matches.len(), 2);
}

#[tokio::test]
async fn uri_allow_list_restricts_fan_out() {
    let registry = two_thesauri();

    let filter = RegistryFilter {
        thesaurus_uris: Some(vec!["urn:geolex:thesaurus:legacy".to_string()]),
        include_disabled: true,
        ..RegistryFilter::default()
    };
    let matches = registry.find_labels("Ocean", &filter).await.unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].thesaurus_uri, "urn:geolex:thesaurus:legacy");
}

#[tokio::test]
async fn language_filter_skips_unsupporting_thesauri() {
    let registry = two_thesauri();

    let filter = RegistryFilter {
        language: Some(IsoLanguage::new("fr")),
        include_disabled: true,
        ..RegistryFilter::default()
    };
    // Only "geo" supports French; its English-only label cannot match
    // under the French filter.
    let matches = registry.find_labels("Ocean", &filter).await.unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn find_concept_concatenates_across_thesauri() {
    let registry = two_thesauri();

    let filter = RegistryFilter {
        include_disabled: true,
        ..RegistryFilter::default()
    };
    // Suffix matching resolves the URI independently in each store.
    let found = registry.find_concept(":ocean", &filter).await.unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn related_concepts_resolve_within_the_answering_thesaurus() {
    let geo = MemoryThesaurus::new(thesaurus_fixture("geo", &["en"]));
    let mut ocean = concept_fixture("urn:geo:ocean", &[("Ocean", "en")]);
    ocean.related.push("urn:geo:coast".to_string());
    geo.seed(ocean);
    geo.seed(concept_fixture("urn:geo:coast", &[("Coast", "en")]));
    let registry = ThesaurusRegistry::new(vec![Arc::new(geo) as Arc<dyn ConceptStore>]);

    let related = registry
        .related_concepts("urn:geo:ocean", &RegistryFilter::default())
        .await
        .unwrap();

    assert_eq!(related.len(), 1);
    assert_eq!(related[0].uri, "urn:geo:coast");
}

#[tokio::test]
async fn words_aggregate_and_deduplicate_across_thesauri() {
    let a = MemoryThesaurus::new(thesaurus_fixture("a", &["en"]));
    a.seed(concept_fixture("urn:a:1", &[("Deep Ocean", "en")]));
    let b = MemoryThesaurus::new(thesaurus_fixture("b", &["en"]));
    b.seed(concept_fixture("urn:b:1", &[("Ocean floor", "en")]));
    let registry = ThesaurusRegistry::new(vec![
        Arc::new(a) as Arc<dyn ConceptStore>,
        Arc::new(b) as Arc<dyn ConceptStore>,
    ]);

    let words = registry.words(&RegistryFilter::default()).await.unwrap();

    assert_eq!(words, vec!["deep", "floor", "ocean"]);
}

#[tokio::test]
async fn default_language_is_first_thesaurus_first_language() {
    let registry = two_thesauri();
    assert_eq!(registry.default_language(), Some(IsoLanguage::new("en")));
}
