//! Counting-pipeline tests: transitive aggregation, flat mode, error
//! isolation, and count clearing.

use std::sync::Arc;

use geolex_catalog::{CatalogTermCounter, MockCatalogClient};
use geolex_core::{
    Concept, ConceptStore, LinkedService, TermCount, TermCountStore, ThesaurusState,
};
use geolex_db::test_fixtures::{concept_fixture, thesaurus_fixture};
use geolex_db::{MemoryTermCountStore, MemoryThesaurus};

fn service() -> LinkedService {
    LinkedService {
        id: 1,
        url: "http://catalog.example.org/csw".to_string(),
        name: Some("test catalog".to_string()),
        is_csw: true,
    }
}

/// Root → Mid → Leaf chain reachable from a scheme's top concepts.
fn chain_store() -> MemoryThesaurus {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en"]));

    let mut scheme = Concept::new("urn:scheme");
    scheme.has_top_concept.push("urn:root".to_string());
    store.seed(scheme);

    let mut root = concept_fixture("urn:root", &[("Root", "en")]);
    root.narrower.push("urn:mid".to_string());
    let mut mid = concept_fixture("urn:mid", &[("Mid", "en")]);
    mid.broader.push("urn:root".to_string());
    mid.narrower.push("urn:leaf".to_string());
    let mut leaf = concept_fixture("urn:leaf", &[("Leaf", "en")]);
    leaf.broader.push("urn:mid".to_string());
    store.seed(root);
    store.seed(mid);
    store.seed(leaf);
    store
}

#[tokio::test]
async fn transitive_pass_merges_identifier_sets_up_the_ancestor_chain() {
    let counts = Arc::new(MemoryTermCountStore::new());
    let counter = CatalogTermCounter::new(counts.clone());
    let client = MockCatalogClient::new()
        .with_response("Root", &[])
        .with_response("Mid", &["c", "d"])
        .with_response("Leaf", &["a", "b", "c"]);
    let stores: Vec<Arc<dyn ConceptStore>> = vec![Arc::new(chain_store())];

    let report = counter.recount(&service(), &client, &stores).await.unwrap();

    assert_eq!(report.transitive_passes, 1);
    assert_eq!(report.flat_passes, 0);
    assert_eq!(report.persisted, 3);

    let leaf = counts.count_for(1, "urn:leaf").unwrap();
    assert_eq!(leaf.count, 3);
    assert_eq!(leaf.aggregated_count, 3);

    let mid = counts.count_for(1, "urn:mid").unwrap();
    assert_eq!(mid.count, 2);
    assert_eq!(mid.aggregated_count, 4);

    // Root's own label matched nothing; its merged set is the deduplicated
    // union of Mid's and Leaf's.
    let root = counts.count_for(1, "urn:root").unwrap();
    assert_eq!(root.count, 0);
    assert_eq!(root.aggregated_count, 4);
    assert_eq!(
        counts.identifiers_for(1, "urn:root").await.unwrap(),
        vec!["a", "b", "c", "d"]
    );
}

#[tokio::test]
async fn each_concept_is_queried_exactly_once_per_pass() {
    let counts = Arc::new(MemoryTermCountStore::new());
    let counter = CatalogTermCounter::new(counts);
    let client = MockCatalogClient::new();
    let stores: Vec<Arc<dyn ConceptStore>> = vec![Arc::new(chain_store())];

    counter.recount(&service(), &client, &stores).await.unwrap();

    let mut queries = client.queries();
    queries.sort();
    assert_eq!(queries, vec!["Leaf", "Mid", "Root"]);
}

#[tokio::test]
async fn flat_mode_runs_when_no_top_concepts_exist() {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en"]));
    store.seed(concept_fixture("urn:a", &[("Alpha", "en")]));
    store.seed(concept_fixture("urn:b", &[("Beta", "en")]));

    let counts = Arc::new(MemoryTermCountStore::new());
    let counter = CatalogTermCounter::new(counts.clone());
    let client = MockCatalogClient::new()
        .with_response("Alpha", &["x"])
        .with_response("Beta", &["y", "z"]);
    let stores: Vec<Arc<dyn ConceptStore>> = vec![Arc::new(store)];

    let report = counter.recount(&service(), &client, &stores).await.unwrap();

    assert_eq!(report.flat_passes, 1);
    assert_eq!(report.transitive_passes, 0);
    assert_eq!(report.persisted, 2);

    // No aggregation in flat mode: raw and aggregated counts agree.
    let beta = counts.count_for(1, "urn:b").unwrap();
    assert_eq!(beta.count, 2);
    assert_eq!(beta.aggregated_count, 2);
}

#[tokio::test]
async fn remote_failures_count_as_zero_and_do_not_abort_the_pass() {
    let counts = Arc::new(MemoryTermCountStore::new());
    let counter = CatalogTermCounter::new(counts.clone());
    let client = MockCatalogClient::new()
        .with_failure("Mid")
        .with_response("Leaf", &["a", "b"]);
    let stores: Vec<Arc<dyn ConceptStore>> = vec![Arc::new(chain_store())];

    let report = counter.recount(&service(), &client, &stores).await.unwrap();

    // Leaf still counted; Mid and Root carry only propagated identifiers.
    assert_eq!(report.persisted, 3);
    let mid = counts.count_for(1, "urn:mid").unwrap();
    assert_eq!(mid.count, 0);
    assert_eq!(mid.aggregated_count, 2);
}

#[tokio::test]
async fn recount_clears_previous_counts_for_the_service() {
    let counts = Arc::new(MemoryTermCountStore::new());
    counts
        .save_count(
            &TermCount {
                service_id: 1,
                thesaurus_uri: "urn:geolex:thesaurus:geo".to_string(),
                concept_uri: "urn:stale".to_string(),
                label: "Stale".to_string(),
                language: None,
                theme: None,
                count: 7,
                aggregated_count: 7,
            },
            &["old-id".to_string()],
        )
        .await
        .unwrap();

    let counter = CatalogTermCounter::new(counts.clone());
    let client = MockCatalogClient::new();
    let empty = MemoryThesaurus::new(thesaurus_fixture("geo", &["en"]));
    let stores: Vec<Arc<dyn ConceptStore>> = vec![Arc::new(empty)];

    counter.recount(&service(), &client, &stores).await.unwrap();

    assert!(counts.count_for(1, "urn:stale").is_none());
}

#[tokio::test]
async fn disabled_thesauri_are_skipped() {
    let mut meta = thesaurus_fixture("legacy", &["en"]);
    meta.state = ThesaurusState::Disabled;
    let store = MemoryThesaurus::new(meta);
    store.seed(concept_fixture("urn:a", &[("Alpha", "en")]));

    let counts = Arc::new(MemoryTermCountStore::new());
    let counter = CatalogTermCounter::new(counts.clone());
    let client = MockCatalogClient::new().with_response("Alpha", &["x"]);
    let stores: Vec<Arc<dyn ConceptStore>> = vec![Arc::new(store)];

    let report = counter.recount(&service(), &client, &stores).await.unwrap();

    assert_eq!(report, geolex_catalog::CountReport::default());
    assert!(client.queries().is_empty());
    assert!(counts.counts().is_empty());
}

#[tokio::test]
async fn keyword_summary_exposes_persisted_counts() {
    let counts = Arc::new(MemoryTermCountStore::new());
    let counter = CatalogTermCounter::new(counts.clone());
    let client = MockCatalogClient::new()
        .with_response("Root", &["r1"])
        .with_response("Mid", &["c", "d"])
        .with_response("Leaf", &["a", "b", "c"]);
    let stores: Vec<Arc<dyn ConceptStore>> = vec![Arc::new(chain_store())];
    counter.recount(&service(), &client, &stores).await.unwrap();

    let filter = geolex_core::KeywordCountFilter {
        keyword: "mid".to_string(),
        aggregated: true,
        ..Default::default()
    };
    let summaries = counts.keyword_summary(&filter).await.unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].uri, "urn:mid");
    assert_eq!(summaries[0].count, 4);
    assert_eq!(summaries[0].identifiers, vec!["a", "b", "c", "d"]);
    assert_eq!(summaries[0].label.as_ref().unwrap().text, "Mid");
}

#[tokio::test]
async fn cyclic_hierarchies_terminate() {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en"]));
    let mut scheme = Concept::new("urn:scheme");
    scheme.has_top_concept.push("urn:a".to_string());
    store.seed(scheme);
    let mut a = concept_fixture("urn:a", &[("A", "en")]);
    a.narrower.push("urn:b".to_string());
    let mut b = concept_fixture("urn:b", &[("B", "en")]);
    b.narrower.push("urn:a".to_string());
    store.seed(a);
    store.seed(b);

    let counts = Arc::new(MemoryTermCountStore::new());
    let counter = CatalogTermCounter::new(counts);
    let client = MockCatalogClient::new().with_response("A", &["x"]);
    let stores: Vec<Arc<dyn ConceptStore>> = vec![Arc::new(store)];

    let report = counter.recount(&service(), &client, &stores).await.unwrap();

    // Each node visited once despite the cycle.
    assert_eq!(client.queries().len(), 2);
    assert_eq!(report.transitive_passes, 1);
}
