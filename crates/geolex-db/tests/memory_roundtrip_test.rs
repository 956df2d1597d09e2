//! Write/read round-trip, upsert idempotence, and top-most recomputation
//! against the in-memory store.

use geolex_core::{
    Concept, ConceptStore, ConceptWriter, IsoLanguage, Predicate, Term, TermType,
};
use geolex_db::test_fixtures::{concept_fixture, thesaurus_fixture};
use geolex_db::MemoryThesaurus;

fn sample_concept() -> Concept {
    let mut c = concept_fixture("urn:c:ocean", &[("Ocean", "en"), ("Océan", "fr")]);
    c.add_term(Term::new("Sea", "en", TermType::AltLabel));
    c.add_term(Term::new(
        "Large body of salt water",
        "en",
        TermType::Definition,
    ));
    c.broader.push("urn:c:water".to_string());
    c.related.push("urn:c:coast".to_string());
    c.creator = Some("hydro-team".to_string());
    c.title = Some("Ocean".to_string());
    c
}

#[tokio::test]
async fn write_then_read_round_trips_every_field() {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en", "fr"]));
    let concept = sample_concept();

    store.write_concept(&concept).await.unwrap();
    let read = store.read_concept("urn:c:ocean", false, None).await.unwrap().unwrap();

    assert_eq!(read.pref_labels, concept.pref_labels);
    assert_eq!(read.alt_labels, concept.alt_labels);
    assert_eq!(read.definitions, concept.definitions);
    assert_eq!(read.broader, concept.broader);
    assert_eq!(read.related, concept.related);
    assert_eq!(read.creator, concept.creator);
    assert_eq!(read.title, concept.title);
}

#[tokio::test]
async fn write_twice_is_idempotent() {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en", "fr"]));
    let concept = sample_concept();

    store.write_concept(&concept).await.unwrap();
    let first = store.read_concept("urn:c:ocean", false, None).await.unwrap().unwrap();

    store.write_concept(&concept).await.unwrap();
    let second = store.read_concept("urn:c:ocean", false, None).await.unwrap().unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(first.pref_labels, second.pref_labels);
    assert_eq!(first.broader, second.broader);

    // The second write must have taken the update path.
    assert_eq!(store.calls_for("insert_concept").len(), 1);
    assert_eq!(store.calls_for("update_concept").len(), 1);
}

#[tokio::test]
async fn read_with_language_filter_restricts_terms() {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en", "fr"]));
    store.write_concept(&sample_concept()).await.unwrap();

    let fr = IsoLanguage::new("fr");
    let read = store
        .read_concept("urn:c:ocean", false, Some(&fr))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(read.pref_labels.len(), 1);
    assert_eq!(read.pref_labels[0].text, "Océan");
    assert!(read.alt_labels.is_empty());
}

#[tokio::test]
async fn geometry_flag_loads_the_associated_layer() {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en"]));
    store.seed(concept_fixture("urn:c:wetland", &[("Wetland", "en")]));
    store.set_layer("urn:c:wetland", "hydro:wetlands");

    let plain = store
        .read_concept("urn:c:wetland", false, None)
        .await
        .unwrap()
        .unwrap();
    assert!(plain.associated_layer.is_none());

    let with_geometry = store
        .read_concept("urn:c:wetland", true, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        with_geometry.associated_layer.as_deref(),
        Some("hydro:wetlands")
    );
}

#[tokio::test]
async fn missing_concept_reads_as_none() {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en"]));
    assert!(store.read_concept("urn:c:nope", false, None).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_concept_cleans_reverse_references() {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en"]));
    let mut water = concept_fixture("urn:c:water", &[("Water", "en")]);
    water.narrower.push("urn:c:ocean".to_string());
    store.seed(water);
    store.seed(concept_fixture("urn:c:ocean", &[("Ocean", "en")]));

    store.delete_concept("urn:c:ocean").await.unwrap();

    let water = store.read_concept("urn:c:water", false, None).await.unwrap().unwrap();
    assert!(water.narrower.is_empty());
}

#[tokio::test]
async fn compute_top_most_concept_collects_apparent_roots() {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en"]));
    let mut water = concept_fixture("urn:c:water", &[("Water", "en")]);
    water.narrower.push("urn:c:ocean".to_string());
    let mut ocean = concept_fixture("urn:c:ocean", &[("Ocean", "en")]);
    ocean.broader.push("urn:c:water".to_string());
    let land = concept_fixture("urn:c:land", &[("Land", "en")]);
    store.seed(water);
    store.seed(ocean);
    store.seed(land);

    let scheme = store.compute_top_most_concept().await.unwrap();

    assert!(scheme.hierarchy_root);
    assert_eq!(
        scheme.hierarchy_root_type.as_deref(),
        Some("http://www.w3.org/2004/02/skos/core#ConceptScheme")
    );
    assert_eq!(
        scheme.has_top_concept,
        vec!["urn:c:land".to_string(), "urn:c:water".to_string()]
    );

    // Recomputing does not treat the synthesized scheme root as a root.
    let second = store.compute_top_most_concept().await.unwrap();
    assert_eq!(second.has_top_concept, scheme.has_top_concept);
}

#[tokio::test]
async fn concept_narrowers_reports_per_child_counts() {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en"]));
    let mut water = concept_fixture("urn:c:water", &[("Water", "en")]);
    water.narrower.push("urn:c:ocean".to_string());
    water.narrower.push("urn:c:river".to_string());
    let mut ocean = concept_fixture("urn:c:ocean", &[("Ocean", "en")]);
    ocean.narrower.push("urn:c:abyss".to_string());
    let river = concept_fixture("urn:c:river", &[("River", "en")]);
    store.seed(water);
    store.seed(ocean);
    store.seed(river);
    store.seed(concept_fixture("urn:c:abyss", &[("Abyss", "en")]));

    let nodes = store.concept_narrowers("urn:c:water").await.unwrap();

    assert_eq!(nodes.len(), 2);
    let ocean_node = nodes.iter().find(|n| n.uri == "urn:c:ocean").unwrap();
    assert_eq!(ocean_node.narrower_count, 1);
    assert_eq!(ocean_node.label.as_deref(), Some("Ocean"));
    let river_node = nodes.iter().find(|n| n.uri == "urn:c:river").unwrap();
    assert_eq!(river_node.narrower_count, 0);
}

#[tokio::test]
async fn full_concept_merges_terms_relations_and_top_status() {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en"]));
    let mut scheme = Concept::new("urn:scheme");
    scheme.has_top_concept.push("urn:c:water".to_string());
    let mut water = concept_fixture("urn:c:water", &[("Water", "en")]);
    water.narrower.push("urn:c:ocean".to_string());
    store.seed(scheme);
    store.seed(water);
    store.seed(concept_fixture("urn:c:ocean", &[("Ocean", "en")]));

    let full = store.full_concept("urn:c:water").await.unwrap().unwrap();

    assert!(full.top_concept);
    assert_eq!(full.narrower, vec!["urn:c:ocean".to_string()]);
    assert_eq!(full.terms.len(), 1);

    assert!(store.full_concept("urn:c:void").await.unwrap().is_none());
}

#[tokio::test]
async fn words_are_lowercased_and_deduplicated() {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en"]));
    store.seed(concept_fixture("urn:c:1", &[("Deep Ocean", "en")]));
    store.seed(concept_fixture("urn:c:2", &[("Ocean floor", "en")]));

    let words = store.words(None).await.unwrap();

    assert_eq!(words, vec!["deep", "floor", "ocean"]);
}

#[tokio::test]
async fn partial_read_requires_a_preferred_label() {
    let store = MemoryThesaurus::new(thesaurus_fixture("geo", &["en"]));
    let mut bare = Concept::new("urn:c:bare");
    bare.title = Some("no labels".to_string());
    store.seed(bare);

    let partial = store
        .read_partial_concept("urn:c:bare", &[Predicate::Broader])
        .await
        .unwrap();
    assert!(partial.is_none());
}
