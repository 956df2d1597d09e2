//! Integration tests for the PostgreSQL thesaurus repository.
//!
//! These tests provision a throwaway schema, exercise the write/read
//! round-trip and the search surfaces against real SQL, and drop the
//! schema afterwards. They require a reachable PostgreSQL instance:
//! set DATABASE_URL or run the local test database on port 15432.

use geolex_core::{
    Concept, ConceptStore, ConceptWriter, IsoLanguage, SearchMode, Term, TermType,
};
use geolex_db::test_fixtures::{concept_fixture, thesaurus_fixture, DEFAULT_TEST_DATABASE_URL};
use geolex_db::{create_pool, load_thesaurus, PgThesaurusRepository};
use sqlx::PgPool;

async fn setup_test_pool() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_TEST_DATABASE_URL.to_string());
    create_pool(&database_url)
        .await
        .expect("Failed to create test pool")
}

/// Provision a repository over a schema name unique to this test run.
async fn provisioned_repo(pool: PgPool, prefix: &str) -> PgThesaurusRepository {
    let schema = format!(
        "{}_{}",
        prefix,
        uuid::Uuid::new_v4().simple().to_string().split_at(8).0
    );
    let repo = PgThesaurusRepository::new(pool, thesaurus_fixture(&schema, &["en", "fr"]))
        .expect("valid schema name");
    repo.provision().await.expect("Failed to provision schema");
    repo
}

fn ocean_concept() -> Concept {
    let mut c = concept_fixture("urn:c:ocean", &[("Ocean", "en"), ("Océan", "fr")]);
    c.add_term(Term::new("Sea", "en", TermType::AltLabel));
    c.add_term(Term::new(
        "Large body of salt water",
        "en",
        TermType::Definition,
    ));
    c.broader.push("urn:c:water".to_string());
    c.creator = Some("hydro-team".to_string());
    c
}

#[tokio::test]
#[ignore = "requires a migrated PostgreSQL test database"]
async fn provision_write_read_round_trip() {
    let pool = setup_test_pool().await;
    let repo = provisioned_repo(pool, "rt").await;

    let concept = ocean_concept();
    repo.write_concept(&concept).await.unwrap();

    let read = repo.read_concept("urn:c:ocean", false, None).await.unwrap().unwrap();
    assert_eq!(read.uri, "urn:c:ocean");
    assert_eq!(read.pref_labels.len(), 2);
    assert_eq!(read.alt_labels.len(), 1);
    assert_eq!(read.definitions.len(), 1);
    assert_eq!(read.broader, vec!["urn:c:water".to_string()]);
    assert_eq!(read.creator.as_deref(), Some("hydro-team"));

    repo.drop_thesaurus().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a migrated PostgreSQL test database"]
async fn write_twice_leaves_row_counts_unchanged() {
    let pool = setup_test_pool().await;
    let repo = provisioned_repo(pool.clone(), "idem").await;

    let concept = ocean_concept();
    repo.write_concept(&concept).await.unwrap();
    repo.write_concept(&concept).await.unwrap();

    let schema = repo.thesaurus().schema.clone();
    let (triples,): (i64,) =
        sqlx::query_as(&format!("SELECT COUNT(*) FROM {schema}.triple"))
            .fetch_one(&pool)
            .await
            .unwrap();
    let (terms,): (i64,) =
        sqlx::query_as(&format!("SELECT COUNT(*) FROM {schema}.terme_completion"))
            .fetch_one(&pool)
            .await
            .unwrap();

    // type + broader + creator triples; two pref labels + one alt label.
    assert_eq!(triples, 3);
    assert_eq!(terms, 3);

    repo.drop_thesaurus().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a migrated PostgreSQL test database"]
async fn ranked_search_prefers_exact_matches() {
    let pool = setup_test_pool().await;
    let repo = provisioned_repo(pool, "rank").await;

    repo.write_concept(&ocean_concept()).await.unwrap();

    let en = IsoLanguage::new("en");
    let exact = repo.search("Ocean", Some(&en)).await.unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].score, 1.0);

    let insensitive = repo.search("ocean", None).await.unwrap();
    assert!(insensitive.iter().any(|m| m.score == 0.9));

    repo.drop_thesaurus().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a migrated PostgreSQL test database"]
async fn auto_search_falls_back_to_prefix() {
    let pool = setup_test_pool().await;
    let repo = provisioned_repo(pool, "auto").await;

    repo.write_concept(&concept_fixture("urn:c:og", &[("Oceanography", "en")]))
        .await
        .unwrap();

    let found = repo
        .search_concepts("Ocean", SearchMode::AutoSearch, false, &[], None)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].uri, "urn:c:og");

    repo.drop_thesaurus().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a migrated PostgreSQL test database"]
async fn numeric_uri_lookup_requires_exact_match() {
    let pool = setup_test_pool().await;
    let repo = provisioned_repo(pool, "numeric").await;

    repo.write_concept(&concept_fixture("1234", &[("Numbered", "en")]))
        .await
        .unwrap();

    assert!(repo.read_concept("1234", false, None).await.unwrap().is_some());
    // A different number must not suffix-match "1234".
    assert!(repo.read_concept("234", false, None).await.unwrap().is_none());

    repo.drop_thesaurus().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a migrated PostgreSQL test database"]
async fn metadata_round_trips_through_loader() {
    let pool = setup_test_pool().await;
    let repo = provisioned_repo(pool.clone(), "meta").await;
    let schema = repo.thesaurus().schema.clone();

    let loaded = load_thesaurus(&pool, &schema).await.unwrap();
    assert_eq!(loaded.uri, repo.thesaurus().uri);
    assert_eq!(loaded.languages.len(), 2);
    assert!(loaded.is_active());

    repo.drop_thesaurus().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a migrated PostgreSQL test database"]
async fn cascade_delete_handles_cycles_in_sql() {
    let pool = setup_test_pool().await;
    let repo = provisioned_repo(pool, "cyc").await;

    let mut a = concept_fixture("urn:a", &[("A", "en")]);
    a.narrower.push("urn:b".to_string());
    a.broader.push("urn:b".to_string());
    let mut b = concept_fixture("urn:b", &[("B", "en")]);
    b.narrower.push("urn:a".to_string());
    b.broader.push("urn:a".to_string());
    repo.write_concept(&a).await.unwrap();
    repo.write_concept(&b).await.unwrap();

    let removed = repo.delete_concept_cascade(&a).await.unwrap();
    assert_eq!(removed, 2);
    assert!(repo.read_concept("urn:a", false, None).await.unwrap().is_none());
    assert!(repo.read_concept("urn:b", false, None).await.unwrap().is_none());

    repo.drop_thesaurus().await.unwrap();
}
