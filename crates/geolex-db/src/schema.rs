//! DDL for thesaurus schemas and the shared aggregation tables.
//!
//! Each thesaurus owns a dedicated schema holding five tables:
//! `propriete_thesaurus` (metadata row), `language` (supported languages),
//! `triple` (graph edges and scalar properties), `terme_completion`
//! (search-optimized labels) and `terme_localisation` (documentation
//! terms), plus the `couche_associee` side table linking concepts to GIS
//! layers. The aggregation tables (`term_count`, `aggregated_identifier`,
//! `linked_service`) live once in the public schema and span thesauri.
//!
//! Schema names are interpolated only after passing
//! [`crate::validate_schema_name`].

use sqlx::PgPool;
use tracing::info;

use geolex_core::Result;

/// Per-thesaurus DDL statements, `{schema}`-qualified.
pub(crate) fn thesaurus_ddl(schema: &str) -> Vec<String> {
    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {schema}"),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {schema}.propriete_thesaurus (
                uri              TEXT PRIMARY KEY,
                name             TEXT NOT NULL,
                description      TEXT,
                version          TEXT,
                default_language TEXT NOT NULL,
                state            TEXT NOT NULL DEFAULT 'active',
                created_at       TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at       TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {schema}.language (
                code     TEXT PRIMARY KEY,
                position INTEGER NOT NULL
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {schema}.triple (
                subject   TEXT NOT NULL,
                predicate TEXT NOT NULL,
                object    TEXT NOT NULL
            )
            "#
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_{schema}_triple_subject ON {schema}.triple (subject, predicate)"),
        format!("CREATE INDEX IF NOT EXISTS idx_{schema}_triple_object ON {schema}.triple (predicate, object)"),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {schema}.terme_completion (
                concept_uri       TEXT NOT NULL,
                text              TEXT NOT NULL,
                thesaurus_origine TEXT,
                language          TEXT NOT NULL,
                term_type         TEXT NOT NULL
            )
            "#
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_{schema}_completion_text ON {schema}.terme_completion (text)"),
        format!("CREATE INDEX IF NOT EXISTS idx_{schema}_completion_uri ON {schema}.terme_completion (concept_uri)"),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {schema}.terme_localisation (
                concept_uri       TEXT NOT NULL,
                text              TEXT NOT NULL,
                thesaurus_origine TEXT,
                language          TEXT NOT NULL,
                term_type         TEXT NOT NULL
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {schema}.couche_associee (
                concept_uri TEXT PRIMARY KEY,
                layer       TEXT
            )
            "#
        ),
    ]
}

/// Create the cross-thesaurus aggregation tables if they do not exist.
pub async fn ensure_aggregation_tables(pool: &PgPool) -> Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS linked_service (
            id     SERIAL PRIMARY KEY,
            url    TEXT NOT NULL,
            name   TEXT,
            is_csw BOOLEAN NOT NULL DEFAULT TRUE
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS term_count (
            service_id       INTEGER NOT NULL REFERENCES linked_service (id) ON DELETE CASCADE,
            thesaurus_uri    TEXT NOT NULL,
            concept_uri      TEXT NOT NULL,
            label            TEXT NOT NULL,
            language         TEXT,
            theme            TEXT,
            count            BIGINT NOT NULL DEFAULT 0,
            aggregated_count BIGINT NOT NULL DEFAULT 0,
            computed_at      TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_term_count_concept ON term_count (service_id, concept_uri)",
        "CREATE INDEX IF NOT EXISTS idx_term_count_label ON term_count (label)",
        r#"
        CREATE TABLE IF NOT EXISTS aggregated_identifier (
            service_id  INTEGER NOT NULL REFERENCES linked_service (id) ON DELETE CASCADE,
            concept_uri TEXT NOT NULL,
            identifier  TEXT NOT NULL,
            PRIMARY KEY (service_id, concept_uri, identifier)
        )
        "#,
    ];

    for sql in statements {
        sqlx::query(sql).execute(pool).await?;
    }

    info!(
        subsystem = "db",
        component = "schema",
        op = "ensure_aggregation_tables",
        "Aggregation tables ready"
    );
    Ok(())
}
