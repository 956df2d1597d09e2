//! Loading thesaurus metadata from per-schema property tables.

use sqlx::{PgPool, Row};
use tracing::warn;

use geolex_core::{Error, IsoLanguage, Result, Thesaurus, ThesaurusState};

use crate::concept_store::PgThesaurusRepository;
use crate::schema_validation::validate_schema_name;

/// Read one thesaurus's metadata row and language set from its schema.
pub async fn load_thesaurus(pool: &PgPool, schema: &str) -> Result<Thesaurus> {
    validate_schema_name(schema)?;

    let sql = format!(
        "SELECT uri, name, description, version, default_language, state, \
                created_at, updated_at \
         FROM {schema}.propriete_thesaurus LIMIT 1"
    );
    let row = sqlx::query(&sql)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::ThesaurusNotFound(schema.to_string()))?;

    let lang_sql = format!("SELECT code FROM {schema}.language ORDER BY position");
    let languages: Vec<IsoLanguage> = sqlx::query(&lang_sql)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|r| IsoLanguage::new(&r.get::<String, _>("code")))
        .collect();

    let state = row
        .get::<String, _>("state")
        .parse::<ThesaurusState>()
        .unwrap_or(ThesaurusState::Active);

    Ok(Thesaurus {
        uri: row.get("uri"),
        name: row.get("name"),
        description: row.get("description"),
        version: row.get("version"),
        default_language: IsoLanguage::new(&row.get::<String, _>("default_language")),
        languages,
        state,
        schema: schema.to_string(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Build repositories for a list of schemas, skipping (with a warning) any
/// schema that cannot be loaded.
pub async fn load_thesauri(
    pool: &PgPool,
    schemas: &[String],
) -> Result<Vec<PgThesaurusRepository>> {
    let mut repositories = Vec::with_capacity(schemas.len());
    for schema in schemas {
        match load_thesaurus(pool, schema).await {
            Ok(thesaurus) => {
                repositories.push(PgThesaurusRepository::new(pool.clone(), thesaurus)?);
            }
            Err(e) => {
                warn!(
                    subsystem = "db",
                    component = "loader",
                    op = "load_thesauri",
                    schema = %schema,
                    error = %e,
                    "thesaurus skipped"
                );
            }
        }
    }
    Ok(repositories)
}
