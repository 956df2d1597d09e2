//! Repository for the cross-thesaurus aggregation tables.
//!
//! Term-occurrence counts computed by the catalog counting pass are
//! persisted in `term_count` and `aggregated_identifier`, keyed by the
//! `linked_service` registry of remote catalog endpoints.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::warn;

use geolex_core::{
    CswScope, IsoLanguage, KeywordCountFilter, LinkedService, Result, TermCount, TermCountStore,
};

/// PostgreSQL implementation of [`TermCountStore`].
#[derive(Clone)]
pub struct PgTermStatsRepository {
    pool: PgPool,
}

impl PgTermStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_count(row: sqlx::postgres::PgRow) -> TermCount {
    TermCount {
        service_id: row.get("service_id"),
        thesaurus_uri: row.get("thesaurus_uri"),
        concept_uri: row.get("concept_uri"),
        label: row.get("label"),
        language: row
            .get::<Option<String>, _>("language")
            .map(|l| IsoLanguage::new(&l)),
        theme: row.get("theme"),
        count: row.get("count"),
        aggregated_count: row.get("aggregated_count"),
    }
}

#[async_trait]
impl TermCountStore for PgTermStatsRepository {
    async fn clear_counts(&self, service_id: i32) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM aggregated_identifier WHERE service_id = $1")
            .bind(service_id)
            .execute(&mut *tx)
            .await?;
        let removed = sqlx::query("DELETE FROM term_count WHERE service_id = $1")
            .bind(service_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(removed)
    }

    async fn save_count(&self, count: &TermCount, identifiers: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO term_count (
                service_id, thesaurus_uri, concept_uri, label, language,
                theme, count, aggregated_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(count.service_id)
        .bind(&count.thesaurus_uri)
        .bind(&count.concept_uri)
        .bind(&count.label)
        .bind(count.language.as_ref().map(|l| l.code().to_string()))
        .bind(&count.theme)
        .bind(count.count)
        .bind(count.aggregated_count)
        .execute(&mut *tx)
        .await?;

        for identifier in identifiers {
            sqlx::query(
                "INSERT INTO aggregated_identifier (service_id, concept_uri, identifier) \
                 VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
            )
            .bind(count.service_id)
            .bind(&count.concept_uri)
            .bind(identifier)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn counts_by_keyword(&self, filter: &KeywordCountFilter) -> Result<Vec<TermCount>> {
        let mut sql = String::from(
            "SELECT tc.service_id, tc.thesaurus_uri, tc.concept_uri, tc.label, \
                    tc.language, tc.theme, tc.count, tc.aggregated_count \
             FROM term_count tc \
             JOIN linked_service ls ON ls.id = tc.service_id \
             WHERE tc.label ILIKE $1",
        );
        match filter.csw {
            CswScope::Any => {}
            CswScope::CswOnly => sql.push_str(" AND ls.is_csw"),
            CswScope::IgnoreCsw => sql.push_str(" AND NOT ls.is_csw"),
        }
        if !filter.themes.is_empty() {
            sql.push_str(" AND tc.theme = ANY($2)");
        }
        sql.push_str(if filter.aggregated {
            " AND tc.aggregated_count > 0 ORDER BY tc.aggregated_count DESC, tc.label"
        } else {
            " AND tc.count > 0 ORDER BY tc.count DESC, tc.label"
        });

        let pattern = format!("%{}%", geolex_core::escape_like(&filter.keyword));
        let mut query = sqlx::query(&sql).bind(pattern);
        if !filter.themes.is_empty() {
            query = query.bind(filter.themes.clone());
        }

        let rows = match query.fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    subsystem = "db",
                    component = "term_stats",
                    op = "counts_by_keyword",
                    error = %e,
                    "storage error absorbed, returning empty counts"
                );
                return Ok(Vec::new());
            }
        };

        Ok(rows.into_iter().map(row_to_count).collect())
    }

    async fn identifiers_for(&self, service_id: i32, concept_uri: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT identifier FROM aggregated_identifier \
             WHERE service_id = $1 AND concept_uri = $2 ORDER BY identifier",
        )
        .bind(service_id)
        .bind(concept_uri)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.get("identifier")).collect())
    }

    async fn linked_services(&self) -> Result<Vec<LinkedService>> {
        let rows = sqlx::query("SELECT id, url, name, is_csw FROM linked_service ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| LinkedService {
                id: r.get("id"),
                url: r.get("url"),
                name: r.get("name"),
                is_csw: r.get("is_csw"),
            })
            .collect())
    }

    async fn register_service(
        &self,
        url: &str,
        name: Option<&str>,
        is_csw: bool,
    ) -> Result<LinkedService> {
        let row = sqlx::query(
            "INSERT INTO linked_service (url, name, is_csw) VALUES ($1, $2, $3) \
             RETURNING id, url, name, is_csw",
        )
        .bind(url)
        .bind(name)
        .bind(is_csw)
        .fetch_one(&self.pool)
        .await?;

        Ok(LinkedService {
            id: row.get("id"),
            url: row.get("url"),
            name: row.get("name"),
            is_csw: row.get("is_csw"),
        })
    }
}
