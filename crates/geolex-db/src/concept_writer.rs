//! PostgreSQL concept writer: the write path of a thesaurus repository.
//!
//! Implements inserts, diff-applied updates, deletes with reverse-reference
//! cleanup, hierarchy-root bookkeeping, and schema lifecycle for
//! [`PgThesaurusRepository`]. Every multi-statement mutation runs inside a
//! single transaction so a crash cannot leave a concept with half its
//! relation set rewritten.
//!
//! Unlike the read path, write failures propagate to the caller.

use async_trait::async_trait;
use sqlx::Row;
use tracing::info;

use geolex_core::defaults::SKOS_CONCEPT_SCHEME_TYPE;
use geolex_core::{Concept, ConceptWriter, Predicate, Result, TermType, Thesaurus};

use crate::concept_store::PgThesaurusRepository;
use crate::schema::thesaurus_ddl;

/// Multi-valued predicates rewritten wholesale on update.
const REWRITTEN_PREDICATES: [Predicate; 6] = [
    Predicate::Broader,
    Predicate::Narrower,
    Predicate::Related,
    Predicate::NarrowerTransitive,
    Predicate::HasTopConcept,
    Predicate::Language,
];

impl PgThesaurusRepository {
    fn term_table(&self, kind: TermType) -> String {
        match kind.group() {
            geolex_core::TermGroup::Completion => self.table("terme_completion"),
            geolex_core::TermGroup::Localisation => self.table("terme_localisation"),
        }
    }

    async fn insert_terms(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        concept: &Concept,
    ) -> Result<()> {
        for term in concept.all_terms() {
            let sql = format!(
                "INSERT INTO {} (concept_uri, text, thesaurus_origine, language, term_type) \
                 VALUES ($1, $2, $3, $4, $5)",
                self.term_table(term.kind),
            );
            sqlx::query(&sql)
                .bind(&concept.uri)
                .bind(&term.text)
                .bind(term.theme.as_ref().or(concept.theme.as_ref()))
                .bind(term.language.code())
                .bind(term.kind.to_string())
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    async fn insert_triple(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        subject: &str,
        predicate: Predicate,
        object: &str,
    ) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (subject, predicate, object) VALUES ($1, $2, $3)",
            self.table("triple"),
        );
        sqlx::query(&sql)
            .bind(subject)
            .bind(predicate.uri())
            .bind(object)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ConceptWriter for PgThesaurusRepository {
    async fn insert_concept(&self, concept: &Concept) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (predicate, object) in concept.triples() {
            self.insert_triple(&mut tx, &concept.uri, predicate, &object)
                .await?;
        }
        self.insert_terms(&mut tx, concept).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_concept(&self, concept: &Concept) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let triple_table = self.table("triple");

        // List-valued relation sets are rewritten wholesale.
        for predicate in REWRITTEN_PREDICATES {
            let sql = format!(
                "DELETE FROM {triple_table} WHERE subject = $1 AND predicate = $2"
            );
            sqlx::query(&sql)
                .bind(&concept.uri)
                .bind(predicate.uri())
                .execute(&mut *tx)
                .await?;
        }

        for (predicate, object) in concept.triples() {
            if predicate.is_multi_valued() {
                self.insert_triple(&mut tx, &concept.uri, predicate, &object)
                    .await?;
            } else {
                // Scalars update in place; first write wins an insert.
                let sql = format!(
                    "UPDATE {triple_table} SET object = $3 \
                     WHERE subject = $1 AND predicate = $2"
                );
                let updated = sqlx::query(&sql)
                    .bind(&concept.uri)
                    .bind(predicate.uri())
                    .bind(&object)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                if updated == 0 {
                    self.insert_triple(&mut tx, &concept.uri, predicate, &object)
                        .await?;
                }
            }
        }

        // A concept demoted from hierarchy root loses its marker row.
        if !concept.hierarchy_root {
            let sql = format!(
                "DELETE FROM {triple_table} WHERE subject = $1 AND predicate = $2"
            );
            sqlx::query(&sql)
                .bind(&concept.uri)
                .bind(Predicate::HierarchyRoot.uri())
                .execute(&mut *tx)
                .await?;
        }

        // Terms are deleted and rewritten per term type, not diffed.
        for kind in TermType::ALL {
            let sql = format!(
                "DELETE FROM {} WHERE concept_uri = $1 AND term_type = $2",
                self.term_table(kind),
            );
            sqlx::query(&sql)
                .bind(&concept.uri)
                .bind(kind.to_string())
                .execute(&mut *tx)
                .await?;
        }
        self.insert_terms(&mut tx, concept).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_concept(&self, uri: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let triple_table = self.table("triple");

        let sql = format!("DELETE FROM {triple_table} WHERE subject = $1");
        sqlx::query(&sql).bind(uri).execute(&mut *tx).await?;

        for table in ["terme_completion", "terme_localisation"] {
            let sql = format!("DELETE FROM {} WHERE concept_uri = $1", self.table(table));
            sqlx::query(&sql).bind(uri).execute(&mut *tx).await?;
        }

        // Reverse-reference cleanup: triples elsewhere naming this URI as
        // object. Callers holding a stale in-memory reference must discard
        // it themselves.
        let sql = format!("DELETE FROM {triple_table} WHERE object = $1");
        sqlx::query(&sql).bind(uri).execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn apparent_roots(&self) -> Result<Vec<String>> {
        let triple_table = self.table("triple");
        let sql = format!(
            "SELECT DISTINCT t.subject FROM {triple_table} t \
             WHERE NOT EXISTS (SELECT 1 FROM {triple_table} b \
                               WHERE b.subject = t.subject AND b.predicate = $1) \
               AND NOT EXISTS (SELECT 1 FROM {triple_table} r \
                               WHERE r.subject = t.subject AND r.predicate = $2 \
                                 AND r.object = 'true') \
               AND NOT EXISTS (SELECT 1 FROM {triple_table} ty \
                               WHERE ty.subject = t.subject AND ty.predicate = $3 \
                                 AND ty.object = $4) \
             ORDER BY t.subject"
        );

        let rows = sqlx::query(&sql)
            .bind(Predicate::Broader.uri())
            .bind(Predicate::HierarchyRoot.uri())
            .bind(Predicate::Type.uri())
            .bind(SKOS_CONCEPT_SCHEME_TYPE)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.get("subject")).collect())
    }

    async fn provision(&self) -> Result<()> {
        let thesaurus = self.thesaurus.clone();

        for ddl in thesaurus_ddl(&thesaurus.schema) {
            sqlx::query(&ddl).execute(&self.pool).await?;
        }

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO {} (uri, name, description, version, default_language, state) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (uri) DO UPDATE SET \
                 name = EXCLUDED.name, description = EXCLUDED.description, \
                 version = EXCLUDED.version, default_language = EXCLUDED.default_language, \
                 state = EXCLUDED.state, updated_at = now()",
            self.table("propriete_thesaurus"),
        );
        sqlx::query(&sql)
            .bind(&thesaurus.uri)
            .bind(&thesaurus.name)
            .bind(&thesaurus.description)
            .bind(&thesaurus.version)
            .bind(thesaurus.default_language.code())
            .bind(thesaurus.state.to_string())
            .execute(&mut *tx)
            .await?;

        let sql = format!("DELETE FROM {}", self.table("language"));
        sqlx::query(&sql).execute(&mut *tx).await?;
        for (position, language) in thesaurus.languages.iter().enumerate() {
            let sql = format!(
                "INSERT INTO {} (code, position) VALUES ($1, $2)",
                self.table("language"),
            );
            sqlx::query(&sql)
                .bind(language.code())
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            subsystem = "db",
            component = "concept_writer",
            op = "provision",
            thesaurus = %thesaurus.uri,
            schema = %thesaurus.schema,
            "Thesaurus schema provisioned"
        );
        Ok(())
    }

    async fn drop_thesaurus(&self) -> Result<()> {
        let sql = format!("DROP SCHEMA IF EXISTS {} CASCADE", self.thesaurus.schema);
        sqlx::query(&sql).execute(&self.pool).await?;

        info!(
            subsystem = "db",
            component = "concept_writer",
            op = "drop_thesaurus",
            thesaurus = %self.thesaurus.uri,
            schema = %self.thesaurus.schema,
            "Thesaurus schema dropped"
        );
        Ok(())
    }

    async fn update_thesaurus_properties(&self, thesaurus: &Thesaurus) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE {} SET name = $2, description = $3, version = $4, \
                 default_language = $5, state = $6, updated_at = now() \
             WHERE uri = $1",
            self.table("propriete_thesaurus"),
        );
        sqlx::query(&sql)
            .bind(&thesaurus.uri)
            .bind(&thesaurus.name)
            .bind(&thesaurus.description)
            .bind(&thesaurus.version)
            .bind(thesaurus.default_language.code())
            .bind(thesaurus.state.to_string())
            .execute(&mut *tx)
            .await?;

        let sql = format!("DELETE FROM {}", self.table("language"));
        sqlx::query(&sql).execute(&mut *tx).await?;
        for (position, language) in thesaurus.languages.iter().enumerate() {
            let sql = format!(
                "INSERT INTO {} (code, position) VALUES ($1, $2)",
                self.table("language"),
            );
            sqlx::query(&sql)
                .bind(language.code())
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
