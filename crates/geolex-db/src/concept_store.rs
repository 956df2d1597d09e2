//! PostgreSQL concept store: the read path of a thesaurus repository.
//!
//! Translates concept-graph reads into parameterized SQL against the
//! thesaurus's schema and rehydrates [`Concept`] objects by folding triple
//! rows through the fixed predicate vocabulary. Storage failures on read
//! paths are logged and absorbed into safe defaults; absence is always a
//! `None`/empty return, never an error.

use sqlx::{PgPool, Row};
use tracing::warn;

use geolex_core::{
    escape_like, Concept, ConceptNode, ConceptStore, DiacriticRules, FullConcept, IsoLanguage,
    LabelMatcher, Predicate, Result, SearchMode, Term, TermType, Thesaurus,
};

use crate::schema_validation::validate_schema_name;

/// Repository over one thesaurus's schema.
///
/// Implements both [`ConceptStore`] (this module) and
/// [`geolex_core::ConceptWriter`] (see `concept_writer`). The schema name
/// is validated at construction and treated as a trusted identifier in
/// every query built afterwards; all values go through bind parameters.
#[derive(Clone)]
pub struct PgThesaurusRepository {
    pub(crate) pool: PgPool,
    pub(crate) thesaurus: Thesaurus,
    rules: DiacriticRules,
}

/// Match strictness for a concept URI lookup.
///
/// Legacy URIs embed a numeric local id inconsistently: a lookup key that
/// parses as an integer must match exactly, anything else is matched as a
/// suffix pattern.
pub(crate) enum UriMatch {
    Exact(String),
    Suffix(String),
}

impl UriMatch {
    pub(crate) fn for_uri(uri: &str) -> Self {
        if uri.parse::<i64>().is_ok() {
            Self::Exact(uri.to_string())
        } else {
            Self::Suffix(format!("%{}", escape_like(uri)))
        }
    }

    /// SQL comparison fragment for `column`, binding position `$n`.
    pub(crate) fn clause(&self, column: &str, n: usize) -> String {
        match self {
            Self::Exact(_) => format!("{column} = ${n}"),
            Self::Suffix(_) => format!("{column} LIKE ${n}"),
        }
    }

    pub(crate) fn value(&self) -> &str {
        match self {
            Self::Exact(v) | Self::Suffix(v) => v,
        }
    }
}

impl PgThesaurusRepository {
    /// Create a repository for a thesaurus.
    ///
    /// Fails immediately when the schema name contains forbidden
    /// characters; a repository is never constructed over an unvalidated
    /// namespace.
    pub fn new(pool: PgPool, thesaurus: Thesaurus) -> Result<Self> {
        validate_schema_name(&thesaurus.schema)?;
        Ok(Self {
            pool,
            thesaurus,
            rules: DiacriticRules::builtin().clone(),
        })
    }

    /// Override the diacritic substitution table used by the mis-spelled
    /// search strategy.
    pub fn with_diacritic_rules(mut self, rules: DiacriticRules) -> Self {
        self.rules = rules;
        self
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Schema-qualified table name. The schema was validated at
    /// construction.
    pub(crate) fn table(&self, name: &str) -> String {
        format!("{}.{}", self.thesaurus.schema, name)
    }

    fn log_read_failure(&self, op: &'static str, err: &sqlx::Error) {
        warn!(
            subsystem = "db",
            component = "concept_store",
            op = op,
            thesaurus = %self.thesaurus.uri,
            error = %err,
            "storage error absorbed, returning safe default"
        );
    }

    /// Term rows for one concept from one term table.
    async fn load_terms(
        &self,
        table: &str,
        uri: &UriMatch,
        language: Option<&IsoLanguage>,
        kind_filter: Option<TermType>,
    ) -> std::result::Result<Vec<(String, Term)>, sqlx::Error> {
        let mut sql = format!(
            "SELECT concept_uri, text, thesaurus_origine, language, term_type \
             FROM {} WHERE {}",
            self.table(table),
            uri.clause("concept_uri", 1),
        );
        let mut n = 1;
        if language.is_some() {
            n += 1;
            sql.push_str(&format!(" AND language = ${n}"));
        }
        if kind_filter.is_some() {
            n += 1;
            sql.push_str(&format!(" AND term_type = ${n}"));
        }

        let mut query = sqlx::query(&sql).bind(uri.value());
        if let Some(lang) = language {
            query = query.bind(lang.code());
        }
        if let Some(kind) = kind_filter {
            query = query.bind(kind.to_string());
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let kind: String = row.get("term_type");
                let kind = match kind.parse::<TermType>() {
                    Ok(k) => k,
                    Err(_) => {
                        warn!(
                            subsystem = "db",
                            component = "concept_store",
                            op = "load_terms",
                            "unknown term type '{}' skipped",
                            kind
                        );
                        return None;
                    }
                };
                let mut term = Term::new(
                    row.get::<String, _>("text"),
                    IsoLanguage::new(&row.get::<String, _>("language")),
                    kind,
                );
                term.theme = row.get("thesaurus_origine");
                Some((row.get("concept_uri"), term))
            })
            .collect())
    }

    /// Triple rows for one concept, optionally restricted to a predicate
    /// subset.
    async fn load_triples(
        &self,
        uri: &UriMatch,
        predicates: Option<&[Predicate]>,
    ) -> std::result::Result<Vec<(String, Predicate, String)>, sqlx::Error> {
        let mut sql = format!(
            "SELECT subject, predicate, object FROM {} WHERE {}",
            self.table("triple"),
            uri.clause("subject", 1),
        );
        if predicates.is_some() {
            sql.push_str(" AND predicate = ANY($2)");
        }

        let mut query = sqlx::query(&sql).bind(uri.value());
        if let Some(preds) = predicates {
            let uris: Vec<String> = preds.iter().map(|p| p.uri().to_string()).collect();
            query = query.bind(uris);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let predicate: String = row.get("predicate");
                match Predicate::from_uri(&predicate) {
                    Some(p) => Some((row.get("subject"), p, row.get("object"))),
                    None => {
                        warn!(
                            subsystem = "db",
                            component = "concept_store",
                            op = "load_triples",
                            "unknown predicate '{}' skipped",
                            predicate
                        );
                        None
                    }
                }
            })
            .collect())
    }

    /// Load fully-populated concepts for a list of canonical URIs, skipping
    /// any that vanished between queries.
    async fn load_concepts(
        &self,
        uris: Vec<String>,
        with_geometry: bool,
        language: Option<&IsoLanguage>,
    ) -> Result<Vec<Concept>> {
        let mut out = Vec::with_capacity(uris.len());
        for uri in uris {
            if let Some(concept) = self.read_concept(&uri, with_geometry, language).await? {
                out.push(concept);
            }
        }
        Ok(out)
    }

    /// Lexicographically first subject among the matched rows.
    fn canonical_uri(
        triples: &[(String, Predicate, String)],
        completion: &[(String, Term)],
        localisation: &[(String, Term)],
    ) -> Option<String> {
        triples
            .iter()
            .map(|(s, _, _)| s)
            .chain(completion.iter().map(|(u, _)| u))
            .chain(localisation.iter().map(|(u, _)| u))
            .min()
            .cloned()
    }

    /// Build the theme restriction clause when a theme list is supplied.
    fn theme_clause(column: &str, themes: &[String], n: usize, table: &str) -> Option<String> {
        if themes.is_empty() {
            None
        } else {
            Some(format!(
                "EXISTS (SELECT 1 FROM {table} th WHERE th.concept_uri = {column} \
                 AND th.thesaurus_origine = ANY(${n}))"
            ))
        }
    }
}

#[async_trait::async_trait]
impl ConceptStore for PgThesaurusRepository {
    fn thesaurus(&self) -> &Thesaurus {
        &self.thesaurus
    }

    fn diacritic_rules(&self) -> &DiacriticRules {
        &self.rules
    }

    async fn read_concept(
        &self,
        uri: &str,
        with_geometry: bool,
        language: Option<&IsoLanguage>,
    ) -> Result<Option<Concept>> {
        let matcher = UriMatch::for_uri(uri);

        let completion = match self
            .load_terms("terme_completion", &matcher, language, None)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("read_concept", &e);
                return Ok(None);
            }
        };
        let localisation = match self
            .load_terms("terme_localisation", &matcher, language, None)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("read_concept", &e);
                return Ok(None);
            }
        };
        let triples = match self.load_triples(&matcher, None).await {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("read_concept", &e);
                return Ok(None);
            }
        };

        if completion.is_empty() && localisation.is_empty() && triples.is_empty() {
            return Ok(None);
        }

        // Canonical URI comes from the matched rows, not the lookup key: a
        // suffix match may have resolved a longer stored URI, and an
        // ambiguous pattern resolves to the lexicographically first one.
        // Rows of other subjects are dropped, never folded together.
        let canonical = Self::canonical_uri(&triples, &completion, &localisation)
            .unwrap_or_else(|| uri.to_string());

        let mut concept = Concept::new(canonical.clone());
        for (subject, term) in completion.into_iter().chain(localisation) {
            if subject != canonical {
                continue;
            }
            if concept.theme.is_none() {
                concept.theme = term.theme.clone();
            }
            concept.add_term(term);
        }
        for (subject, predicate, object) in triples {
            if subject != canonical {
                continue;
            }
            concept.apply_triple(predicate, object);
        }

        // In-scheme hint when the concept originates outside this
        // thesaurus's own schema.
        if concept.in_scheme.is_none() {
            if let Some(theme) = &concept.theme {
                if theme != &self.thesaurus.schema {
                    concept.in_scheme = Some(theme.clone());
                }
            }
        }

        if with_geometry {
            let sql = format!(
                "SELECT layer FROM {} WHERE concept_uri = $1",
                self.table("couche_associee"),
            );
            match sqlx::query(&sql)
                .bind(&concept.uri)
                .fetch_optional(&self.pool)
                .await
            {
                Ok(row) => concept.associated_layer = row.and_then(|r| r.get("layer")),
                Err(e) => self.log_read_failure("read_concept", &e),
            }
        }

        Ok(Some(concept))
    }

    async fn read_partial_concept(
        &self,
        uri: &str,
        properties: &[Predicate],
    ) -> Result<Option<Concept>> {
        let matcher = UriMatch::for_uri(uri);

        let pref_labels = match self
            .load_terms(
                "terme_completion",
                &matcher,
                None,
                Some(TermType::PrefLabel),
            )
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("read_partial_concept", &e);
                return Ok(None);
            }
        };

        // A concept without a preferred label does not exist for callers
        // that only need summaries.
        if pref_labels.is_empty() {
            return Ok(None);
        }

        let triples = match self.load_triples(&matcher, Some(properties)).await {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("read_partial_concept", &e);
                return Ok(None);
            }
        };

        let canonical = pref_labels
            .iter()
            .map(|(u, _)| u.clone())
            .min()
            .unwrap_or_else(|| uri.to_string());
        let mut concept = Concept::new(canonical.clone());
        for (subject, term) in pref_labels {
            if subject == canonical {
                concept.add_term(term);
            }
        }
        for (subject, predicate, object) in triples {
            if subject == canonical {
                concept.apply_triple(predicate, object);
            }
        }

        Ok(Some(concept))
    }

    async fn find_terms(
        &self,
        matcher: &LabelMatcher,
        language: Option<&IsoLanguage>,
    ) -> Result<Vec<geolex_core::TermHit>> {
        let (condition, value) = match matcher {
            LabelMatcher::Exact(v) => ("text = $1", v.clone()),
            LabelMatcher::ExactInsensitive(v) => ("LOWER(text) = LOWER($1)", v.clone()),
            LabelMatcher::Like(pattern) => ("text ILIKE $1", pattern.clone()),
        };

        let mut sql = format!(
            "SELECT concept_uri, text, language FROM {} WHERE {}",
            self.table("terme_completion"),
            condition,
        );
        if language.is_some() {
            sql.push_str(" AND language = $2");
        }

        let mut query = sqlx::query(&sql).bind(value);
        if let Some(lang) = language {
            query = query.bind(lang.code());
        }

        let rows = match query.fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("find_terms", &e);
                return Ok(Vec::new());
            }
        };

        Ok(rows
            .into_iter()
            .map(|row| geolex_core::TermHit {
                concept_uri: row.get("concept_uri"),
                label: row.get("text"),
                language: IsoLanguage::new(&row.get::<String, _>("language")),
            })
            .collect())
    }

    async fn search_concepts_mode(
        &self,
        term: &str,
        mode: SearchMode,
        geometric: bool,
        themes: &[String],
        language: Option<&IsoLanguage>,
    ) -> Result<Vec<Concept>> {
        let escaped = escape_like(term);
        let pattern = match mode {
            SearchMode::NoWildChar => escaped,
            SearchMode::PrefixRegex => format!("{escaped}%"),
            SearchMode::SuffixRegex => format!("%{escaped}"),
            SearchMode::PrefixSuffixRegex => format!("%{escaped}%"),
            SearchMode::AutoSearch => {
                // The fallback chain is driven by the provided
                // ConceptStore::search_concepts; a single strategy never
                // receives AutoSearch.
                return Ok(Vec::new());
            }
        };

        let mut sql = format!(
            "SELECT DISTINCT tc.concept_uri FROM {} tc",
            self.table("terme_completion"),
        );
        if geometric {
            sql.push_str(&format!(
                " JOIN {} ca ON ca.concept_uri = tc.concept_uri AND ca.layer IS NOT NULL",
                self.table("couche_associee"),
            ));
        }
        sql.push_str(" WHERE tc.text ILIKE $1");
        let mut n = 1;
        if language.is_some() {
            n += 1;
            sql.push_str(&format!(" AND tc.language = ${n}"));
        }
        if !themes.is_empty() {
            n += 1;
            sql.push_str(&format!(" AND tc.thesaurus_origine = ANY(${n})"));
        }

        let mut query = sqlx::query(&sql).bind(pattern);
        if let Some(lang) = language {
            query = query.bind(lang.code());
        }
        if !themes.is_empty() {
            query = query.bind(themes.to_vec());
        }

        let rows = match query.fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("search_concepts_mode", &e);
                return Ok(Vec::new());
            }
        };

        let uris: Vec<String> = rows.into_iter().map(|r| r.get("concept_uri")).collect();
        self.load_concepts(uris, geometric, language).await
    }

    async fn top_most_concepts(&self, themes: &[String]) -> Result<Vec<Concept>> {
        let mut sql = format!(
            "SELECT DISTINCT t.object FROM {} t WHERE t.predicate = $1",
            self.table("triple"),
        );
        if let Some(clause) =
            Self::theme_clause("t.object", themes, 2, &self.table("terme_completion"))
        {
            sql.push_str(" AND ");
            sql.push_str(&clause);
        }

        let mut query = sqlx::query(&sql).bind(Predicate::HasTopConcept.uri());
        if !themes.is_empty() {
            query = query.bind(themes.to_vec());
        }

        let rows = match query.fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("top_most_concepts", &e);
                return Ok(Vec::new());
            }
        };

        let uris: Vec<String> = rows.into_iter().map(|r| r.get("object")).collect();
        self.load_concepts(uris, false, None).await
    }

    async fn hierarchy_roots(&self, themes: &[String]) -> Result<Vec<Concept>> {
        let mut sql = format!(
            "SELECT DISTINCT t.subject FROM {} t \
             WHERE t.predicate = $1 AND t.object = 'true'",
            self.table("triple"),
        );
        if let Some(clause) =
            Self::theme_clause("t.subject", themes, 2, &self.table("terme_completion"))
        {
            sql.push_str(" AND ");
            sql.push_str(&clause);
        }

        let mut query = sqlx::query(&sql).bind(Predicate::HierarchyRoot.uri());
        if !themes.is_empty() {
            query = query.bind(themes.to_vec());
        }

        let rows = match query.fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("hierarchy_roots", &e);
                return Ok(Vec::new());
            }
        };

        let uris: Vec<String> = rows.into_iter().map(|r| r.get("subject")).collect();
        self.load_concepts(uris, false, None).await
    }

    async fn all_concepts(&self, limit: i64) -> Result<Vec<Concept>> {
        let mut sql = format!(
            "SELECT DISTINCT subject FROM {} ORDER BY subject",
            self.table("triple"),
        );
        if limit >= 0 {
            sql.push_str(" LIMIT $1");
        }

        let mut query = sqlx::query(&sql);
        if limit >= 0 {
            query = query.bind(limit);
        }

        let rows = match query.fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("all_concepts", &e);
                return Ok(Vec::new());
            }
        };

        let uris: Vec<String> = rows.into_iter().map(|r| r.get("subject")).collect();
        self.load_concepts(uris, false, None).await
    }

    async fn all_labels(&self, limit: i64, language: Option<&IsoLanguage>) -> Result<Vec<Term>> {
        self.enumerate_labels(limit, language, None).await
    }

    async fn all_pref_labels(
        &self,
        limit: i64,
        language: Option<&IsoLanguage>,
    ) -> Result<Vec<Term>> {
        self.enumerate_labels(limit, language, Some(TermType::PrefLabel))
            .await
    }

    async fn words(&self, language: Option<&IsoLanguage>) -> Result<Vec<String>> {
        let labels = self.all_labels(geolex_core::defaults::NO_LIMIT, language).await?;
        let mut words: Vec<String> = labels
            .iter()
            .flat_map(|t| t.text.split_whitespace())
            .map(|w| w.to_lowercase())
            .collect();
        words.sort();
        words.dedup();
        Ok(words)
    }

    async fn concept_narrowers(&self, uri: &str) -> Result<Vec<ConceptNode>> {
        let sql = format!(
            "SELECT t.object AS uri, \
                    (SELECT COUNT(*) FROM {triple} n \
                       WHERE n.subject = t.object AND n.predicate = $2) AS narrower_count, \
                    (SELECT tc.text FROM {terms} tc \
                       WHERE tc.concept_uri = t.object AND tc.term_type = $3 \
                       ORDER BY tc.language LIMIT 1) AS label \
             FROM {triple} t \
             WHERE t.subject = $1 AND t.predicate = $2",
            triple = self.table("triple"),
            terms = self.table("terme_completion"),
        );

        let rows = match sqlx::query(&sql)
            .bind(uri)
            .bind(Predicate::Narrower.uri())
            .bind(TermType::PrefLabel.to_string())
            .fetch_all(&self.pool)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("concept_narrowers", &e);
                return Ok(Vec::new());
            }
        };

        Ok(rows
            .into_iter()
            .map(|row| ConceptNode {
                uri: row.get("uri"),
                label: row.get("label"),
                narrower_count: row.get("narrower_count"),
            })
            .collect())
    }

    async fn full_concept(&self, uri: &str) -> Result<Option<FullConcept>> {
        let matcher = UriMatch::for_uri(uri);

        let completion = match self
            .load_terms("terme_completion", &matcher, None, None)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("full_concept", &e);
                return Ok(None);
            }
        };
        let localisation = match self
            .load_terms("terme_localisation", &matcher, None, None)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("full_concept", &e);
                return Ok(None);
            }
        };
        let triples = match self
            .load_triples(
                &matcher,
                Some(&[
                    Predicate::Broader,
                    Predicate::Narrower,
                    Predicate::Related,
                ]),
            )
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("full_concept", &e);
                return Ok(None);
            }
        };

        let canonical = Self::canonical_uri(&triples, &completion, &localisation)
            .unwrap_or_else(|| uri.to_string());

        // Top-concept status comes from incoming hasTopConcept edges.
        let incoming_sql = format!(
            "SELECT COUNT(*) AS n, \
                    COUNT(*) FILTER (WHERE predicate = $2) AS top_n \
             FROM {} WHERE object = $1",
            self.table("triple"),
        );
        let incoming = match sqlx::query(&incoming_sql)
            .bind(&canonical)
            .bind(Predicate::HasTopConcept.uri())
            .fetch_one(&self.pool)
            .await
        {
            Ok(row) => row,
            Err(e) => {
                self.log_read_failure("full_concept", &e);
                return Ok(None);
            }
        };
        let incoming_count: i64 = incoming.get("n");
        let top_concept: i64 = incoming.get("top_n");

        if completion.is_empty()
            && localisation.is_empty()
            && triples.is_empty()
            && incoming_count == 0
        {
            return Ok(None);
        }

        let mut full = FullConcept {
            uri: canonical.clone(),
            terms: completion
                .into_iter()
                .chain(localisation)
                .filter(|(subject, _)| subject == &canonical)
                .map(|(_, t)| t)
                .collect(),
            top_concept: top_concept > 0,
            broader: Vec::new(),
            narrower: Vec::new(),
            related: Vec::new(),
        };
        for (subject, predicate, object) in triples {
            if subject != canonical {
                continue;
            }
            match predicate {
                Predicate::Broader => full.broader.push(object),
                Predicate::Narrower => full.narrower.push(object),
                Predicate::Related => full.related.push(object),
                _ => {}
            }
        }

        Ok(Some(full))
    }
}

impl PgThesaurusRepository {
    async fn enumerate_labels(
        &self,
        limit: i64,
        language: Option<&IsoLanguage>,
        kind: Option<TermType>,
    ) -> Result<Vec<Term>> {
        let mut sql = format!(
            "SELECT text, thesaurus_origine, language, term_type FROM {}",
            self.table("terme_completion"),
        );
        let mut clauses = Vec::new();
        let mut n = 0;
        if kind.is_some() {
            n += 1;
            clauses.push(format!("term_type = ${n}"));
        }
        if language.is_some() {
            n += 1;
            clauses.push(format!("language = ${n}"));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY text");
        if limit >= 0 {
            n += 1;
            sql.push_str(&format!(" LIMIT ${n}"));
        }

        let mut query = sqlx::query(&sql);
        if let Some(k) = kind {
            query = query.bind(k.to_string());
        }
        if let Some(lang) = language {
            query = query.bind(lang.code());
        }
        if limit >= 0 {
            query = query.bind(limit);
        }

        let rows = match query.fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(e) => {
                self.log_read_failure("enumerate_labels", &e);
                return Ok(Vec::new());
            }
        };

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let kind = row.get::<String, _>("term_type").parse::<TermType>().ok()?;
                let mut term = Term::new(
                    row.get::<String, _>("text"),
                    IsoLanguage::new(&row.get::<String, _>("language")),
                    kind,
                );
                term.theme = row.get("thesaurus_origine");
                Some(term)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_match_numeric_is_exact() {
        match UriMatch::for_uri("4217") {
            UriMatch::Exact(v) => assert_eq!(v, "4217"),
            _ => panic!("numeric uri must match exactly"),
        }
    }

    #[test]
    fn test_uri_match_opaque_is_suffix() {
        match UriMatch::for_uri("urn:c:1") {
            UriMatch::Suffix(v) => assert_eq!(v, "%urn:c:1"),
            _ => panic!("opaque uri must suffix-match"),
        }
    }

    #[test]
    fn test_uri_match_escapes_like_metacharacters() {
        match UriMatch::for_uri("urn:c:100%") {
            UriMatch::Suffix(v) => assert_eq!(v, "%urn:c:100\\%"),
            _ => panic!("opaque uri must suffix-match"),
        }
    }

    #[test]
    fn test_uri_match_clause() {
        let exact = UriMatch::for_uri("42");
        assert_eq!(exact.clause("subject", 1), "subject = $1");
        let suffix = UriMatch::for_uri("urn:c:42x");
        assert_eq!(suffix.clause("concept_uri", 3), "concept_uri LIKE $3");
    }
}
