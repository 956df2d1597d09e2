//! Repository traits for the geolex concept store.
//!
//! These traits define the interfaces that concrete backends must satisfy,
//! enabling pluggable storage and testability. The ranked-search ladder,
//! the AUTO_SEARCH fallback chain, the cascade delete, and top-most
//! recomputation are provided methods: every backend supplies the storage
//! primitives and inherits identical tie-break, fallback, and
//! cycle-handling behavior.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::defaults::{DEFAULT_LANGUAGE, SKOS_CONCEPT_SCHEME_TYPE};
use crate::error::Result;
use crate::lang::{DiacriticRules, IsoLanguage};
use crate::models::{
    Concept, ConceptNode, FullConcept, KeywordCountFilter, LabelMatcher, LinkedService, Predicate,
    ScoredMatch, SearchMode, ShortConcept, Term, TermCount, TermHit, TermType, Thesaurus,
};

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Score assigned to each rung of the ranked-search ladder.
const SCORE_EXACT: f32 = 1.0;
const SCORE_CASE_INSENSITIVE: f32 = 0.9;
const SCORE_MISSPELLED: f32 = 0.8;
const SCORE_CONTAINS: f32 = 0.7;

// =============================================================================
// CONCEPT STORE (READ PATH)
// =============================================================================

/// Read path over one thesaurus's concept graph.
///
/// Implementations translate these primitives into storage access; the
/// multi-pass search algorithms are provided on top of them. All operations
/// return safe defaults (`None`, empty) for absence — "not found" is never
/// an error.
#[async_trait]
pub trait ConceptStore: Send + Sync {
    /// Metadata of the thesaurus this store reads.
    fn thesaurus(&self) -> &Thesaurus;

    /// Diacritic table used by the mis-spelled search strategy.
    fn diacritic_rules(&self) -> &DiacriticRules {
        DiacriticRules::builtin()
    }

    /// Load one fully-populated concept.
    ///
    /// A `uri` that parses as an integer requires an exact match; any other
    /// uri is matched with a `LIKE '%<uri>'` suffix pattern (legacy URIs
    /// embed a numeric local id inconsistently). When `with_geometry` is
    /// set, the associated GIS layer is loaded as well. Returns `None` when
    /// the concept has neither property nor term rows.
    async fn read_concept(
        &self,
        uri: &str,
        with_geometry: bool,
        language: Option<&IsoLanguage>,
    ) -> Result<Option<Concept>>;

    /// Load only the requested properties/relations, always including
    /// preferred labels. Returns `None` when the concept has no preferred
    /// label.
    async fn read_partial_concept(
        &self,
        uri: &str,
        properties: &[Predicate],
    ) -> Result<Option<Concept>>;

    /// One rung of the ranked-search ladder: match completion-table terms
    /// against `matcher`, optionally filtered by language.
    async fn find_terms(
        &self,
        matcher: &LabelMatcher,
        language: Option<&IsoLanguage>,
    ) -> Result<Vec<TermHit>>;

    /// One strategy of the mode-parameterized search; `mode` is never
    /// [`SearchMode::AutoSearch`] here. `geometric` restricts results to
    /// spatially-referenced concepts (non-null associated layer); a
    /// non-empty `themes` list restricts by `thesaurus_origine` tag.
    async fn search_concepts_mode(
        &self,
        term: &str,
        mode: SearchMode,
        geometric: bool,
        themes: &[String],
        language: Option<&IsoLanguage>,
    ) -> Result<Vec<Concept>>;

    /// Concepts referenced by `hasTopConcept` edges.
    async fn top_most_concepts(&self, themes: &[String]) -> Result<Vec<Concept>>;

    /// Concepts flagged as hierarchy roots.
    async fn hierarchy_roots(&self, themes: &[String]) -> Result<Vec<Concept>>;

    /// Bulk enumeration; `limit == -1` means unlimited. Order is the
    /// store's natural order.
    async fn all_concepts(&self, limit: i64) -> Result<Vec<Concept>>;

    /// All completion-group terms.
    async fn all_labels(&self, limit: i64, language: Option<&IsoLanguage>) -> Result<Vec<Term>>;

    /// Preferred labels only.
    async fn all_pref_labels(
        &self,
        limit: i64,
        language: Option<&IsoLanguage>,
    ) -> Result<Vec<Term>>;

    /// Distinct word list for a language.
    async fn words(&self, language: Option<&IsoLanguage>) -> Result<Vec<String>>;

    /// Direct children of a concept, each annotated with its own narrower
    /// count (single grouped query).
    async fn concept_narrowers(&self, uri: &str) -> Result<Vec<ConceptNode>>;

    /// Merged single-pass summary view; `None` when the concept has no
    /// outgoing or incoming rows.
    async fn full_concept(&self, uri: &str) -> Result<Option<FullConcept>>;

    // ─── Provided algorithms ───────────────────────────────────────────────

    /// Ranked exact-fallback search used for disambiguation.
    ///
    /// Runs an ordered sequence of strategies, stopping at the first one
    /// that yields at least one match:
    ///
    /// 1. exact case-sensitive match, score 1.0
    /// 2. exact case-insensitive match, score 0.9
    /// 3. diacritic-wildcard ("mis-spelled") match, score 0.8
    /// 4. substring match, score 0.7
    ///
    /// Ties are not broken: all matches at the winning strategy are
    /// returned.
    async fn search(
        &self,
        term: &str,
        language: Option<&IsoLanguage>,
    ) -> Result<Vec<ScoredMatch>> {
        let escaped = escape_like(term);

        let exact = self
            .find_terms(&LabelMatcher::Exact(term.to_string()), language)
            .await?;
        if !exact.is_empty() {
            return Ok(self.to_scored(exact, SCORE_EXACT));
        }

        let insensitive = self
            .find_terms(&LabelMatcher::ExactInsensitive(term.to_string()), language)
            .await?;
        if !insensitive.is_empty() {
            return Ok(self.to_scored(insensitive, SCORE_CASE_INSENSITIVE));
        }

        let misspelled = self.find_misspelled(&escaped, language).await?;
        if !misspelled.is_empty() {
            return Ok(self.to_scored(misspelled, SCORE_MISSPELLED));
        }

        let contains = self
            .find_terms(&LabelMatcher::Like(format!("%{}%", escaped)), language)
            .await?;
        if !contains.is_empty() {
            return Ok(self.to_scored(contains, SCORE_CONTAINS));
        }

        Ok(Vec::new())
    }

    /// Mis-spelled strategy: widen language-specific diacritics in the
    /// (already LIKE-escaped) term to wildcards. Without a language filter,
    /// every language of the thesaurus contributes its own pattern and the
    /// hits are unioned.
    async fn find_misspelled(
        &self,
        escaped_term: &str,
        language: Option<&IsoLanguage>,
    ) -> Result<Vec<TermHit>> {
        let rules = self.diacritic_rules();
        let languages: Vec<IsoLanguage> = match language {
            Some(l) => vec![l.clone()],
            None => self.thesaurus().languages.clone(),
        };

        let mut seen = HashSet::new();
        let mut hits = Vec::new();
        for lang in &languages {
            let Some(pattern) = rules.wildcard_pattern(escaped_term, lang) else {
                continue;
            };
            for hit in self
                .find_terms(&LabelMatcher::Like(pattern), language)
                .await?
            {
                if seen.insert((hit.concept_uri.clone(), hit.label.clone(), hit.language.clone()))
                {
                    hits.push(hit);
                }
            }
        }
        Ok(hits)
    }

    /// Mode-parameterized concept search. [`SearchMode::AutoSearch`] tries
    /// NO_WILD_CHAR, then `term%`, then `%term`, then `%term%`, stopping at
    /// the first non-empty result; any other mode runs only that strategy.
    /// Results are deduplicated by URI, preserving first-seen order.
    async fn search_concepts(
        &self,
        term: &str,
        mode: SearchMode,
        geometric: bool,
        themes: &[String],
        language: Option<&IsoLanguage>,
    ) -> Result<Vec<Concept>> {
        let found = match mode {
            SearchMode::AutoSearch => {
                let mut found = Vec::new();
                for attempt in SearchMode::AUTO_CHAIN {
                    found = self
                        .search_concepts_mode(term, attempt, geometric, themes, language)
                        .await?;
                    if !found.is_empty() {
                        debug!(
                            subsystem = "db",
                            component = "concept_store",
                            op = "search_concepts",
                            strategy = ?attempt,
                            result_count = found.len(),
                            "auto search resolved"
                        );
                        break;
                    }
                }
                found
            }
            single => {
                self.search_concepts_mode(term, single, geometric, themes, language)
                    .await?
            }
        };

        let mut seen = HashSet::new();
        Ok(found
            .into_iter()
            .filter(|c| seen.insert(c.uri.clone()))
            .collect())
    }

    /// Attach the winning score and the owning thesaurus to raw hits.
    fn to_scored(&self, hits: Vec<TermHit>, score: f32) -> Vec<ScoredMatch> {
        let thesaurus_uri = self.thesaurus().uri.clone();
        hits.into_iter()
            .map(|h| ScoredMatch {
                concept_uri: h.concept_uri,
                thesaurus_uri: thesaurus_uri.clone(),
                score,
                language: Some(h.language),
                label: h.label,
            })
            .collect()
    }
}

// =============================================================================
// CONCEPT WRITER (WRITE PATH)
// =============================================================================

/// Write path over one thesaurus's concept graph. Extends the read path:
/// the upsert and cascade algorithms reuse the store's read helpers.
///
/// Callers must serialize concurrent writes to the same thesaurus schema;
/// update logic is read-then-write.
#[async_trait]
pub trait ConceptWriter: ConceptStore {
    /// Insert a concept known to be absent: one triple per populated
    /// property and one term row per label value.
    async fn insert_concept(&self, concept: &Concept) -> Result<()>;

    /// Diff-apply a concept known to exist: scalar triples update in place,
    /// list-valued relation sets and terms are deleted and rewritten.
    async fn update_concept(&self, concept: &Concept) -> Result<()>;

    /// Remove all triples and terms of the concept, plus every triple
    /// elsewhere referencing its URI as object.
    async fn delete_concept(&self, uri: &str) -> Result<()>;

    /// URIs appearing in the triple table that are never the subject of a
    /// `broader` edge, excluding scheme-root concepts.
    async fn apparent_roots(&self) -> Result<Vec<String>>;

    /// Provision the thesaurus's schema: create tables, seed the language
    /// set and the property row.
    async fn provision(&self) -> Result<()>;

    /// Drop the thesaurus's schema and everything in it.
    async fn drop_thesaurus(&self) -> Result<()>;

    /// Rewrite the thesaurus metadata row.
    async fn update_thesaurus_properties(&self, thesaurus: &Thesaurus) -> Result<()>;

    // ─── Provided algorithms ───────────────────────────────────────────────

    /// Upsert: insert when [`ConceptStore::read_concept`] finds nothing,
    /// update otherwise.
    async fn write_concept(&self, concept: &Concept) -> Result<()> {
        if self.read_concept(&concept.uri, false, None).await?.is_some() {
            self.update_concept(concept).await
        } else {
            self.insert_concept(concept).await
        }
    }

    /// Recursive delete over the `narrower` tree, as an iterative worklist.
    ///
    /// A child whose broader set references any parent other than the one
    /// being removed survives (the cascade stops at shared nodes). The
    /// visited set bounds traversal on cyclic graphs. Returns the number of
    /// concepts removed.
    async fn delete_concept_cascade(&self, concept: &Concept) -> Result<u64> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<String> = vec![concept.uri.clone()];
        let mut removed = 0u64;

        while let Some(uri) = stack.pop() {
            if !visited.insert(uri.clone()) {
                debug!(
                    subsystem = "db",
                    component = "concept_writer",
                    op = "delete_concept_cascade",
                    concept_uri = %uri,
                    "cycle bounded"
                );
                continue;
            }

            let narrower = match self
                .read_partial_concept(&uri, &[Predicate::Narrower])
                .await?
            {
                Some(c) => c.narrower,
                None => Vec::new(),
            };

            for child_uri in narrower {
                if visited.contains(&child_uri) {
                    continue;
                }
                let Some(child) = self
                    .read_partial_concept(&child_uri, &[Predicate::Broader])
                    .await?
                else {
                    continue;
                };
                let shared = child.broader.iter().any(|parent| parent != &uri);
                if !shared {
                    stack.push(child_uri);
                }
            }

            self.delete_concept(&uri).await?;
            removed += 1;
        }

        Ok(removed)
    }

    /// Recovery/repair: synthesize a scheme-root concept whose
    /// `hasTopConcept` set is exactly the apparent roots, and write it.
    /// Used to rebuild a consistent top level after bulk imports.
    async fn compute_top_most_concept(&self) -> Result<Concept> {
        let roots = self.apparent_roots().await?;

        let mut scheme = Concept::new(format!("urn:geolex:scheme:{}", Uuid::new_v4()));
        scheme.concept_type = Some(SKOS_CONCEPT_SCHEME_TYPE.to_string());
        scheme.hierarchy_root = true;
        scheme.hierarchy_root_type = Some(SKOS_CONCEPT_SCHEME_TYPE.to_string());
        scheme.has_top_concept = roots;

        self.write_concept(&scheme).await?;
        Ok(scheme)
    }
}

// =============================================================================
// TERM COUNT STORE (AUX TABLES)
// =============================================================================

/// Persistence for the cross-thesaurus aggregation tables
/// (`term_count`, `aggregated_identifier`, `linked_service`).
#[async_trait]
pub trait TermCountStore: Send + Sync {
    /// Drop every count previously computed for a service. Returns the
    /// number of rows removed.
    async fn clear_counts(&self, service_id: i32) -> Result<u64>;

    /// Persist one concept's count together with its merged identifier set.
    async fn save_count(&self, count: &TermCount, identifiers: &[String]) -> Result<()>;

    /// Query persisted counts by keyword with CSW/theme filters and the
    /// aggregated-vs-raw toggle.
    async fn counts_by_keyword(&self, filter: &KeywordCountFilter) -> Result<Vec<TermCount>>;

    /// The identifier set persisted for one concept under one service.
    async fn identifiers_for(&self, service_id: i32, concept_uri: &str) -> Result<Vec<String>>;

    /// All registered remote catalog endpoints.
    async fn linked_services(&self) -> Result<Vec<LinkedService>>;

    /// Register a remote catalog endpoint.
    async fn register_service(
        &self,
        url: &str,
        name: Option<&str>,
        is_csw: bool,
    ) -> Result<LinkedService>;

    // ─── Provided ──────────────────────────────────────────────────────────

    /// Keyword view joining each matching count with its persisted
    /// identifier set, as [`ShortConcept`] summaries.
    async fn keyword_summary(&self, filter: &KeywordCountFilter) -> Result<Vec<ShortConcept>> {
        let counts = self.counts_by_keyword(filter).await?;
        let mut summaries = Vec::with_capacity(counts.len());
        for count in counts {
            let identifiers = self
                .identifiers_for(count.service_id, &count.concept_uri)
                .await?;
            let language = count
                .language
                .clone()
                .unwrap_or_else(|| IsoLanguage::new(DEFAULT_LANGUAGE));
            summaries.push(ShortConcept {
                uri: count.concept_uri.clone(),
                label: Some(Term::new(count.label.clone(), language, TermType::PrefLabel)),
                identifiers,
                count: if filter.aggregated {
                    count.aggregated_count
                } else {
                    count.count
                },
            });
        }
        Ok(summaries)
    }
}

// =============================================================================
// CATALOG CLIENT
// =============================================================================

/// One remote catalog endpoint speaking the search-and-retrieve protocol.
///
/// Implementations issue a single query per label and return the matching
/// record identifiers. Errors are the caller's to absorb: the counting pass
/// logs them and treats the term as having zero matches.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Endpoint URL this client talks to.
    fn endpoint(&self) -> &str;

    /// Identifiers of catalog records matching `label`.
    async fn record_identifiers(&self, label: &str) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_strategy_scores_are_ordered() {
        assert!(SCORE_EXACT > SCORE_CASE_INSENSITIVE);
        assert!(SCORE_CASE_INSENSITIVE > SCORE_MISSPELLED);
        assert!(SCORE_MISSPELLED > SCORE_CONTAINS);
    }
}
