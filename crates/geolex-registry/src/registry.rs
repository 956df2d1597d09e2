//! Registry of loaded thesauri with query fan-out.
//!
//! Every public operation fans out over the loaded stores applying three
//! independent filters — thesaurus-URI allow-list, language support,
//! enabled/disabled state — then concatenates the results. No
//! cross-thesaurus deduplication happens unless noted.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use geolex_core::{
    Concept, ConceptStore, IsoLanguage, Result, ScoredMatch, SearchMode,
};

/// Selection filter applied to the loaded thesauri before fan-out.
#[derive(Debug, Clone, Default)]
pub struct RegistryFilter {
    /// When set, only thesauri whose URI is in the list are queried.
    pub thesaurus_uris: Option<Vec<String>>,
    /// When set, only thesauri supporting this language are queried, and
    /// the language is passed down to every store operation.
    pub language: Option<IsoLanguage>,
    /// Disabled thesauri are excluded unless explicitly opted in.
    pub include_disabled: bool,
}

impl RegistryFilter {
    pub fn for_language(language: IsoLanguage) -> Self {
        Self {
            language: Some(language),
            ..Self::default()
        }
    }
}

/// Single query surface over all loaded thesauri.
pub struct ThesaurusRegistry {
    stores: Vec<Arc<dyn ConceptStore>>,
    /// `words` mutates a shared accumulator while iterating per-thesaurus;
    /// overlapping invocations are serialized.
    words_lock: Mutex<()>,
}

impl ThesaurusRegistry {
    pub fn new(stores: Vec<Arc<dyn ConceptStore>>) -> Self {
        Self {
            stores,
            words_lock: Mutex::new(()),
        }
    }

    pub fn stores(&self) -> &[Arc<dyn ConceptStore>] {
        &self.stores
    }

    /// Default match language: the first loaded thesaurus's first
    /// supported language.
    pub fn default_language(&self) -> Option<IsoLanguage> {
        self.stores
            .first()
            .and_then(|s| s.thesaurus().languages.first().cloned())
    }

    /// Stores passing the three selection filters.
    pub(crate) fn selected<'a>(
        &'a self,
        filter: &RegistryFilter,
    ) -> Vec<&'a Arc<dyn ConceptStore>> {
        self.stores
            .iter()
            .filter(|s| {
                let thesaurus = s.thesaurus();
                if !filter.include_disabled && !thesaurus.is_active() {
                    return false;
                }
                if let Some(uris) = &filter.thesaurus_uris {
                    if !uris.contains(&thesaurus.uri) {
                        return false;
                    }
                }
                if let Some(language) = &filter.language {
                    if !thesaurus.supports_language(language) {
                        return false;
                    }
                }
                true
            })
            .collect()
    }

    /// Resolve a concept URI in every selected thesaurus.
    pub async fn find_concept(&self, uri: &str, filter: &RegistryFilter) -> Result<Vec<Concept>> {
        let mut found = Vec::new();
        for store in self.selected(filter) {
            if let Some(concept) = store.read_concept(uri, false, filter.language.as_ref()).await? {
                found.push(concept);
            }
        }
        Ok(found)
    }

    /// Ranked label search across every selected thesaurus. Results are
    /// concatenated, not re-ranked across thesauri.
    pub async fn find_labels(
        &self,
        term: &str,
        filter: &RegistryFilter,
    ) -> Result<Vec<ScoredMatch>> {
        let mut matches = Vec::new();
        for store in self.selected(filter) {
            matches.extend(store.search(term, filter.language.as_ref()).await?);
        }
        Ok(matches)
    }

    /// Mode-parameterized concept search across every selected thesaurus.
    pub async fn search_concepts(
        &self,
        term: &str,
        mode: SearchMode,
        geometric: bool,
        themes: &[String],
        filter: &RegistryFilter,
    ) -> Result<Vec<Concept>> {
        let mut found = Vec::new();
        for store in self.selected(filter) {
            found.extend(
                store
                    .search_concepts(term, mode, geometric, themes, filter.language.as_ref())
                    .await?,
            );
        }
        Ok(found)
    }

    /// Bulk concept enumeration; the limit applies per thesaurus.
    pub async fn all_concepts(&self, limit: i64, filter: &RegistryFilter) -> Result<Vec<Concept>> {
        let mut concepts = Vec::new();
        for store in self.selected(filter) {
            concepts.extend(store.all_concepts(limit).await?);
        }
        Ok(concepts)
    }

    /// Top concepts across every selected thesaurus.
    pub async fn top_most_concepts(
        &self,
        themes: &[String],
        filter: &RegistryFilter,
    ) -> Result<Vec<Concept>> {
        let mut concepts = Vec::new();
        for store in self.selected(filter) {
            concepts.extend(store.top_most_concepts(themes).await?);
        }
        Ok(concepts)
    }

    /// Hierarchy roots across every selected thesaurus.
    pub async fn hierarchy_roots(
        &self,
        themes: &[String],
        filter: &RegistryFilter,
    ) -> Result<Vec<Concept>> {
        let mut concepts = Vec::new();
        for store in self.selected(filter) {
            concepts.extend(store.hierarchy_roots(themes).await?);
        }
        Ok(concepts)
    }

    /// Concepts related to `uri`, resolved within the thesaurus that
    /// answered the lookup.
    pub async fn related_concepts(
        &self,
        uri: &str,
        filter: &RegistryFilter,
    ) -> Result<Vec<Concept>> {
        let mut related = Vec::new();
        for store in self.selected(filter) {
            let Some(concept) = store.read_concept(uri, false, filter.language.as_ref()).await? else {
                continue;
            };
            for related_uri in &concept.related {
                if let Some(c) = store
                    .read_concept(related_uri, false, filter.language.as_ref())
                    .await?
                {
                    related.push(c);
                }
            }
        }
        Ok(related)
    }

    /// Aggregate word list across every selected thesaurus.
    ///
    /// Serialized with a mutex: the accumulator is shared across the
    /// per-thesaurus iteration and aggregate counts are logged once per
    /// invocation, so concurrent callers must not interleave.
    pub async fn words(&self, filter: &RegistryFilter) -> Result<Vec<String>> {
        let _guard = self.words_lock.lock().await;

        let mut buffer: Vec<String> = Vec::new();
        let mut per_thesaurus = Vec::new();
        for store in self.selected(filter) {
            let words = store.words(filter.language.as_ref()).await?;
            per_thesaurus.push((store.thesaurus().uri.clone(), words.len()));
            buffer.extend(words);
        }
        buffer.sort();
        buffer.dedup();

        info!(
            subsystem = "registry",
            component = "words",
            op = "aggregate",
            result_count = buffer.len(),
            thesaurus_count = per_thesaurus.len(),
            "word list aggregated"
        );
        Ok(buffer)
    }
}
