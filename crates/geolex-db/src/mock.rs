//! In-memory mock repository for deterministic testing.
//!
//! [`MemoryThesaurus`] implements the full [`ConceptStore`] and
//! [`ConceptWriter`] traits over a hash map, so the shared trait algorithms
//! (ranked-search ladder, AUTO_SEARCH fallback, cascade delete, top-most
//! recomputation) execute in unit tests without a live database. Every
//! storage primitive appends to a call log, which lets tests assert which
//! strategies ran and in what order.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use geolex_core::defaults::SKOS_CONCEPT_SCHEME_TYPE;
use geolex_core::{
    Concept, ConceptNode, ConceptStore, ConceptWriter, CswScope, DiacriticRules, FullConcept,
    IsoLanguage, KeywordCountFilter, LabelMatcher, LinkedService, Predicate, Result, SearchMode,
    Term, TermCount, TermCountStore, TermHit, TermType, Thesaurus,
};

/// One recorded storage-primitive invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    /// Primitive name, e.g. `"find_terms"`.
    pub op: &'static str,
    /// Primitive-specific detail, e.g. the matcher kind or search mode.
    pub detail: String,
}

#[derive(Default)]
struct MemoryState {
    concepts: HashMap<String, Concept>,
    /// Associated GIS layer per concept URI.
    layers: HashMap<String, String>,
}

/// Deterministic in-memory thesaurus store.
pub struct MemoryThesaurus {
    thesaurus: Thesaurus,
    rules: DiacriticRules,
    state: Mutex<MemoryState>,
    calls: Mutex<Vec<StoreCall>>,
}

impl MemoryThesaurus {
    pub fn new(thesaurus: Thesaurus) -> Self {
        Self {
            thesaurus,
            rules: DiacriticRules::builtin().clone(),
            state: Mutex::new(MemoryState::default()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_diacritic_rules(mut self, rules: DiacriticRules) -> Self {
        self.rules = rules;
        self
    }

    /// Seed a concept directly, bypassing the writer path.
    pub fn seed(&self, concept: Concept) {
        self.state
            .lock()
            .unwrap()
            .concepts
            .insert(concept.uri.clone(), concept);
    }

    /// Attach an associated GIS layer to a concept.
    pub fn set_geometric(&self, uri: &str) {
        self.set_layer(uri, "default_layer");
    }

    pub fn set_layer(&self, uri: &str, layer: &str) {
        self.state
            .lock()
            .unwrap()
            .layers
            .insert(uri.to_string(), layer.to_string());
    }

    /// All recorded primitive invocations, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded invocations of one primitive.
    pub fn calls_for(&self, op: &str) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.op == op)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.state.lock().unwrap().concepts.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, op: &'static str, detail: impl Into<String>) {
        self.calls.lock().unwrap().push(StoreCall {
            op,
            detail: detail.into(),
        });
    }

    /// Resolve a lookup key using the store's match strictness: integer
    /// keys match exactly, anything else matches as a suffix. Ambiguous
    /// suffix matches resolve to the lexicographically first URI.
    fn resolve(&self, state: &MemoryState, uri: &str) -> Option<String> {
        if uri.parse::<i64>().is_ok() {
            return state.concepts.contains_key(uri).then(|| uri.to_string());
        }
        let mut matches: Vec<&String> = state
            .concepts
            .keys()
            .filter(|k| k.ends_with(uri))
            .collect();
        matches.sort();
        matches.first().map(|s| s.to_string())
    }

    fn completion_terms(concept: &Concept) -> Vec<&Term> {
        concept
            .pref_labels
            .iter()
            .chain(&concept.alt_labels)
            .chain(&concept.labels)
            .collect()
    }
}

/// Case-insensitive SQL-LIKE matcher supporting `%`, `_`, and
/// backslash-escaped literals.
pub fn like_match(pattern: &str, text: &str) -> bool {
    fn matches(p: &[char], t: &[char]) -> bool {
        match p.first() {
            None => t.is_empty(),
            Some('%') => (0..=t.len()).any(|i| matches(&p[1..], &t[i..])),
            Some('_') => !t.is_empty() && matches(&p[1..], &t[1..]),
            Some('\\') => match p.get(1) {
                Some(&c) => !t.is_empty() && t[0] == c && matches(&p[2..], &t[1..]),
                None => false,
            },
            Some(&c) => !t.is_empty() && t[0] == c && matches(&p[1..], &t[1..]),
        }
    }
    let p: Vec<char> = pattern.to_lowercase().chars().collect();
    let t: Vec<char> = text.to_lowercase().chars().collect();
    matches(&p, &t)
}

#[async_trait]
impl ConceptStore for MemoryThesaurus {
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
        self.record("read_concept", uri);
        let state = self.state.lock().unwrap();
        let Some(key) = self.resolve(&state, uri) else {
            return Ok(None);
        };
        let mut concept = state.concepts[&key].clone();
        if with_geometry {
            concept.associated_layer = state.layers.get(&key).cloned();
        }
        if let Some(lang) = language {
            let keep = |terms: &mut Vec<Term>| terms.retain(|t| &t.language == lang);
            keep(&mut concept.pref_labels);
            keep(&mut concept.alt_labels);
            keep(&mut concept.labels);
            keep(&mut concept.definitions);
            keep(&mut concept.scope_notes);
            keep(&mut concept.history_notes);
            keep(&mut concept.examples);
        }
        Ok(Some(concept))
    }

    async fn read_partial_concept(
        &self,
        uri: &str,
        properties: &[Predicate],
    ) -> Result<Option<Concept>> {
        self.record("read_partial_concept", uri);
        let state = self.state.lock().unwrap();
        let Some(key) = self.resolve(&state, uri) else {
            return Ok(None);
        };
        let full = &state.concepts[&key];
        if full.pref_labels.is_empty() {
            return Ok(None);
        }

        let mut partial = Concept::new(full.uri.clone());
        partial.pref_labels = full.pref_labels.clone();
        for predicate in properties {
            match predicate {
                Predicate::Broader => partial.broader = full.broader.clone(),
                Predicate::Narrower => partial.narrower = full.narrower.clone(),
                Predicate::Related => partial.related = full.related.clone(),
                Predicate::NarrowerTransitive => {
                    partial.narrower_transitive = full.narrower_transitive.clone()
                }
                Predicate::HasTopConcept => {
                    partial.has_top_concept = full.has_top_concept.clone()
                }
                Predicate::Type => partial.concept_type = full.concept_type.clone(),
                Predicate::HierarchyRoot => partial.hierarchy_root = full.hierarchy_root,
                Predicate::HierarchyRootType => {
                    partial.hierarchy_root_type = full.hierarchy_root_type.clone()
                }
                _ => {}
            }
        }
        Ok(Some(partial))
    }

    async fn find_terms(
        &self,
        matcher: &LabelMatcher,
        language: Option<&IsoLanguage>,
    ) -> Result<Vec<TermHit>> {
        let detail = match matcher {
            LabelMatcher::Exact(_) => "exact".to_string(),
            LabelMatcher::ExactInsensitive(_) => "exact_ci".to_string(),
            LabelMatcher::Like(p) => format!("like:{p}"),
        };
        self.record("find_terms", detail);

        let state = self.state.lock().unwrap();
        let mut hits = Vec::new();
        let mut uris: Vec<&String> = state.concepts.keys().collect();
        uris.sort();
        for uri in uris {
            let concept = &state.concepts[uri];
            for term in Self::completion_terms(concept) {
                if let Some(lang) = language {
                    if &term.language != lang {
                        continue;
                    }
                }
                let matched = match matcher {
                    LabelMatcher::Exact(v) => &term.text == v,
                    LabelMatcher::ExactInsensitive(v) => {
                        term.text.to_lowercase() == v.to_lowercase()
                    }
                    LabelMatcher::Like(pattern) => like_match(pattern, &term.text),
                };
                if matched {
                    hits.push(TermHit {
                        concept_uri: concept.uri.clone(),
                        label: term.text.clone(),
                        language: term.language.clone(),
                    });
                }
            }
        }
        Ok(hits)
    }

    async fn search_concepts_mode(
        &self,
        term: &str,
        mode: SearchMode,
        geometric: bool,
        themes: &[String],
        language: Option<&IsoLanguage>,
    ) -> Result<Vec<Concept>> {
        self.record("search_concepts_mode", format!("{mode:?}"));

        let needle = term.to_lowercase();
        let state = self.state.lock().unwrap();
        let mut uris: Vec<&String> = state.concepts.keys().collect();
        uris.sort();

        let mut found = Vec::new();
        for uri in uris {
            let concept = &state.concepts[uri];
            if geometric && !state.layers.contains_key(uri.as_str()) {
                continue;
            }
            if !themes.is_empty() {
                match &concept.theme {
                    Some(theme) if themes.contains(theme) => {}
                    _ => continue,
                }
            }
            let matched = Self::completion_terms(concept).iter().any(|t| {
                if let Some(lang) = language {
                    if &t.language != lang {
                        return false;
                    }
                }
                let text = t.text.to_lowercase();
                match mode {
                    SearchMode::NoWildChar => text == needle,
                    SearchMode::PrefixRegex => text.starts_with(&needle),
                    SearchMode::SuffixRegex => text.ends_with(&needle),
                    SearchMode::PrefixSuffixRegex => text.contains(&needle),
                    SearchMode::AutoSearch => false,
                }
            });
            if matched {
                found.push(concept.clone());
            }
        }
        Ok(found)
    }

    async fn top_most_concepts(&self, themes: &[String]) -> Result<Vec<Concept>> {
        self.record("top_most_concepts", "");
        let state = self.state.lock().unwrap();
        let mut targets = BTreeSet::new();
        for concept in state.concepts.values() {
            for target in &concept.has_top_concept {
                targets.insert(target.clone());
            }
        }
        Ok(targets
            .into_iter()
            .filter_map(|uri| state.concepts.get(&uri).cloned())
            .filter(|c| {
                themes.is_empty()
                    || c.theme
                        .as_ref()
                        .map(|t| themes.contains(t))
                        .unwrap_or(false)
            })
            .collect())
    }

    async fn hierarchy_roots(&self, themes: &[String]) -> Result<Vec<Concept>> {
        self.record("hierarchy_roots", "");
        let state = self.state.lock().unwrap();
        let mut roots: Vec<Concept> = state
            .concepts
            .values()
            .filter(|c| c.hierarchy_root)
            .filter(|c| {
                themes.is_empty()
                    || c.theme
                        .as_ref()
                        .map(|t| themes.contains(t))
                        .unwrap_or(false)
            })
            .cloned()
            .collect();
        roots.sort_by(|a, b| a.uri.cmp(&b.uri));
        Ok(roots)
    }

    async fn all_concepts(&self, limit: i64) -> Result<Vec<Concept>> {
        self.record("all_concepts", limit.to_string());
        let state = self.state.lock().unwrap();
        let ordered: BTreeMap<&String, &Concept> =
            state.concepts.iter().map(|(k, v)| (k, v)).collect();
        let mut out: Vec<Concept> = ordered.values().map(|c| (*c).clone()).collect();
        if limit >= 0 {
            out.truncate(limit as usize);
        }
        Ok(out)
    }

    async fn all_labels(&self, limit: i64, language: Option<&IsoLanguage>) -> Result<Vec<Term>> {
        self.record("all_labels", limit.to_string());
        let state = self.state.lock().unwrap();
        let mut labels: Vec<Term> = state
            .concepts
            .values()
            .flat_map(Self::completion_terms)
            .filter(|t| language.map(|l| &t.language == l).unwrap_or(true))
            .cloned()
            .collect();
        labels.sort_by(|a, b| a.text.cmp(&b.text));
        if limit >= 0 {
            labels.truncate(limit as usize);
        }
        Ok(labels)
    }

    async fn all_pref_labels(
        &self,
        limit: i64,
        language: Option<&IsoLanguage>,
    ) -> Result<Vec<Term>> {
        self.record("all_pref_labels", limit.to_string());
        let mut labels = self.all_labels(geolex_core::defaults::NO_LIMIT, language).await?;
        labels.retain(|t| t.kind == TermType::PrefLabel);
        if limit >= 0 {
            labels.truncate(limit as usize);
        }
        Ok(labels)
    }

    async fn words(&self, language: Option<&IsoLanguage>) -> Result<Vec<String>> {
        self.record("words", "");
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
        self.record("concept_narrowers", uri);
        let state = self.state.lock().unwrap();
        let Some(key) = self.resolve(&state, uri) else {
            return Ok(Vec::new());
        };
        Ok(state.concepts[&key]
            .narrower
            .iter()
            .map(|child_uri| {
                let child = state.concepts.get(child_uri);
                ConceptNode {
                    uri: child_uri.clone(),
                    label: child
                        .and_then(|c| c.pref_labels.first())
                        .map(|t| t.text.clone()),
                    narrower_count: child.map(|c| c.narrower.len() as i64).unwrap_or(0),
                }
            })
            .collect())
    }

    async fn full_concept(&self, uri: &str) -> Result<Option<FullConcept>> {
        self.record("full_concept", uri);
        let state = self.state.lock().unwrap();
        let Some(key) = self.resolve(&state, uri) else {
            return Ok(None);
        };
        let concept = &state.concepts[&key];
        let top_concept = state
            .concepts
            .values()
            .any(|c| c.has_top_concept.contains(&key));
        Ok(Some(FullConcept {
            uri: concept.uri.clone(),
            terms: concept.all_terms().into_iter().cloned().collect(),
            top_concept,
            broader: concept.broader.clone(),
            narrower: concept.narrower.clone(),
            related: concept.related.clone(),
        }))
    }
}

#[async_trait]
impl ConceptWriter for MemoryThesaurus {
    async fn insert_concept(&self, concept: &Concept) -> Result<()> {
        self.record("insert_concept", &concept.uri);
        self.state
            .lock()
            .unwrap()
            .concepts
            .insert(concept.uri.clone(), concept.clone());
        Ok(())
    }

    async fn update_concept(&self, concept: &Concept) -> Result<()> {
        self.record("update_concept", &concept.uri);
        self.state
            .lock()
            .unwrap()
            .concepts
            .insert(concept.uri.clone(), concept.clone());
        Ok(())
    }

    async fn delete_concept(&self, uri: &str) -> Result<()> {
        self.record("delete_concept", uri);
        let mut state = self.state.lock().unwrap();
        state.concepts.remove(uri);
        state.layers.remove(uri);
        // Reverse-reference cleanup, as the SQL writer does with its
        // object-column delete.
        for concept in state.concepts.values_mut() {
            concept.broader.retain(|u| u != uri);
            concept.narrower.retain(|u| u != uri);
            concept.related.retain(|u| u != uri);
            concept.narrower_transitive.retain(|u| u != uri);
            concept.has_top_concept.retain(|u| u != uri);
        }
        Ok(())
    }

    async fn apparent_roots(&self) -> Result<Vec<String>> {
        self.record("apparent_roots", "");
        let state = self.state.lock().unwrap();
        let mut roots: Vec<String> = state
            .concepts
            .values()
            .filter(|c| c.broader.is_empty())
            .filter(|c| !c.hierarchy_root)
            .filter(|c| c.concept_type_or_default() != SKOS_CONCEPT_SCHEME_TYPE)
            .map(|c| c.uri.clone())
            .collect();
        roots.sort();
        Ok(roots)
    }

    async fn provision(&self) -> Result<()> {
        self.record("provision", "");
        Ok(())
    }

    async fn drop_thesaurus(&self) -> Result<()> {
        self.record("drop_thesaurus", "");
        self.state.lock().unwrap().concepts.clear();
        Ok(())
    }

    async fn update_thesaurus_properties(&self, thesaurus: &Thesaurus) -> Result<()> {
        self.record("update_thesaurus_properties", &thesaurus.uri);
        Ok(())
    }
}

// =============================================================================
// MEMORY TERM COUNT STORE
// =============================================================================

#[derive(Default)]
struct CountState {
    /// Keyed by (service, concept, language code).
    counts: BTreeMap<(i32, String, String), (TermCount, BTreeSet<String>)>,
    services: Vec<LinkedService>,
}

fn count_key(count: &TermCount) -> (i32, String, String) {
    (
        count.service_id,
        count.concept_uri.clone(),
        count
            .language
            .as_ref()
            .map(|l| l.code().to_string())
            .unwrap_or_default(),
    )
}

/// In-memory [`TermCountStore`] for counter tests.
#[derive(Default)]
pub struct MemoryTermCountStore {
    state: Mutex<CountState>,
}

impl MemoryTermCountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All persisted counts, ordered by (service, concept).
    pub fn counts(&self) -> Vec<TermCount> {
        self.state
            .lock()
            .unwrap()
            .counts
            .values()
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// First persisted count for a concept under a service, any language.
    pub fn count_for(&self, service_id: i32, concept_uri: &str) -> Option<TermCount> {
        self.state
            .lock()
            .unwrap()
            .counts
            .iter()
            .find(|((sid, uri, _), _)| *sid == service_id && uri == concept_uri)
            .map(|(_, (c, _))| c.clone())
    }
}

#[async_trait]
impl TermCountStore for MemoryTermCountStore {
    async fn clear_counts(&self, service_id: i32) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let before = state.counts.len();
        state.counts.retain(|(sid, _, _), _| *sid != service_id);
        Ok((before - state.counts.len()) as u64)
    }

    async fn save_count(&self, count: &TermCount, identifiers: &[String]) -> Result<()> {
        self.state.lock().unwrap().counts.insert(
            count_key(count),
            (count.clone(), identifiers.iter().cloned().collect()),
        );
        Ok(())
    }

    async fn counts_by_keyword(&self, filter: &KeywordCountFilter) -> Result<Vec<TermCount>> {
        let state = self.state.lock().unwrap();
        let keyword = filter.keyword.to_lowercase();
        Ok(state
            .counts
            .values()
            .filter(|(c, _)| c.label.to_lowercase().contains(&keyword))
            .filter(|(c, _)| {
                let is_csw = state
                    .services
                    .iter()
                    .find(|s| s.id == c.service_id)
                    .map(|s| s.is_csw)
                    .unwrap_or(true);
                match filter.csw {
                    CswScope::Any => true,
                    CswScope::CswOnly => is_csw,
                    CswScope::IgnoreCsw => !is_csw,
                }
            })
            .filter(|(c, _)| {
                filter.themes.is_empty()
                    || c.theme
                        .as_ref()
                        .map(|t| filter.themes.contains(t))
                        .unwrap_or(false)
            })
            .filter(|(c, _)| {
                if filter.aggregated {
                    c.aggregated_count > 0
                } else {
                    c.count > 0
                }
            })
            .map(|(c, _)| c.clone())
            .collect())
    }

    async fn identifiers_for(&self, service_id: i32, concept_uri: &str) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        let mut ids = BTreeSet::new();
        for ((sid, uri, _), (_, set)) in state.counts.iter() {
            if *sid == service_id && uri == concept_uri {
                ids.extend(set.iter().cloned());
            }
        }
        Ok(ids.into_iter().collect())
    }

    async fn linked_services(&self) -> Result<Vec<LinkedService>> {
        Ok(self.state.lock().unwrap().services.clone())
    }

    async fn register_service(
        &self,
        url: &str,
        name: Option<&str>,
        is_csw: bool,
    ) -> Result<LinkedService> {
        let mut state = self.state.lock().unwrap();
        let service = LinkedService {
            id: state.services.len() as i32 + 1,
            url: url.to_string(),
            name: name.map(str::to_string),
            is_csw,
        };
        state.services.push(service.clone());
        Ok(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_match_wildcards() {
        assert!(like_match("ocean%", "Oceanography"));
        assert!(like_match("%graphy", "Oceanography"));
        assert!(like_match("%ano%", "Oceanography"));
        assert!(like_match("O___n", "Océan"));
        assert!(!like_match("ocean", "Oceanography"));
    }

    #[test]
    fn test_like_match_escaped_literals() {
        assert!(like_match("100\\%", "100%"));
        assert!(!like_match("100\\%", "100x"));
        assert!(like_match("a\\_b", "a_b"));
        assert!(!like_match("a\\_b", "axb"));
    }

    #[test]
    fn test_like_match_case_insensitive() {
        assert!(like_match("OCEAN", "ocean"));
        assert!(like_match("océan", "OCÉAN"));
    }
}
