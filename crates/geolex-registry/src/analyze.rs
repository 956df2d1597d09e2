//! Free-text disambiguation over the loaded thesauri.
//!
//! `analyze` resolves a comma-separated sentence into concepts: boolean
//! operators positioned between tokens are extracted, every remaining term
//! is searched in every thesaurus/language pair, and the best-scored
//! candidate wins. Terms matching nothing anywhere synthesize an "unknown
//! concept" placeholder so callers can still build a query from the raw
//! text.

use tracing::{error, warn};

use geolex_core::defaults::UNKNOWN_CONCEPT_URN;
use geolex_core::{AnalyzedQuery, BooleanOperator, Result, ScoredMatch};

use crate::registry::{RegistryFilter, ThesaurusRegistry};

impl ThesaurusRegistry {
    /// Tokenize a comma-separated sentence and disambiguate it.
    pub async fn analyze_sentence(&self, sentence: &str) -> Result<AnalyzedQuery> {
        let tokens: Vec<String> = sentence
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        self.analyze(&tokens).await
    }

    /// Disambiguate a token list. Each entry may itself be comma-separated;
    /// entries parsing as AND/OR/NOT become operators, everything else is
    /// searched.
    pub async fn analyze(&self, tokens: &[String]) -> Result<AnalyzedQuery> {
        let mut operators: Vec<BooleanOperator> = Vec::new();
        let mut terms: Vec<String> = Vec::new();
        for entry in tokens {
            for token in entry.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                match token.parse::<BooleanOperator>() {
                    Ok(op) => operators.push(op),
                    Err(_) => terms.push(token.to_string()),
                }
            }
        }

        let mut query = AnalyzedQuery {
            operators,
            ..Default::default()
        };
        let mut unknown_counter = 0usize;

        for term in &terms {
            match self.disambiguate(term).await? {
                Some(mut chosen) => {
                    // A concept already chosen under a different language
                    // becomes language-neutral.
                    let uri = chosen.concept_uri.clone();
                    let mut clear_language = false;
                    for earlier in query.matches.iter_mut().filter(|m| m.concept_uri == uri) {
                        if earlier.language != chosen.language {
                            earlier.language = None;
                            clear_language = true;
                        }
                    }
                    if clear_language {
                        chosen.language = None;
                    }
                    query.matches.push(chosen);
                }
                None => {
                    unknown_counter += 1;
                    query.matches.push(ScoredMatch {
                        concept_uri: format!("{UNKNOWN_CONCEPT_URN}{unknown_counter}"),
                        thesaurus_uri: String::new(),
                        score: 0.0,
                        language: None,
                        label: term.clone(),
                    });
                    warn!(
                        subsystem = "registry",
                        component = "analyze",
                        op = "disambiguate",
                        query = %term,
                        "no concept matched, unknown placeholder synthesized"
                    );
                }
            }
        }

        for m in &query.matches {
            if let Some(language) = &m.language {
                let code = language.code().to_string();
                if !query.languages.contains(&code) {
                    query.languages.push(code);
                }
            }
        }
        // Concepts were found but no language could be determined: fall
        // back to the first loaded thesaurus's first language.
        if query.languages.is_empty() && query.matches.iter().any(|m| m.score > 0.0) {
            if let Some(language) = self.default_language() {
                query.languages.push(language.code().to_string());
            }
        }

        Ok(query)
    }

    /// Search one term in every thesaurus/language pair and pick the
    /// winning candidate.
    async fn disambiguate(&self, term: &str) -> Result<Option<ScoredMatch>> {
        let mut best: Option<ScoredMatch> = None;

        for store in self.selected(&RegistryFilter::default()) {
            for language in store.thesaurus().languages.clone() {
                let matches = store.search(term, Some(&language)).await?;
                for candidate in matches {
                    match &best {
                        None => best = Some(candidate),
                        Some(current) if candidate.score > current.score => {
                            best = Some(candidate)
                        }
                        Some(current)
                            if candidate.score == current.score
                                && candidate.concept_uri != current.concept_uri =>
                        {
                            // Duplicate best score is a data-integrity
                            // anomaly; first-seen wins.
                            error!(
                                subsystem = "registry",
                                component = "analyze",
                                op = "disambiguate",
                                query = %term,
                                concept_uri = %candidate.concept_uri,
                                "duplicate best-score match discarded"
                            );
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        Ok(best)
    }
}
