//! Concept-graph data model for the geolex thesaurus engine.
//!
//! The relational store flattens the SKOS-like graph into a
//! (subject, predicate, object) triple table plus two per-language term
//! tables. This module defines the typed view over that storage: the
//! [`Predicate`] vocabulary, the [`Concept`] aggregate with its
//! triple-fold dispatch, term types and their table groups, and the
//! read-optimized projections used by UI-facing callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::defaults::SKOS_CONCEPT_TYPE;
use crate::lang::IsoLanguage;

// =============================================================================
// THESAURUS
// =============================================================================

/// Enabled/disabled state of a provisioned thesaurus.
///
/// Disabled thesauri are excluded from registry fan-out unless a caller
/// explicitly opts in to deactivated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThesaurusState {
    Active,
    Disabled,
}

impl fmt::Display for ThesaurusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

impl FromStr for ThesaurusState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" | "true" | "1" => Ok(Self::Active),
            "disabled" | "false" | "0" => Ok(Self::Disabled),
            _ => Err(format!("Invalid thesaurus state: {}", s)),
        }
    }
}

/// A named, versioned, language-scoped collection of concepts stored in its
/// own schema namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thesaurus {
    /// Identifying URI.
    pub uri: String,
    /// Human-readable name.
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    /// Language used when a caller supplies none.
    pub default_language: IsoLanguage,
    /// Ordered set of supported languages.
    pub languages: Vec<IsoLanguage>,
    pub state: ThesaurusState,
    /// Schema identifier namespacing this thesaurus's tables.
    /// Validated against the identifier allow-list before any SQL is built.
    pub schema: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thesaurus {
    pub fn is_active(&self) -> bool {
        self.state == ThesaurusState::Active
    }

    pub fn supports_language(&self, language: &IsoLanguage) -> bool {
        self.languages.iter().any(|l| l == language)
    }
}

// =============================================================================
// TERMS
// =============================================================================

/// Which of the two term tables a term type is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermGroup {
    /// Search-optimized table (`terme_completion`): prefLabel, altLabel, label.
    Completion,
    /// Localisation table (`terme_localisation`): definition, scopeNote,
    /// historyNote, example.
    Localisation,
}

/// Type tag of a language-tagged text value attached to a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermType {
    PrefLabel,
    AltLabel,
    Label,
    Definition,
    ScopeNote,
    HistoryNote,
    Example,
}

impl TermType {
    /// All term types, completion group first.
    pub const ALL: [TermType; 7] = [
        TermType::PrefLabel,
        TermType::AltLabel,
        TermType::Label,
        TermType::Definition,
        TermType::ScopeNote,
        TermType::HistoryNote,
        TermType::Example,
    ];

    /// The table group this term type is stored in.
    pub fn group(&self) -> TermGroup {
        match self {
            Self::PrefLabel | Self::AltLabel | Self::Label => TermGroup::Completion,
            Self::Definition | Self::ScopeNote | Self::HistoryNote | Self::Example => {
                TermGroup::Localisation
            }
        }
    }
}

impl fmt::Display for TermType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PrefLabel => "prefLabel",
            Self::AltLabel => "altLabel",
            Self::Label => "label",
            Self::Definition => "definition",
            Self::ScopeNote => "scopeNote",
            Self::HistoryNote => "historyNote",
            Self::Example => "example",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TermType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefLabel" => Ok(Self::PrefLabel),
            "altLabel" => Ok(Self::AltLabel),
            "label" => Ok(Self::Label),
            "definition" => Ok(Self::Definition),
            "scopeNote" => Ok(Self::ScopeNote),
            "historyNote" => Ok(Self::HistoryNote),
            "example" => Ok(Self::Example),
            _ => Err(format!("Invalid term type: {}", s)),
        }
    }
}

/// A language-tagged text value attached to a concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub text: String,
    pub language: IsoLanguage,
    pub kind: TermType,
    /// Source theme tag (`thesaurus_origine`).
    pub theme: Option<String>,
}

impl Term {
    pub fn new(text: impl Into<String>, language: impl Into<IsoLanguage>, kind: TermType) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
            kind,
            theme: None,
        }
    }
}

// =============================================================================
// PREDICATE VOCABULARY
// =============================================================================

/// The fixed predicate vocabulary of the triple table.
///
/// Every triple's predicate column holds one of these URIs; the fold in
/// [`Concept::apply_triple`] dispatches each row into its typed field.
/// Unknown predicate URIs are preserved nowhere: the store logs and skips
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Predicate {
    // Relations (object is a concept URI)
    Broader,
    Narrower,
    Related,
    NarrowerTransitive,
    HasTopConcept,
    InScheme,
    Type,
    HierarchyRootType,
    // Scalar properties (object is a literal)
    Creator,
    Date,
    Rights,
    Title,
    Subject,
    Contributor,
    Issued,
    Modified,
    HasVersion,
    ExternalId,
    ChangeNote,
    Value,
    Name,
    Language,
    HierarchyRoot,
}

impl Predicate {
    /// Every predicate, in triple-serialization order.
    pub const ALL: [Predicate; 22] = [
        Predicate::Type,
        Predicate::Broader,
        Predicate::Narrower,
        Predicate::Related,
        Predicate::NarrowerTransitive,
        Predicate::HasTopConcept,
        Predicate::InScheme,
        Predicate::HierarchyRootType,
        Predicate::Creator,
        Predicate::Date,
        Predicate::Rights,
        Predicate::Title,
        Predicate::Subject,
        Predicate::Contributor,
        Predicate::Issued,
        Predicate::Modified,
        Predicate::HasVersion,
        Predicate::ExternalId,
        Predicate::ChangeNote,
        Predicate::Value,
        Predicate::Name,
        Predicate::Language,
    ];

    /// The predicate URI stored in the triple table.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Broader => "http://www.w3.org/2004/02/skos/core#broader",
            Self::Narrower => "http://www.w3.org/2004/02/skos/core#narrower",
            Self::Related => "http://www.w3.org/2004/02/skos/core#related",
            Self::NarrowerTransitive => {
                "http://www.w3.org/2004/02/skos/core#narrowerTransitive"
            }
            Self::HasTopConcept => "http://www.w3.org/2004/02/skos/core#hasTopConcept",
            Self::InScheme => "http://www.w3.org/2004/02/skos/core#inScheme",
            Self::ChangeNote => "http://www.w3.org/2004/02/skos/core#changeNote",
            Self::ExternalId => "http://www.w3.org/2004/02/skos/core#notation",
            Self::Type => "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
            Self::Value => "http://www.w3.org/1999/02/22-rdf-syntax-ns#value",
            Self::Creator => "http://purl.org/dc/terms/creator",
            Self::Date => "http://purl.org/dc/terms/date",
            Self::Rights => "http://purl.org/dc/terms/rights",
            Self::Title => "http://purl.org/dc/terms/title",
            Self::Subject => "http://purl.org/dc/terms/subject",
            Self::Contributor => "http://purl.org/dc/terms/contributor",
            Self::Issued => "http://purl.org/dc/terms/issued",
            Self::Modified => "http://purl.org/dc/terms/modified",
            Self::HasVersion => "http://purl.org/dc/terms/hasVersion",
            Self::Language => "http://purl.org/dc/terms/language",
            Self::Name => "http://xmlns.com/foaf/0.1/name",
            Self::HierarchyRoot => "http://geolex.org/thesaurus#hierarchyRoot",
            Self::HierarchyRootType => "http://geolex.org/thesaurus#hierarchyRootType",
        }
    }

    /// Resolve a stored predicate URI back to its variant.
    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.uri() == uri)
    }

    /// Whether the object column holds a referenced concept URI rather
    /// than a literal.
    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            Self::Broader
                | Self::Narrower
                | Self::Related
                | Self::NarrowerTransitive
                | Self::HasTopConcept
                | Self::InScheme
                | Self::Type
                | Self::HierarchyRootType
        )
    }

    /// Whether a concept may carry more than one triple with this predicate.
    /// Multi-valued predicates are rewritten wholesale on update; scalar
    /// ones are updated in place.
    pub fn is_multi_valued(&self) -> bool {
        matches!(
            self,
            Self::Broader
                | Self::Narrower
                | Self::Related
                | Self::NarrowerTransitive
                | Self::HasTopConcept
                | Self::Language
        )
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

// =============================================================================
// CONCEPT
// =============================================================================

/// A node in the controlled-vocabulary graph.
///
/// Built by folding the concept's triple rows and term rows; serialized back
/// to triples by [`Concept::triples`]. Relation fields hold raw URIs, never
/// loaded neighbors, so a concept is always a bounded amount of data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Concept {
    pub uri: String,

    // Terms (completion group)
    pub pref_labels: Vec<Term>,
    pub alt_labels: Vec<Term>,
    pub labels: Vec<Term>,
    // Terms (localisation group), zero-or-one per language
    pub definitions: Vec<Term>,
    pub scope_notes: Vec<Term>,
    pub history_notes: Vec<Term>,
    pub examples: Vec<Term>,

    /// Type reference; [`Concept::concept_type_or_default`] substitutes the
    /// SKOS Concept type when unset.
    pub concept_type: Option<String>,

    // Relations to other concepts by URI
    pub broader: Vec<String>,
    pub narrower: Vec<String>,
    pub related: Vec<String>,
    pub narrower_transitive: Vec<String>,
    /// Only meaningful on scheme-root concepts.
    pub has_top_concept: Vec<String>,

    // Scalar metadata properties
    pub creator: Option<String>,
    pub date: Option<String>,
    pub rights: Option<String>,
    pub title: Option<String>,
    pub subject: Option<String>,
    pub contributor: Option<String>,
    pub issued: Option<String>,
    pub modified: Option<String>,
    pub has_version: Option<String>,
    pub external_id: Option<String>,
    pub change_note: Option<String>,
    pub value: Option<String>,
    pub name: Option<String>,
    pub language_tags: Vec<String>,

    pub hierarchy_root: bool,
    /// References a concept-scheme type when `hierarchy_root` is set.
    pub hierarchy_root_type: Option<String>,

    /// Scheme hint attached when the concept's origin schema differs from
    /// the reading thesaurus's schema.
    pub in_scheme: Option<String>,
    /// `thesaurus_origine` tag.
    pub theme: Option<String>,
    /// Associated GIS layer, loaded only when a read asks for geometry.
    pub associated_layer: Option<String>,
}

impl Concept {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    /// The type reference, defaulting to the SKOS Concept type when unset.
    pub fn concept_type_or_default(&self) -> &str {
        self.concept_type.as_deref().unwrap_or(SKOS_CONCEPT_TYPE)
    }

    /// Terms of one type.
    pub fn terms_of(&self, kind: TermType) -> &[Term] {
        match kind {
            TermType::PrefLabel => &self.pref_labels,
            TermType::AltLabel => &self.alt_labels,
            TermType::Label => &self.labels,
            TermType::Definition => &self.definitions,
            TermType::ScopeNote => &self.scope_notes,
            TermType::HistoryNote => &self.history_notes,
            TermType::Example => &self.examples,
        }
    }

    /// Attach a term to the field matching its type tag.
    pub fn add_term(&mut self, term: Term) {
        let bucket = match term.kind {
            TermType::PrefLabel => &mut self.pref_labels,
            TermType::AltLabel => &mut self.alt_labels,
            TermType::Label => &mut self.labels,
            TermType::Definition => &mut self.definitions,
            TermType::ScopeNote => &mut self.scope_notes,
            TermType::HistoryNote => &mut self.history_notes,
            TermType::Example => &mut self.examples,
        };
        bucket.push(term);
    }

    /// Preferred label for a language, falling back to the first one.
    pub fn pref_label(&self, language: Option<&IsoLanguage>) -> Option<&Term> {
        match language {
            Some(lang) => self
                .pref_labels
                .iter()
                .find(|t| &t.language == lang)
                .or_else(|| self.pref_labels.first()),
            None => self.pref_labels.first(),
        }
    }

    /// Relation targets for a relation predicate; empty for scalar predicates.
    pub fn relation_targets(&self, predicate: Predicate) -> &[String] {
        match predicate {
            Predicate::Broader => &self.broader,
            Predicate::Narrower => &self.narrower,
            Predicate::Related => &self.related,
            Predicate::NarrowerTransitive => &self.narrower_transitive,
            Predicate::HasTopConcept => &self.has_top_concept,
            _ => &[],
        }
    }

    /// Fold one triple row into the matching typed field.
    pub fn apply_triple(&mut self, predicate: Predicate, object: String) {
        match predicate {
            Predicate::Broader => self.broader.push(object),
            Predicate::Narrower => self.narrower.push(object),
            Predicate::Related => self.related.push(object),
            Predicate::NarrowerTransitive => self.narrower_transitive.push(object),
            Predicate::HasTopConcept => self.has_top_concept.push(object),
            Predicate::InScheme => self.in_scheme = Some(object),
            Predicate::Type => self.concept_type = Some(object),
            Predicate::HierarchyRootType => self.hierarchy_root_type = Some(object),
            Predicate::Creator => self.creator = Some(object),
            Predicate::Date => self.date = Some(object),
            Predicate::Rights => self.rights = Some(object),
            Predicate::Title => self.title = Some(object),
            Predicate::Subject => self.subject = Some(object),
            Predicate::Contributor => self.contributor = Some(object),
            Predicate::Issued => self.issued = Some(object),
            Predicate::Modified => self.modified = Some(object),
            Predicate::HasVersion => self.has_version = Some(object),
            Predicate::ExternalId => self.external_id = Some(object),
            Predicate::ChangeNote => self.change_note = Some(object),
            Predicate::Value => self.value = Some(object),
            Predicate::Name => self.name = Some(object),
            Predicate::Language => self.language_tags.push(object),
            Predicate::HierarchyRoot => {
                self.hierarchy_root = object.eq_ignore_ascii_case("true") || object == "1"
            }
        }
    }

    /// Serialize every populated field back to (predicate, object) pairs,
    /// the inverse of [`Concept::apply_triple`]. The type triple is always
    /// emitted so a concept's existence is visible in the triple table even
    /// when it has no other property.
    pub fn triples(&self) -> Vec<(Predicate, String)> {
        let mut out = Vec::new();
        out.push((Predicate::Type, self.concept_type_or_default().to_string()));

        for (pred, targets) in [
            (Predicate::Broader, &self.broader),
            (Predicate::Narrower, &self.narrower),
            (Predicate::Related, &self.related),
            (Predicate::NarrowerTransitive, &self.narrower_transitive),
            (Predicate::HasTopConcept, &self.has_top_concept),
        ] {
            for target in targets {
                out.push((pred, target.clone()));
            }
        }

        for (pred, value) in [
            (Predicate::InScheme, &self.in_scheme),
            (Predicate::HierarchyRootType, &self.hierarchy_root_type),
            (Predicate::Creator, &self.creator),
            (Predicate::Date, &self.date),
            (Predicate::Rights, &self.rights),
            (Predicate::Title, &self.title),
            (Predicate::Subject, &self.subject),
            (Predicate::Contributor, &self.contributor),
            (Predicate::Issued, &self.issued),
            (Predicate::Modified, &self.modified),
            (Predicate::HasVersion, &self.has_version),
            (Predicate::ExternalId, &self.external_id),
            (Predicate::ChangeNote, &self.change_note),
            (Predicate::Value, &self.value),
            (Predicate::Name, &self.name),
        ] {
            if let Some(v) = value {
                out.push((pred, v.clone()));
            }
        }

        for tag in &self.language_tags {
            out.push((Predicate::Language, tag.clone()));
        }

        if self.hierarchy_root {
            out.push((Predicate::HierarchyRoot, "true".to_string()));
        }

        out
    }

    /// All terms across every type, completion group first.
    pub fn all_terms(&self) -> Vec<&Term> {
        TermType::ALL
            .iter()
            .flat_map(|k| self.terms_of(*k).iter())
            .collect()
    }
}

// =============================================================================
// SEARCH TYPES
// =============================================================================

/// Wildcard placement for the mode-parameterized concept search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchMode {
    /// Exact term, no wildcard.
    NoWildChar,
    /// `term%`
    PrefixRegex,
    /// `%term`
    SuffixRegex,
    /// `%term%`
    PrefixSuffixRegex,
    /// Try the other four in order, stopping at the first non-empty result.
    AutoSearch,
}

impl SearchMode {
    /// Fallback order attempted by [`SearchMode::AutoSearch`].
    pub const AUTO_CHAIN: [SearchMode; 4] = [
        SearchMode::NoWildChar,
        SearchMode::PrefixRegex,
        SearchMode::SuffixRegex,
        SearchMode::PrefixSuffixRegex,
    ];
}

/// Label-matching primitive handed to stores by the ranked search ladder.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelMatcher {
    /// Case-sensitive equality.
    Exact(String),
    /// Case-insensitive equality.
    ExactInsensitive(String),
    /// Pattern match (already escaped; `%`/`_` are live wildcards),
    /// applied case-insensitively.
    Like(String),
}

/// A term-table row matched by a search primitive, before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct TermHit {
    pub concept_uri: String,
    pub label: String,
    pub language: IsoLanguage,
}

/// A scored search result tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub concept_uri: String,
    /// URI of the owning thesaurus.
    pub thesaurus_uri: String,
    pub score: f32,
    /// None when the match is language-neutral.
    pub language: Option<IsoLanguage>,
    /// The label text that matched.
    pub label: String,
}

// =============================================================================
// PROJECTIONS
// =============================================================================

/// URI + term + identifiers/count summary projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortConcept {
    pub uri: String,
    pub label: Option<Term>,
    pub identifiers: Vec<String>,
    pub count: i64,
}

/// Direct child annotated with its own narrower count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptNode {
    pub uri: String,
    pub label: Option<String>,
    pub narrower_count: i64,
}

/// Merged single-pass view of terms, top-concept status, and relations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullConcept {
    pub uri: String,
    pub terms: Vec<Term>,
    pub top_concept: bool,
    pub broader: Vec<String>,
    pub narrower: Vec<String>,
    pub related: Vec<String>,
}

// =============================================================================
// ANALYZE TYPES
// =============================================================================

/// Boolean operator positioned between analyzed terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BooleanOperator {
    And,
    Or,
    Not,
}

impl FromStr for BooleanOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            "NOT" => Ok(Self::Not),
            _ => Err(format!("Invalid boolean operator: {}", s)),
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::Not => write!(f, "NOT"),
        }
    }
}

/// Result of the free-text disambiguation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzedQuery {
    /// One entry per analyzed term, in input order. Unknown terms carry a
    /// generated `urn:concept:unknown:<n>` pseudo-URI and score 0.
    pub matches: Vec<ScoredMatch>,
    /// Operators in the order they appeared between terms.
    pub operators: Vec<BooleanOperator>,
    /// Distinct languages the matches were found in.
    pub languages: Vec<String>,
}

// =============================================================================
// CATALOG COUNTING TYPES
// =============================================================================

/// A registered remote catalog endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedService {
    pub id: i32,
    pub url: String,
    pub name: Option<String>,
    /// Whether the endpoint speaks the CSW catalog protocol.
    pub is_csw: bool,
}

/// Per-concept term-occurrence counts for one linked service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermCount {
    pub service_id: i32,
    pub thesaurus_uri: String,
    pub concept_uri: String,
    pub label: String,
    pub language: Option<IsoLanguage>,
    /// `thesaurus_origine` tag of the counted concept.
    pub theme: Option<String>,
    /// Matches for this concept's own label.
    pub count: i64,
    /// Size of the merged identifier set after transitive propagation;
    /// equals `count` in flat mode.
    pub aggregated_count: i64,
}

/// CSW-membership filter for keyword count queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CswScope {
    /// All services.
    #[default]
    Any,
    /// Only CSW services.
    CswOnly,
    /// Everything except CSW services.
    IgnoreCsw,
}

/// Filter for querying persisted term counts by keyword.
#[derive(Debug, Clone, Default)]
pub struct KeywordCountFilter {
    pub keyword: String,
    pub csw: CswScope,
    /// When non-empty, restrict to these `thesaurus_origine` themes.
    pub themes: Vec<String>,
    /// Return aggregated counts instead of raw per-label counts.
    pub aggregated: bool,
}
