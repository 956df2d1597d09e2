//! Default values and well-known URIs shared across geolex crates.

/// SKOS namespace.
pub const SKOS_NS: &str = "http://www.w3.org/2004/02/skos/core#";

/// Default concept type applied when a concept carries no explicit type triple.
pub const SKOS_CONCEPT_TYPE: &str = "http://www.w3.org/2004/02/skos/core#Concept";

/// Type URI for scheme-root concepts synthesized by `compute_top_most_concept`.
pub const SKOS_CONCEPT_SCHEME_TYPE: &str = "http://www.w3.org/2004/02/skos/core#ConceptScheme";

/// Default language applied when a thesaurus declares none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Maximum records requested from a remote catalog per term query.
pub const CATALOG_MAX_RECORDS: u32 = 500;

/// Timeout for a single remote catalog request (seconds).
pub const CATALOG_TIMEOUT_SECS: u64 = 30;

/// Pseudo-URI prefix for terms `analyze` could not resolve to any concept.
pub const UNKNOWN_CONCEPT_URN: &str = "urn:concept:unknown:";

/// Unlimited row cap sentinel for bulk enumeration operations.
pub const NO_LIMIT: i64 = -1;
