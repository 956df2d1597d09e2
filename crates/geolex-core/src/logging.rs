//! Structured logging schema and field name constants for geolex.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Data-integrity anomalies (duplicate best-score matches), degraded service |
//! | WARN  | Recoverable storage/remote failure, safe default returned |
//! | INFO  | Lifecycle events (pool creation, schema provisioning), pass completions |
//! | DEBUG | Decision points (strategy fallbacks, cascade bounding), intermediate counts |
//! | TRACE | Per-row iteration, per-term remote queries |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "db", "registry", "catalog"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "concept_store", "concept_writer", "pool", "term_counter"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "read_concept", "search", "write_concept", "count_terms"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// URI of the thesaurus being operated on.
pub const THESAURUS: &str = "thesaurus";

/// Schema namespace of the thesaurus.
pub const SCHEMA: &str = "schema";

/// URI of the concept being operated on.
pub const CONCEPT_URI: &str = "concept_uri";

/// Search term or query text.
pub const QUERY: &str = "query";

/// Two-letter language code in effect.
pub const LANGUAGE: &str = "language";

/// Integer id of a linked catalog service.
pub const SERVICE_ID: &str = "service_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of rows written or deleted.
pub const ROW_COUNT: &str = "row_count";

/// Search strategy that produced the results ("exact", "prefix", ...).
pub const STRATEGY: &str = "strategy";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
