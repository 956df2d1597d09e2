//! # geolex-db
//!
//! PostgreSQL storage layer for the geolex thesaurus engine.
//!
//! This crate provides:
//! - Connection pool management
//! - Schema-name validation for thesaurus namespaces
//! - [`PgThesaurusRepository`]: the concept store (read path) and concept
//!   writer (write path) over one thesaurus schema
//! - Thesaurus schema provisioning and metadata loading
//! - The term-count / aggregated-identifier / linked-service repositories
//! - A deterministic in-memory mock repository for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use geolex_core::{Concept, ConceptStore, ConceptWriter};
//! use geolex_db::{create_pool, load_thesaurus, PgThesaurusRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool("postgres://localhost/geolex").await?;
//!     let thesaurus = load_thesaurus(&pool, "geo").await?;
//!     let repo = PgThesaurusRepository::new(pool, thesaurus)?;
//!
//!     let concept = repo.read_concept("urn:c:1", false, None).await?;
//!     println!("{:?}", concept);
//!     Ok(())
//! }
//! ```

pub mod concept_store;
pub mod concept_writer;
pub mod loader;
pub mod mock;
pub mod pool;
pub mod schema;
pub mod schema_validation;
pub mod term_stats;

// Test fixtures for integration tests
// Note: always compiled so integration tests (in tests/) can use
// DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use geolex_core::*;

pub use concept_store::PgThesaurusRepository;
pub use loader::{load_thesauri, load_thesaurus};
pub use mock::{like_match, MemoryTermCountStore, MemoryThesaurus, StoreCall};
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use schema::ensure_aggregation_tables;
pub use schema_validation::validate_schema_name;
pub use term_stats::PgTermStatsRepository;
