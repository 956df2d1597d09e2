//! # geolex-core
//!
//! Core types, traits, and shared algorithms for the geolex thesaurus
//! engine.
//!
//! This crate provides the concept-graph data model, the fixed predicate
//! vocabulary, language/diacritic rules, the error taxonomy, the structured
//! logging field schema, and the repository traits other geolex crates
//! implement. The ranked-search ladder, AUTO_SEARCH fallback, cascade
//! delete, and top-most recomputation live here as provided trait methods
//! so every backend shares identical semantics.

pub mod defaults;
pub mod error;
pub mod lang;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use lang::{DiacriticRules, IsoLanguage};
pub use models::*;
pub use traits::{escape_like, CatalogClient, ConceptStore, ConceptWriter, TermCountStore};
