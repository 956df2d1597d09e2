//! # geolex-registry
//!
//! Multi-thesaurus query layer for the geolex thesaurus engine.
//!
//! [`ThesaurusRegistry`] holds the loaded thesaurus stores and exposes a
//! single query surface: every operation fans out over the stores applying
//! a thesaurus-URI allow-list, a language-support filter, and the
//! enabled/disabled state filter, then concatenates results. The `analyze`
//! pass (see `analyze` module) disambiguates free text against all loaded
//! vocabularies.

mod analyze;
mod registry;

pub use registry::{RegistryFilter, ThesaurusRegistry};
