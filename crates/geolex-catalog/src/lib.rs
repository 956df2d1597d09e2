//! # geolex-catalog
//!
//! Remote catalog integration for the geolex thesaurus engine: the CSW
//! search-and-retrieve client and the term-frequency counting pipeline
//! that cross-references thesaurus concepts against catalog records.

pub mod client;
pub mod counter;
pub mod mock;

pub use client::{build_get_records, extract_identifiers, CswCatalogClient};
pub use counter::{CatalogTermCounter, CountReport};
pub use mock::MockCatalogClient;
