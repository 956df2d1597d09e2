//! Mock catalog client for deterministic testing.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use geolex_core::{CatalogClient, Error, Result};

/// [`CatalogClient`] answering from a fixed label → identifiers map.
///
/// Labels configured with [`MockCatalogClient::with_failure`] return a
/// request error instead, and every query is recorded for call-count
/// assertions.
#[derive(Default)]
pub struct MockCatalogClient {
    responses: HashMap<String, Vec<String>>,
    failures: Vec<String>,
    queries: Mutex<Vec<String>>,
}

impl MockCatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a label to a fixed identifier list.
    pub fn with_response(mut self, label: &str, identifiers: &[&str]) -> Self {
        self.responses.insert(
            label.to_string(),
            identifiers.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Make queries for a label fail.
    pub fn with_failure(mut self, label: &str) -> Self {
        self.failures.push(label.to_string());
        self
    }

    /// Labels queried so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    fn endpoint(&self) -> &str {
        "mock://catalog"
    }

    async fn record_identifiers(&self, label: &str) -> Result<Vec<String>> {
        self.queries.lock().unwrap().push(label.to_string());
        if self.failures.iter().any(|l| l == label) {
            return Err(Error::Request(format!("simulated failure for '{label}'")));
        }
        Ok(self.responses.get(label).cloned().unwrap_or_default())
    }
}
