//! HTTP client for remote catalog (CSW) endpoints.
//!
//! One request type: a search-and-retrieve GetRecords query with a
//! CQL-style text filter over title/abstract/subject built from a concept
//! label, capped at a fixed number of records. The response is scanned for
//! `<dc:identifier>` elements; the surrounding envelope is not modelled.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::debug;

use geolex_core::defaults::{CATALOG_MAX_RECORDS, CATALOG_TIMEOUT_SECS};
use geolex_core::{CatalogClient, Error, LinkedService, Result};

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<dc:identifier[^>]*>([^<]+)</dc:identifier>")
        .expect("identifier pattern compiles")
});

/// Escape a label for embedding in a CQL single-quoted literal.
fn escape_cql(label: &str) -> String {
    label.replace('\'', "''")
}

/// Build the GetRecords request body for one label query.
pub fn build_get_records(label: &str, max_records: u32) -> String {
    let literal = escape_cql(label);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<csw:GetRecords xmlns:csw="http://www.opengis.net/cat/csw/2.0.2"
    service="CSW" version="2.0.2" resultType="results"
    startPosition="1" maxRecords="{max_records}">
  <csw:Query typeNames="csw:Record">
    <csw:ElementSetName>brief</csw:ElementSetName>
    <csw:Constraint version="1.1.0">
      <csw:CqlText>Title LIKE '%{literal}%' OR Abstract LIKE '%{literal}%' OR Subject LIKE '%{literal}%'</csw:CqlText>
    </csw:Constraint>
  </csw:Query>
</csw:GetRecords>"#
    )
}

/// Pull record identifiers out of a GetRecords response.
pub fn extract_identifiers(body: &str) -> Vec<String> {
    let mut identifiers: Vec<String> = IDENTIFIER_RE
        .captures_iter(body)
        .map(|c| c[1].trim().to_string())
        .collect();
    identifiers.sort();
    identifiers.dedup();
    identifiers
}

/// [`CatalogClient`] over a CSW endpoint.
pub struct CswCatalogClient {
    client: Client,
    endpoint: String,
    max_records: u32,
}

impl CswCatalogClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(CATALOG_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            max_records: CATALOG_MAX_RECORDS,
        })
    }

    /// Client for a registered linked service.
    pub fn for_service(service: &LinkedService) -> Result<Self> {
        Self::new(service.url.clone())
    }

    /// Override the per-query record cap.
    pub fn with_max_records(mut self, max_records: u32) -> Self {
        self.max_records = max_records;
        self
    }
}

#[async_trait]
impl CatalogClient for CswCatalogClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn record_identifiers(&self, label: &str) -> Result<Vec<String>> {
        let body = build_get_records(label, self.max_records);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/xml")
            .body(body)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Request(e.to_string()))?;

        let text = response.text().await?;
        let identifiers = extract_identifiers(&text);

        debug!(
            subsystem = "catalog",
            component = "csw_client",
            op = "record_identifiers",
            query = %label,
            result_count = identifiers.len(),
            "catalog query answered"
        );
        Ok(identifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_get_records_embeds_label_and_cap() {
        let body = build_get_records("Ocean", 500);
        assert!(body.contains("maxRecords=\"500\""));
        assert!(body.contains("Title LIKE '%Ocean%'"));
        assert!(body.contains("Abstract LIKE '%Ocean%'"));
        assert!(body.contains("Subject LIKE '%Ocean%'"));
    }

    #[test]
    fn test_build_get_records_escapes_single_quotes() {
        let body = build_get_records("l'océan", 10);
        assert!(body.contains("'%l''océan%'"));
        assert!(!body.contains("'%l'océan%'"));
    }

    #[test]
    fn test_extract_identifiers() {
        let body = r#"
            <csw:SearchResults numberOfRecordsMatched="3">
              <csw:BriefRecord>
                <dc:identifier>rec-b</dc:identifier>
              </csw:BriefRecord>
              <csw:BriefRecord>
                <dc:identifier> rec-a </dc:identifier>
              </csw:BriefRecord>
              <csw:BriefRecord>
                <dc:identifier>rec-b</dc:identifier>
              </csw:BriefRecord>
            </csw:SearchResults>
        "#;
        assert_eq!(extract_identifiers(body), vec!["rec-a", "rec-b"]);
    }

    #[test]
    fn test_extract_identifiers_with_attributes() {
        let body = r#"<dc:identifier scheme="urn:x">rec-1</dc:identifier>"#;
        assert_eq!(extract_identifiers(body), vec!["rec-1"]);
    }

    #[test]
    fn test_extract_identifiers_empty_response() {
        assert!(extract_identifiers("<csw:SearchResults/>").is_empty());
    }
}
