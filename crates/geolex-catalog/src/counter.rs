//! Term-frequency counting against remote catalog endpoints.
//!
//! For each registered service the counter clears previous counts, then
//! processes every enabled thesaurus/language pair. When the thesaurus has
//! top concepts, the transitive mode walks the concept tree depth-first,
//! querying the catalog once per concept label and propagating identifier
//! sets up through every ancestor on the current path (set union). When no
//! top concepts exist, the flat mode queries every concept's label once
//! with no aggregation. Remote failures count as zero matches for that
//! term and never abort the pass.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use tracing::{info, warn};

use geolex_core::defaults::NO_LIMIT;
use geolex_core::{
    CatalogClient, ConceptStore, IsoLanguage, LinkedService, Result, TermCount, TermCountStore,
    Thesaurus,
};

/// Outcome of one full counting pass for a service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountReport {
    /// Rows persisted across all thesaurus/language pairs.
    pub persisted: u64,
    /// Pairs processed in transitive mode.
    pub transitive_passes: u32,
    /// Pairs processed in flat mode.
    pub flat_passes: u32,
}

struct PassCtx<'a> {
    service: &'a LinkedService,
    client: &'a dyn CatalogClient,
    store: &'a dyn ConceptStore,
    thesaurus: &'a Thesaurus,
    language: &'a IsoLanguage,
}

/// Recomputes per-concept term-occurrence counts for remote catalogs.
pub struct CatalogTermCounter {
    counts: Arc<dyn TermCountStore>,
}

impl CatalogTermCounter {
    pub fn new(counts: Arc<dyn TermCountStore>) -> Self {
        Self { counts }
    }

    /// Recompute counts for every registered service, building a CSW
    /// client per endpoint.
    pub async fn run_all(&self, stores: &[Arc<dyn ConceptStore>]) -> Result<Vec<CountReport>> {
        let mut reports = Vec::new();
        for service in self.counts.linked_services().await? {
            let client = crate::client::CswCatalogClient::for_service(&service)?;
            reports.push(self.recount(&service, &client, stores).await?);
        }
        Ok(reports)
    }

    /// Recompute counts for one service. Previous counts for the service
    /// are cleared first; the pass itself is long-running and not
    /// cancellable mid-walk.
    pub async fn recount(
        &self,
        service: &LinkedService,
        client: &dyn CatalogClient,
        stores: &[Arc<dyn ConceptStore>],
    ) -> Result<CountReport> {
        self.counts.clear_counts(service.id).await?;

        let mut report = CountReport::default();
        for store in stores {
            let thesaurus = store.thesaurus().clone();
            if !thesaurus.is_active() {
                continue;
            }
            for language in thesaurus.languages.clone() {
                let ctx = PassCtx {
                    service,
                    client,
                    store: store.as_ref(),
                    thesaurus: &thesaurus,
                    language: &language,
                };
                let tops = store.top_most_concepts(&[]).await?;
                if tops.is_empty() {
                    report.flat_passes += 1;
                    report.persisted += self.flat_pass(&ctx).await?;
                } else {
                    report.transitive_passes += 1;
                    let visited = Mutex::new(HashSet::new());
                    for top in &tops {
                        let (_, persisted) =
                            self.walk(&ctx, top.uri.clone(), &visited).await?;
                        report.persisted += persisted;
                    }
                }
            }
        }

        info!(
            subsystem = "catalog",
            component = "term_counter",
            op = "recount",
            service_id = service.id,
            result_count = report.persisted,
            transitive_passes = report.transitive_passes,
            flat_passes = report.flat_passes,
            "counting pass complete"
        );
        Ok(report)
    }

    /// One remote query; failures are logged and count as zero matches.
    async fn query_label(&self, ctx: &PassCtx<'_>, label: &str) -> BTreeSet<String> {
        match ctx.client.record_identifiers(label).await {
            Ok(identifiers) => identifiers.into_iter().collect(),
            Err(e) => {
                warn!(
                    subsystem = "catalog",
                    component = "term_counter",
                    op = "query_label",
                    service_id = ctx.service.id,
                    query = %label,
                    error = %e,
                    "remote query failed, counted as zero matches"
                );
                BTreeSet::new()
            }
        }
    }

    fn label_for<'c>(&self, ctx: &PassCtx<'_>, concept: &'c geolex_core::Concept) -> Option<&'c str> {
        concept
            .pref_labels
            .iter()
            .find(|t| &t.language == ctx.language)
            .map(|t| t.text.as_str())
    }

    /// Depth-first transitive walk. Returns the merged identifier set for
    /// the subtree and the number of rows persisted in it. The visited set
    /// bounds traversal on cyclic graphs.
    fn walk<'a>(
        &'a self,
        ctx: &'a PassCtx<'a>,
        uri: String,
        visited: &'a Mutex<HashSet<String>>,
    ) -> BoxFuture<'a, Result<(BTreeSet<String>, u64)>> {
        Box::pin(async move {
            if !visited.lock().unwrap().insert(uri.clone()) {
                return Ok((BTreeSet::new(), 0));
            }

            let Some(concept) = ctx.store.read_concept(&uri, false, Some(ctx.language)).await? else {
                return Ok((BTreeSet::new(), 0));
            };

            let label = self.label_for(ctx, &concept).map(str::to_string);
            let own = match &label {
                Some(text) => self.query_label(ctx, text).await,
                None => BTreeSet::new(),
            };

            let mut merged = own.clone();
            let mut persisted = 0u64;
            for child in concept.narrower.clone() {
                let (child_ids, child_persisted) = self.walk(ctx, child, visited).await?;
                merged.extend(child_ids);
                persisted += child_persisted;
            }

            if !merged.is_empty() {
                let identifiers: Vec<String> = merged.iter().cloned().collect();
                self.counts
                    .save_count(
                        &TermCount {
                            service_id: ctx.service.id,
                            thesaurus_uri: ctx.thesaurus.uri.clone(),
                            concept_uri: concept.uri.clone(),
                            label: label.unwrap_or_default(),
                            language: Some(ctx.language.clone()),
                            theme: concept.theme.clone(),
                            count: own.len() as i64,
                            aggregated_count: merged.len() as i64,
                        },
                        &identifiers,
                    )
                    .await?;
                persisted += 1;
            }

            Ok((merged, persisted))
        })
    }

    /// Flat mode: every concept's label queried once, no propagation.
    async fn flat_pass(&self, ctx: &PassCtx<'_>) -> Result<u64> {
        let mut persisted = 0u64;
        for concept in ctx.store.all_concepts(NO_LIMIT).await? {
            let Some(label) = self.label_for(ctx, &concept) else {
                continue;
            };
            let identifiers = self.query_label(ctx, label).await;
            if identifiers.is_empty() {
                continue;
            }
            let ids: Vec<String> = identifiers.iter().cloned().collect();
            self.counts
                .save_count(
                    &TermCount {
                        service_id: ctx.service.id,
                        thesaurus_uri: ctx.thesaurus.uri.clone(),
                        concept_uri: concept.uri.clone(),
                        label: label.to_string(),
                        language: Some(ctx.language.clone()),
                        theme: concept.theme.clone(),
                        count: identifiers.len() as i64,
                        aggregated_count: identifiers.len() as i64,
                    },
                    &ids,
                )
                .await?;
            persisted += 1;
        }
        Ok(persisted)
    }
}
