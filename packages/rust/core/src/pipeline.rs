//! End-to-end search pipeline: query → catalog search → enrich → assemble.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};

use bookadvisor_catalog::{DescriptionEnricher, RemoteCatalogClient};
use bookadvisor_shared::{BookAdvisorError, BookRecord, CatalogConfig, RawHit, Result};

use crate::assembler::{self, RESULTS_GROUP, ResultTree};

/// Progress callback for reporting pipeline status.
pub trait SearchProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each hit's description lookup finishes, in catalog order.
    fn hit_enriched(&self, title: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, results: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl SearchProgress for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn hit_enriched(&self, _title: &str, _current: usize, _total: usize) {}
    fn done(&self, _results: usize) {}
}

/// Check that `query` is usable, returning it trimmed.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(BookAdvisorError::validation("query cannot be empty"));
    }
    Ok(trimmed)
}

/// Search, enrich and assemble book records for a query.
#[derive(Debug, Clone)]
pub struct SearchPipeline {
    client: RemoteCatalogClient,
    enricher: DescriptionEnricher,
    cover_url_template: String,
    enrich_concurrency: usize,
}

impl SearchPipeline {
    /// Build a pipeline whose client and enricher share one HTTP pool.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let http = bookadvisor_catalog::build_client(config.timeout_secs)?;
        Ok(Self::from_parts(
            RemoteCatalogClient::with_client(http.clone(), config),
            DescriptionEnricher::with_client(http, config),
            config,
        ))
    }

    /// Build a pipeline from already constructed components.
    pub fn from_parts(
        client: RemoteCatalogClient,
        enricher: DescriptionEnricher,
        config: &CatalogConfig,
    ) -> Self {
        Self {
            client,
            enricher,
            cover_url_template: config.cover_url_template.clone(),
            enrich_concurrency: config.enrich_concurrency.max(1),
        }
    }

    /// Run the pipeline without progress reporting.
    pub async fn run(&self, query: &str) -> Vec<BookRecord> {
        self.run_with_progress(query, Arc::new(SilentProgress)).await
    }

    /// Run the full pipeline on a dedicated task and wait for it to finish.
    ///
    /// 1. Search the catalog (capped result count)
    /// 2. Look up each hit's description
    /// 3. Assemble records into a result group and flatten it
    ///
    /// A blank query returns no records without touching the network. The
    /// caller only ever sees the complete, catalog-ordered result.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn run_with_progress(
        &self,
        query: &str,
        progress: Arc<dyn SearchProgress>,
    ) -> Vec<BookRecord> {
        if query.trim().is_empty() {
            debug!("blank query, skipping search");
            return Vec::new();
        }

        let worker = self.clone();
        let query = query.to_string();
        let handle =
            tokio::spawn(async move { worker.execute(&query, progress.as_ref()).await });

        match handle.await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "search worker failed");
                Vec::new()
            }
        }
    }

    async fn execute(&self, query: &str, progress: &dyn SearchProgress) -> Vec<BookRecord> {
        let start = Instant::now();

        // --- Phase 1: Search ---
        progress.phase("Searching catalog");
        let hits = self.client.search(query).await;

        // --- Phase 2: Enrich ---
        progress.phase("Fetching descriptions");
        let descriptions = self.enrich_all(&hits, progress).await;

        // --- Phase 3: Assemble ---
        let mut tree = ResultTree::group(RESULTS_GROUP);
        for (hit, description) in hits.iter().zip(descriptions) {
            tree.add(ResultTree::leaf(assembler::to_record(
                hit,
                description,
                &self.cover_url_template,
            )));
        }
        let records = tree.flatten();

        progress.done(records.len());

        info!(
            results = records.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "search pipeline complete"
        );

        records
    }

    /// One description per hit, in hit order.
    async fn enrich_all(&self, hits: &[RawHit], progress: &dyn SearchProgress) -> Vec<String> {
        let total = hits.len();
        let mut descriptions = Vec::with_capacity(total);

        if self.enrich_concurrency <= 1 {
            for (i, hit) in hits.iter().enumerate() {
                descriptions.push(self.enricher.enrich(&hit.key).await);
                progress.hit_enriched(&hit.title, i + 1, total);
            }
            return descriptions;
        }

        let semaphore = Arc::new(Semaphore::new(self.enrich_concurrency));
        let handles: Vec<_> = hits
            .iter()
            .map(|hit| {
                let enricher = self.enricher.clone();
                let sem = Arc::clone(&semaphore);
                let key = hit.key.clone();
                tokio::spawn(async move {
                    let _permit = sem.acquire_owned().await;
                    enricher.enrich(&key).await
                })
            })
            .collect();

        // Joining in spawn order keeps descriptions aligned with hits.
        for (i, (hit, handle)) in hits.iter().zip(handles).enumerate() {
            let description = match handle.await {
                Ok(description) => description,
                Err(e) => {
                    warn!(key = %hit.key, error = %e, "description task failed");
                    String::new()
                }
            };
            progress.hit_enriched(&hit.title, i + 1, total);
            descriptions.push(description);
        }

        descriptions
    }
}
