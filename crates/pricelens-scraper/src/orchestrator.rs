//! Multi-platform scrape orchestration.
//!
//! Each requested platform is an independent unit of work; all run
//! concurrently and are joined with their results in *requested* order,
//! so output never depends on completion order. A platform failure
//! (fetch exhausted, unknown tag, or zero usable records) is collected
//! into the run outcome and never aborts the others.

use std::sync::Arc;

use pricelens_core::ProductRecord;

use crate::client::FetchClient;
use crate::error::{PlatformError, PlatformFailure};
use crate::marketplaces::Marketplace;
use crate::normalize::build_record;

/// Aggregated result of one scrape run: the records that made it,
/// concatenated in requested-platform order, plus per-platform failures.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub records: Vec<ProductRecord>,
    pub failures: Vec<PlatformFailure>,
}

/// Drives marketplace adapters through fetch, parse, and normalization,
/// and aggregates their records.
pub struct Orchestrator {
    client: Arc<FetchClient>,
    marketplaces: Vec<Arc<dyn Marketplace>>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(client: FetchClient) -> Self {
        Self {
            client: Arc::new(client),
            marketplaces: Vec::new(),
        }
    }

    /// Registers a marketplace adapter. Registration order defines the
    /// default platform order when callers request "all".
    #[must_use]
    pub fn with_marketplace(mut self, marketplace: Arc<dyn Marketplace>) -> Self {
        self.marketplaces.push(marketplace);
        self
    }

    /// Tags of all registered marketplaces, in registration order.
    #[must_use]
    pub fn platform_tags(&self) -> Vec<String> {
        self.marketplaces
            .iter()
            .map(|m| m.platform_tag().to_string())
            .collect()
    }

    /// Scrapes `query` on every requested platform concurrently.
    ///
    /// Records are aggregated in the order platforms were requested, not
    /// the order scrapes complete; within one platform, listing document
    /// order is preserved end-to-end. `limit` trims each platform's
    /// listing before normalization.
    ///
    /// Cancellation (dropping the returned future, e.g. under a caller
    /// timeout) propagates to all in-flight fetches.
    pub async fn run(&self, query: &str, limit: usize, platforms: &[String]) -> RunOutcome {
        let scrapes = platforms
            .iter()
            .map(|tag| self.scrape_platform(query, limit, tag));
        let results = futures::future::join_all(scrapes).await;

        let mut outcome = RunOutcome::default();
        for result in results {
            match result {
                Ok(records) => outcome.records.extend(records),
                Err(failure) => {
                    tracing::warn!(
                        platform = %failure.platform,
                        error = %failure.error,
                        "platform scrape failed"
                    );
                    outcome.failures.push(failure);
                }
            }
        }
        outcome
    }

    async fn scrape_platform(
        &self,
        query: &str,
        limit: usize,
        tag: &str,
    ) -> Result<Vec<ProductRecord>, PlatformFailure> {
        let Some(marketplace) = self.find_marketplace(tag) else {
            return Err(PlatformFailure {
                platform: tag.to_string(),
                error: PlatformError::UnknownPlatform,
            });
        };
        let platform = marketplace.platform_tag();

        let url = marketplace.search_url(query);
        tracing::info!(platform, %url, "scraping listing");

        let markup = self.client.fetch(&url).await.map_err(|e| PlatformFailure {
            platform: platform.to_string(),
            error: PlatformError::Fetch(e),
        })?;

        let mut raw_products = marketplace.parse_listing(&markup);
        raw_products.truncate(limit);

        let records: Vec<ProductRecord> = raw_products.iter().filter_map(build_record).collect();

        if records.is_empty() {
            return Err(PlatformFailure {
                platform: platform.to_string(),
                error: PlatformError::NoRecords,
            });
        }

        tracing::info!(platform, count = records.len(), "platform scrape complete");
        Ok(records)
    }

    fn find_marketplace(&self, tag: &str) -> Option<&Arc<dyn Marketplace>> {
        self.marketplaces
            .iter()
            .find(|m| m.platform_tag().eq_ignore_ascii_case(tag))
    }
}
