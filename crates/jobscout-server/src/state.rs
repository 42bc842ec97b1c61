use std::sync::Arc;

use sqlx::PgPool;

use jobscout_core::AppConfig;
use jobscout_match::RecommendationEngine;
use jobscout_scraper::{ScrapeClient, ScrapeTarget};
use jobscout_sources::JobSearchClient;

use crate::scheduler::RecommendationScheduler;

/// Everything the recommendation pipeline needs, shared by the HTTP
/// handlers and the scheduled batch.
pub struct PipelineDeps {
    pub config: AppConfig,
    pub search: JobSearchClient,
    pub engine: RecommendationEngine,
    pub scrape: ScrapeClient,
    pub targets: Vec<ScrapeTarget>,
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub deps: Arc<PipelineDeps>,
    pub scheduler: Arc<RecommendationScheduler>,
}
