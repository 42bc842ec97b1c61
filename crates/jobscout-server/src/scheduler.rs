//! Daily recommendation batch scheduling.
//!
//! One recurring trigger regenerates and persists recommendations for
//! every known user. The trigger is a start/stop-capable handle owned by
//! [`RecommendationScheduler`]: re-arming always stops the previous
//! trigger before arming the new one, so at most one is ever active.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

use jobscout_core::{JobSource, SchedulerConfig, SearchFilters};
use jobscout_match::RecommendationReport;

use crate::state::PipelineDeps;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid daily run time '{0}': expected HH:MM")]
    InvalidRunTime(String),

    #[error(transparent)]
    Scheduler(#[from] JobSchedulerError),
}

/// Owner of the single recurring batch trigger.
pub struct RecommendationScheduler {
    scheduler: JobScheduler,
    active_job: Mutex<Option<Uuid>>,
}

impl RecommendationScheduler {
    /// Build and start the underlying scheduler with no job armed yet.
    ///
    /// # Errors
    ///
    /// Returns [`JobSchedulerError`] if the scheduler cannot be
    /// initialised or started.
    pub async fn start() -> Result<Self, JobSchedulerError> {
        let scheduler = JobScheduler::new().await?;
        scheduler.start().await?;
        Ok(Self {
            scheduler,
            active_job: Mutex::new(None),
        })
    }

    /// Arm the daily trigger from `config`, stopping any previously armed
    /// trigger first.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidRunTime`] if `daily_run_time` is
    /// not `HH:MM`, or [`SchedulerError::Scheduler`] if the job cannot be
    /// registered.
    pub async fn arm(
        &self,
        config: &SchedulerConfig,
        pool: PgPool,
        deps: Arc<PipelineDeps>,
    ) -> Result<(), SchedulerError> {
        let cron = daily_cron_expression(&config.daily_run_time)?;

        self.stop().await?;

        let allowed = config.allowed_api_sources.clone();
        let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
            let pool = pool.clone();
            let deps = Arc::clone(&deps);
            let allowed = allowed.clone();
            Box::pin(async move {
                tracing::info!("scheduler: starting daily recommendation batch");
                run_batch(&pool, &deps, allowed).await;
                tracing::info!("scheduler: daily recommendation batch complete");
            })
        })?;

        let id = self.scheduler.add(job).await?;
        *self.active_job.lock().await = Some(id);
        tracing::info!(run_time = %config.daily_run_time, "scheduler: daily trigger armed");
        Ok(())
    }

    /// Stop the active trigger, if any. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Scheduler`] if removal fails.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        if let Some(previous) = self.active_job.lock().await.take() {
            self.scheduler.remove(&previous).await?;
            tracing::info!(job_id = %previous, "scheduler: previous trigger stopped");
        }
        Ok(())
    }

    /// The currently armed trigger id, if any.
    pub async fn active_job_id(&self) -> Option<Uuid> {
        *self.active_job.lock().await
    }
}

/// Translate `"HH:MM"` into the daily 6-field cron expression.
fn daily_cron_expression(run_time: &str) -> Result<String, SchedulerError> {
    let invalid = || SchedulerError::InvalidRunTime(run_time.to_string());

    let (hours, minutes) = run_time.split_once(':').ok_or_else(invalid)?;
    let hours: u8 = hours.parse().map_err(|_| invalid())?;
    let minutes: u8 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    Ok(format!("0 {minutes} {hours} * * *"))
}

/// Regenerate and persist recommendations for every known user.
///
/// A single user's failure is logged and skipped; the batch continues.
pub async fn run_batch(pool: &PgPool, deps: &PipelineDeps, allowed: Option<Vec<JobSource>>) {
    let user_ids = match jobscout_db::list_user_ids(pool).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to enumerate users");
            return;
        }
    };

    tracing::info!(users = user_ids.len(), "scheduler: regenerating recommendations");

    let mut failed: usize = 0;
    for user_id in &user_ids {
        let profile = match jobscout_db::get_user_profile(pool, *user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::warn!(user = %user_id, "scheduler: user has no profile; skipping");
                continue;
            }
            Err(e) => {
                tracing::error!(user = %user_id, error = %e, "scheduler: profile load failed");
                failed += 1;
                continue;
            }
        };

        match generate_and_persist(pool, deps, allowed.clone(), *user_id, &profile).await {
            Ok(report) => {
                tracing::debug!(
                    user = %user_id,
                    recommendations = report.recommendations.len(),
                    "scheduler: user recommendations persisted"
                );
            }
            Err(e) => {
                tracing::error!(user = %user_id, error = %e, "scheduler: user regeneration failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        tracing::warn!(failed, total = user_ids.len(), "scheduler: some users failed");
    }
}

/// Run the embedding-based generator for one user and overwrite their
/// persisted recommendations. Shared by the scheduled batch and the
/// on-demand endpoint.
///
/// # Errors
///
/// Returns an error if generation fails at the pipeline level or
/// persistence fails.
pub async fn generate_and_persist(
    pool: &PgPool,
    deps: &PipelineDeps,
    allowed: Option<Vec<JobSource>>,
    user_id: Uuid,
    profile: &jobscout_core::UserProfileSummary,
) -> anyhow::Result<RecommendationReport> {
    let filters = SearchFilters {
        api_sources: allowed,
        ..SearchFilters::default()
    };
    let report = deps.engine.generate(profile, &filters).await?;
    jobscout_db::replace_recommendations(pool, user_id, &report.recommendations).await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_time_translates_to_daily_cron() {
        assert_eq!(daily_cron_expression("07:30").unwrap(), "0 30 7 * * *");
        assert_eq!(daily_cron_expression("00:00").unwrap(), "0 0 0 * * *");
        assert_eq!(daily_cron_expression("23:59").unwrap(), "0 59 23 * * *");
    }

    #[test]
    fn malformed_run_times_are_rejected() {
        for raw in ["7", "24:00", "12:60", "ab:cd", "12:00:00", ""] {
            assert!(
                daily_cron_expression(raw).is_err(),
                "expected '{raw}' to be rejected"
            );
        }
    }

    #[tokio::test]
    async fn stop_without_an_armed_trigger_is_a_no_op() {
        let scheduler = RecommendationScheduler::start().await.unwrap();
        scheduler.stop().await.unwrap();
        assert!(scheduler.active_job_id().await.is_none());
    }

    fn test_deps() -> PipelineDeps {
        use jobscout_core::{AppConfig, Environment};
        use jobscout_match::{EmbeddingCache, EmbeddingClient, RecommendationEngine};
        use jobscout_scraper::ScrapeClient;
        use jobscout_sources::{JobSearchClient, SourceCredentials};

        let config = AppConfig {
            database_url: "postgres://localhost/unused".to_string(),
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "info".to_string(),
            embed_url: "http://127.0.0.1:9".to_string(),
            rerank_url: "http://127.0.0.1:9".to_string(),
            adzuna_app_id: None,
            adzuna_app_key: None,
            jooble_api_key: None,
            usajobs_api_key: None,
            usajobs_contact_email: None,
            scrape_targets_path: std::path::PathBuf::from("unused.yaml"),
            scraper_request_timeout_secs: 5,
            scraper_max_retries: 0,
            scraper_backoff_base_secs: 0,
            min_match_percentage: 30,
            db_max_connections: 1,
            db_min_connections: 1,
            db_acquire_timeout_secs: 1,
        };
        let search = JobSearchClient::new(SourceCredentials::default(), 5).unwrap();
        let engine = RecommendationEngine::new(
            search.clone(),
            EmbeddingClient::new("http://127.0.0.1:9"),
            Arc::new(EmbeddingCache::new()),
            30,
        );
        PipelineDeps {
            config,
            search,
            engine,
            scrape: ScrapeClient::new(5, 0, 0).unwrap(),
            targets: Vec::new(),
        }
    }

    fn lazy_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap()
    }

    #[tokio::test]
    async fn rearming_replaces_the_previous_trigger() {
        let scheduler = RecommendationScheduler::start().await.unwrap();
        let deps = Arc::new(test_deps());
        let pool = lazy_pool();

        let first_config = SchedulerConfig {
            daily_run_time: "06:00".to_string(),
            ..SchedulerConfig::default()
        };
        scheduler
            .arm(&first_config, pool.clone(), Arc::clone(&deps))
            .await
            .unwrap();
        let first = scheduler.active_job_id().await.unwrap();

        let second_config = SchedulerConfig {
            daily_run_time: "08:15".to_string(),
            ..SchedulerConfig::default()
        };
        scheduler.arm(&second_config, pool, deps).await.unwrap();
        let second = scheduler.active_job_id().await.unwrap();

        assert_ne!(first, second, "the old trigger must be replaced, not kept");
    }

    #[tokio::test]
    async fn invalid_run_time_fails_the_arm() {
        let scheduler = RecommendationScheduler::start().await.unwrap();
        let config = SchedulerConfig {
            daily_run_time: "25:00".to_string(),
            ..SchedulerConfig::default()
        };
        let err = scheduler
            .arm(&config, lazy_pool(), Arc::new(test_deps()))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidRunTime(_)));
    }
}
