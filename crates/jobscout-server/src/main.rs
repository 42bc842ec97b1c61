mod api;
mod middleware;
mod scheduler;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use jobscout_core::{Environment, SchedulerConfig};
use jobscout_match::{spawn_sweeper, EmbeddingCache, EmbeddingClient, RecommendationEngine};
use jobscout_scraper::ScrapeClient;
use jobscout_sources::{JobSearchClient, SourceCredentials};

use crate::middleware::AuthState;
use crate::state::{AppState, PipelineDeps};

/// Per-request timeout for the API source adapters.
const SOURCE_TIMEOUT_SECS: u64 = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = jobscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = jobscout_db::PoolConfig::from_app_config(&config);
    let pool = jobscout_db::connect_pool(&config.database_url, pool_config).await?;
    jobscout_db::run_migrations(&pool).await?;

    let targets = match jobscout_scraper::load_targets(&config.scrape_targets_path) {
        Ok(targets) => targets,
        Err(e) => {
            tracing::warn!(error = %e, "scrape targets unavailable; scraping adapter disabled");
            Vec::new()
        }
    };

    let search = JobSearchClient::new(SourceCredentials::from_app_config(&config), SOURCE_TIMEOUT_SECS)?;
    let embedder = EmbeddingClient::new(&config.embed_url);
    let cache = Arc::new(EmbeddingCache::new());
    let _sweeper = spawn_sweeper(Arc::clone(&cache));

    let engine = RecommendationEngine::new(
        search.clone(),
        embedder,
        Arc::clone(&cache),
        config.min_match_percentage,
    );
    let scrape = ScrapeClient::new(
        config.scraper_request_timeout_secs,
        config.scraper_max_retries,
        config.scraper_backoff_base_secs,
    )?;

    let auth = AuthState::from_env(matches!(config.env, Environment::Development))?;
    let bind_addr = config.bind_addr;

    let deps = Arc::new(PipelineDeps {
        config,
        search,
        engine,
        scrape,
        targets,
    });

    let recommendation_scheduler = Arc::new(scheduler::RecommendationScheduler::start().await?);
    let scheduler_config = match jobscout_db::get_scheduler_config(&pool).await? {
        Some(config) => config,
        None => {
            let default = SchedulerConfig::default();
            tracing::warn!(
                run_time = %default.daily_run_time,
                "no scheduler config stored; arming compiled default"
            );
            default
        }
    };
    recommendation_scheduler
        .arm(&scheduler_config, pool.clone(), Arc::clone(&deps))
        .await?;

    let app = api::build_app(
        AppState {
            pool,
            deps,
            scheduler: recommendation_scheduler,
        },
        auth,
    );

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, "jobscout server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
