//! Operator CLI: ad-hoc search, single-user generation, and the full
//! batch run the scheduler performs nightly.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use jobscout_core::{AppConfig, JobSource, SearchFilters};
use jobscout_match::{EmbeddingCache, EmbeddingClient, RecommendationEngine};
use jobscout_sources::{JobSearchClient, SourceCredentials};

const SOURCE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Parser)]
#[command(name = "jobscout-cli")]
#[command(about = "jobscout command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search job sources and print the merged results as JSON
    Search {
        #[arg(long)]
        query: Option<String>,

        #[arg(long)]
        location: Option<String>,

        /// Comma-separated adapter tags (default: all)
        #[arg(long)]
        sources: Option<String>,

        #[arg(long)]
        limit: Option<usize>,
    },
    /// Generate and persist recommendations for one user
    Recommend {
        /// User id (UUID)
        user: Uuid,
    },
    /// Regenerate recommendations for every known user (the scheduler's body)
    RunBatch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = jobscout_core::load_app_config()?;
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search {
            query,
            location,
            sources,
            limit,
        } => search(&config, query, location, sources, limit).await,
        Commands::Recommend { user } => recommend(&config, user).await,
        Commands::RunBatch => run_batch(&config).await,
    }
}

async fn search(
    config: &AppConfig,
    query: Option<String>,
    location: Option<String>,
    sources: Option<String>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let api_sources = sources
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::parse::<JobSource>)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let filters = SearchFilters {
        query,
        location,
        api_sources,
        limit,
        ..SearchFilters::default()
    };

    let client = JobSearchClient::new(SourceCredentials::from_app_config(config), SOURCE_TIMEOUT_SECS)?;
    let outcome = client.search(&filters).await;

    for (source, count) in &outcome.per_source_counts {
        tracing::info!(source = %source, count, "source contribution");
    }
    println!("{}", serde_json::to_string_pretty(&outcome.jobs)?);
    Ok(())
}

async fn recommend(config: &AppConfig, user: Uuid) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let engine = build_engine(config)?;

    let profile = jobscout_db::get_user_profile(&pool, user)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {user} has no profile"))?;

    let report = engine.generate(&profile, &SearchFilters::default()).await?;
    jobscout_db::replace_recommendations(&pool, user, &report.recommendations).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Per-user failures are logged and skipped so one bad profile does not
/// abort the full run — the same contract as the scheduled batch.
async fn run_batch(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let engine = build_engine(config)?;

    let allowed = jobscout_db::get_scheduler_config(&pool)
        .await?
        .and_then(|c| c.allowed_api_sources);
    let filters = SearchFilters {
        api_sources: allowed,
        ..SearchFilters::default()
    };

    let user_ids = jobscout_db::list_user_ids(&pool).await?;
    tracing::info!(users = user_ids.len(), "regenerating recommendations");

    let mut failed = 0usize;
    for user_id in &user_ids {
        let result = async {
            let profile = jobscout_db::get_user_profile(&pool, *user_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no profile"))?;
            let report = engine.generate(&profile, &filters).await?;
            jobscout_db::replace_recommendations(&pool, *user_id, &report.recommendations).await?;
            Ok::<usize, anyhow::Error>(report.recommendations.len())
        }
        .await;

        match result {
            Ok(count) => tracing::info!(user = %user_id, recommendations = count, "persisted"),
            Err(e) => {
                tracing::error!(user = %user_id, error = %e, "user regeneration failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        tracing::warn!(failed, total = user_ids.len(), "some users failed");
    }
    Ok(())
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool = jobscout_db::connect_pool(
        &config.database_url,
        jobscout_db::PoolConfig::from_app_config(config),
    )
    .await?;
    jobscout_db::run_migrations(&pool).await?;
    Ok(pool)
}

fn build_engine(config: &AppConfig) -> anyhow::Result<RecommendationEngine> {
    let search = JobSearchClient::new(SourceCredentials::from_app_config(config), SOURCE_TIMEOUT_SECS)?;
    Ok(RecommendationEngine::new(
        search,
        EmbeddingClient::new(&config.embed_url),
        Arc::new(EmbeddingCache::new()),
        config.min_match_percentage,
    ))
}
