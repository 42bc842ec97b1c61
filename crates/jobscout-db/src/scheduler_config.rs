//! Scheduler configuration, owned by the admin-config collaborator.
//!
//! Stored as a single row; the scheduler reads it at startup and on
//! every re-arm.

use serde_json::Value;
use sqlx::PgPool;

use jobscout_core::{JobSource, SchedulerConfig};

use crate::DbError;

/// Load the scheduler configuration, or `None` if the row has never been
/// written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::Payload`]
/// if the stored source list is not the expected shape.
pub async fn get_scheduler_config(pool: &PgPool) -> Result<Option<SchedulerConfig>, DbError> {
    let row: Option<(String, Option<Value>, String)> = sqlx::query_as(
        "SELECT daily_run_time, allowed_api_sources, rerank_model FROM scheduler_config",
    )
    .fetch_optional(pool)
    .await?;

    row.map(|(daily_run_time, allowed, rerank_model)| {
        let allowed_api_sources: Option<Vec<JobSource>> =
            allowed.map(serde_json::from_value).transpose()?;
        Ok(SchedulerConfig {
            daily_run_time,
            allowed_api_sources,
            rerank_model,
        })
    })
    .transpose()
}

/// Write the scheduler configuration (single-row upsert).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails or [`DbError::Payload`]
/// if the source list cannot be serialized.
pub async fn upsert_scheduler_config(
    pool: &PgPool,
    config: &SchedulerConfig,
) -> Result<(), DbError> {
    let allowed = config
        .allowed_api_sources
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?;
    sqlx::query(
        "INSERT INTO scheduler_config (id, daily_run_time, allowed_api_sources, rerank_model, updated_at) \
         VALUES (TRUE, $1, $2, $3, now()) \
         ON CONFLICT (id) DO UPDATE \
         SET daily_run_time = EXCLUDED.daily_run_time, \
             allowed_api_sources = EXCLUDED.allowed_api_sources, \
             rerank_model = EXCLUDED.rerank_model, \
             updated_at = EXCLUDED.updated_at",
    )
    .bind(&config.daily_run_time)
    .bind(allowed)
    .bind(&config.rerank_model)
    .execute(pool)
    .await?;
    Ok(())
}
