//! Persisted recommendations, one row per user.
//!
//! Writes are idempotent overwrites: a generation cycle replaces the
//! user's entire recommendation set, never appends to it.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use jobscout_core::Recommendation;

use crate::DbError;

#[derive(Debug, Clone)]
pub struct StoredRecommendations {
    pub recommendations: Vec<Recommendation>,
    pub generated_at: DateTime<Utc>,
}

/// Replace the user's persisted recommendations with `recommendations`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails or [`DbError::Payload`]
/// if the recommendations cannot be serialized.
pub async fn replace_recommendations(
    pool: &PgPool,
    user_id: Uuid,
    recommendations: &[Recommendation],
) -> Result<(), DbError> {
    let payload = serde_json::to_value(recommendations)?;
    sqlx::query(
        "INSERT INTO recommendations (user_id, payload, generated_at) \
         VALUES ($1, $2, now()) \
         ON CONFLICT (user_id) DO UPDATE \
         SET payload = EXCLUDED.payload, generated_at = EXCLUDED.generated_at",
    )
    .bind(user_id)
    .bind(payload)
    .execute(pool)
    .await?;
    Ok(())
}

/// Load the user's persisted recommendations, or `None` if no generation
/// cycle has run for them yet.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::Payload`]
/// if the stored payload is not the expected shape.
pub async fn get_recommendations(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<StoredRecommendations>, DbError> {
    let row: Option<(Value, DateTime<Utc>)> = sqlx::query_as(
        "SELECT payload, generated_at FROM recommendations WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(|(payload, generated_at)| {
        let recommendations: Vec<Recommendation> = serde_json::from_value(payload)?;
        Ok(StoredRecommendations {
            recommendations,
            generated_at,
        })
    })
    .transpose()
}
