use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use jobscout_core::Recommendation;
use jobscout_match::{generate_reranked, MatchError, RecommendationReport, RerankClient};

use crate::middleware::RequestId;
use crate::scheduler::generate_and_persist;
use crate::state::AppState;

use super::{map_db_error, ApiError, ApiResponse, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SavedRecommendationsData {
    pub recommendations: Vec<Recommendation>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct RerankData {
    pub recommendations: Vec<Recommendation>,
    pub model: String,
}

/// On-demand embedding-based generation. Persists the result (idempotent
/// overwrite) and returns the full report, strategies included.
pub(super) async fn generate_recommendations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<RecommendationReport>>, ApiError> {
    let profile = jobscout_db::get_user_profile(&state.pool, user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "user has no profile"))?;

    let allowed = scheduler_allowed_sources(&state).await;

    let report = generate_and_persist(&state.pool, &state.deps, allowed, user_id, &profile)
        .await
        .map_err(|e| {
            tracing::error!(user = %user_id, error = %e, "recommendation generation failed");
            ApiError::new(
                req_id.0.clone(),
                "internal_error",
                "recommendation generation failed",
            )
        })?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// LLM-assisted generation. A reply the model renders unparseable is a
/// 502, never an empty success.
pub(super) async fn generate_reranked_recommendations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<RerankData>>, ApiError> {
    let profile = jobscout_db::get_user_profile(&state.pool, user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "user has no profile"))?;

    let model = scheduler_rerank_model(&state).await;
    let rerank = RerankClient::new(&state.deps.config.rerank_url, &model);

    let recommendations = generate_reranked(
        &state.deps.search,
        &state.deps.scrape,
        &state.deps.targets,
        &rerank,
        &profile,
    )
    .await
    .map_err(|e| match e {
        MatchError::RerankParse(reason) => {
            tracing::error!(user = %user_id, reason, "rerank reply unparseable");
            ApiError::new(
                req_id.0.clone(),
                "rerank_parse_failed",
                "the model reply could not be parsed",
            )
        }
        other => {
            tracing::error!(user = %user_id, error = %other, "rerank generation failed");
            ApiError::new(
                req_id.0.clone(),
                "rerank_backend_failed",
                "rerank generation failed",
            )
        }
    })?;

    jobscout_db::replace_recommendations(&state.pool, user_id, &recommendations)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: RerankData {
            recommendations,
            model,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_saved_recommendations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<SavedRecommendationsData>>, ApiError> {
    let stored = jobscout_db::get_recommendations(&state.pool, user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                "no recommendations generated for this user yet",
            )
        })?;

    Ok(Json(ApiResponse {
        data: SavedRecommendationsData {
            recommendations: stored.recommendations,
            generated_at: stored.generated_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Allowed sources from the admin scheduler config; a missing or
/// unreadable row applies no restriction.
async fn scheduler_allowed_sources(state: &AppState) -> Option<Vec<jobscout_core::JobSource>> {
    match jobscout_db::get_scheduler_config(&state.pool).await {
        Ok(config) => config.and_then(|c| c.allowed_api_sources),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read scheduler config; using all sources");
            None
        }
    }
}

async fn scheduler_rerank_model(state: &AppState) -> String {
    match jobscout_db::get_scheduler_config(&state.pool).await {
        Ok(Some(config)) => config.rerank_model,
        Ok(None) => jobscout_core::SchedulerConfig::default().rerank_model,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read scheduler config; using default model");
            jobscout_core::SchedulerConfig::default().rerank_model
        }
    }
}
