use axum::{extract::State, Extension, Json};
use serde::Serialize;

use jobscout_core::SchedulerConfig;

use crate::middleware::RequestId;
use crate::scheduler::SchedulerError;
use crate::state::AppState;

use super::{map_db_error, ApiError, ApiResponse, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SchedulerUpdateData {
    pub daily_run_time: String,
    pub rerank_model: String,
    pub armed: bool,
}

/// Replace the scheduler configuration and re-arm the daily trigger.
///
/// Re-arming always stops the previous trigger before arming the new
/// one — at most one trigger is ever active.
pub(super) async fn update_scheduler(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(config): Json<SchedulerConfig>,
) -> Result<Json<ApiResponse<SchedulerUpdateData>>, ApiError> {
    state
        .scheduler
        .arm(&config, state.pool.clone(), state.deps.clone())
        .await
        .map_err(|e| match e {
            SchedulerError::InvalidRunTime(raw) => ApiError::new(
                req_id.0.clone(),
                "validation_error",
                format!("invalid daily run time '{raw}': expected HH:MM"),
            ),
            SchedulerError::Scheduler(e) => {
                tracing::error!(error = %e, "failed to re-arm scheduler");
                ApiError::new(req_id.0.clone(), "internal_error", "failed to re-arm scheduler")
            }
        })?;

    jobscout_db::upsert_scheduler_config(&state.pool, &config)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: SchedulerUpdateData {
            daily_run_time: config.daily_run_time,
            rerank_model: config.rerank_model,
            armed: true,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
