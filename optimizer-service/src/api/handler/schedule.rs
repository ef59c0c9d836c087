use std::sync::Arc;

use axum::{Json, extract::State};
use shared::responses::ApiResponse;
use shared::types::{PrecheckReport, ResponseStatus, ScheduleResponse, SolveRequest};

use crate::{api::state::OptimizerAppState, error::OptimizerServiceError};

#[utoipa::path(
    post,
    path = "/api/v1/shifts/generate",
    tag = "Shifts",
    request_body = SolveRequest,
    responses(
        (status = 200, description = "Optimized shift schedule", body = ApiResponse<ScheduleResponse>)
    )
)]
#[tracing::instrument(skip(state, request))]
pub async fn generate_shifts(
    State(state): State<Arc<OptimizerAppState>>,
    Json(request): Json<SolveRequest>,
) -> Result<Json<ApiResponse<ScheduleResponse>>, OptimizerServiceError> {
    // The MILP solve blocks for up to its wall-clock limit; keep it off the
    // async workers.
    let engine = Arc::clone(&state.engine);
    let outcome = tokio::task::spawn_blocking(move || engine.generate(&request))
        .await
        .map_err(|e| OptimizerServiceError::Internal(format!("Solve task failed: {e}")))??;

    let response = ScheduleResponse {
        status: ResponseStatus::Success,
        mode: outcome.mode,
        timed_out: outcome.timed_out,
        shifts: outcome.shifts,
    };

    Ok(Json(ApiResponse::ok(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/shifts/precheck",
    tag = "Shifts",
    request_body = SolveRequest,
    responses(
        (status = 200, description = "Coverage feasibility report", body = ApiResponse<PrecheckReport>)
    )
)]
#[tracing::instrument(skip(state, request))]
pub async fn precheck_shifts(
    State(state): State<Arc<OptimizerAppState>>,
    Json(request): Json<SolveRequest>,
) -> Result<Json<ApiResponse<PrecheckReport>>, OptimizerServiceError> {
    let engine = Arc::clone(&state.engine);
    let report = tokio::task::spawn_blocking(move || engine.precheck(&request))
        .await
        .map_err(|e| OptimizerServiceError::Internal(format!("Pre-check task failed: {e}")))??;

    Ok(Json(ApiResponse::ok(report)))
}
