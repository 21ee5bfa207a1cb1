//! REST handlers. Each one is a thin adapter over [`HealthMonitor`].

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use health_checker::{
    CreateTargetRequest, HealthCheckResult, HealthSummary, Target, UpdateTargetRequest,
};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    #[serde(default)]
    pub force: bool,
}

pub async fn health_handler() -> &'static str {
    "OK"
}

/// POST /api/targets
pub async fn create_target(
    State(state): State<AppState>,
    payload: Result<Json<CreateTargetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Target>), ApiError> {
    let Json(request) = payload?;
    let target = state.monitor.create_target(request).await?;
    Ok((StatusCode::CREATED, Json(target)))
}

/// GET /api/targets
pub async fn list_targets(State(state): State<AppState>) -> Json<Vec<Target>> {
    Json(state.monitor.list_targets().await)
}

/// GET /api/targets/:id
pub async fn get_target(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Target>, ApiError> {
    Ok(Json(state.monitor.get_target(id).await?))
}

/// PUT /api/targets/:id
pub async fn update_target(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateTargetRequest>, JsonRejection>,
) -> Result<Json<Target>, ApiError> {
    let Json(update) = payload?;
    Ok(Json(state.monitor.update_target(id, update).await?))
}

/// DELETE /api/targets/:id
pub async fn delete_target(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.monitor.delete_target(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// POST /api/targets/:id/check?force=bool
pub async fn check_target(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<HealthCheckResult>, ApiError> {
    Ok(Json(state.monitor.check_target(id, query.force).await?))
}

/// GET /api/health/results
pub async fn last_results(State(state): State<AppState>) -> Json<HashMap<Uuid, HealthCheckResult>> {
    Json(state.monitor.get_last_results())
}

/// GET /api/health/summary
pub async fn summary(State(state): State<AppState>) -> Json<HealthSummary> {
    Json(state.monitor.get_summary())
}
