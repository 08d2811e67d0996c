//! Mesh status endpoint

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub live_connections: usize,
    pub refresh_period_secs: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    let live_connections = state
        .supervisor
        .live_connections()
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;

    Ok(Json(StatusResponse {
        live_connections,
        refresh_period_secs: state.refresh_period_secs,
        started_at: state.started_at,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    }))
}
