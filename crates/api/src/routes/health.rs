//! Liveness endpoint

use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::models::HealthResponse;
use crate::state::AppState;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let events_stored = state.store.len().await?;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        events_stored,
    }))
}
