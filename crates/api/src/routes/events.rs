//! Event ingestion, queries, statistics, and administrative correction

use axum::extract::{Path, Query, State};
use axum::Json;
use pulse_types::{EventPatch, EventStats, PulseError, StoredEvent};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{DeleteResponse, EventsQuery, EventsResponse, IngestResponse, StatsQuery};
use crate::state::AppState;

/// `POST /events` — trusted-producer ingestion, no bearer token.
pub async fn ingest(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<IngestResponse>, ApiError> {
    let stored = state.gateway.ingest(&payload).await?;
    Ok(Json(IngestResponse {
        event_id: stored.id,
    }))
}

/// `GET /events`
pub async fn list(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ApiError> {
    let filter = query.into_filter()?;
    let events = state.store.query(&filter).await?;
    let total = events.len();
    Ok(Json(EventsResponse { events, total }))
}

/// `GET /events/stats`
pub async fn stats(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<EventStats>, ApiError> {
    let hours = query.window_hours()?;
    let stats = state.aggregator.compute_stats(hours).await?;
    Ok(Json(stats))
}

/// `GET /events/:id`
pub async fn get_by_id(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredEvent>, ApiError> {
    let event = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| PulseError::NotFound(format!("event {id}")))?;
    Ok(Json(event))
}

/// `PATCH /events/:id` — administrative correction, not the hot path.
pub async fn patch(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<EventPatch>,
) -> Result<Json<StoredEvent>, ApiError> {
    let updated = state.store.update(id, patch).await?;
    Ok(Json(updated))
}

/// `DELETE /events/:id` — administrative correction, not the hot path.
pub async fn delete(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = state.store.delete(id).await?;
    if !deleted {
        return Err(PulseError::NotFound(format!("event {id}")).into());
    }
    Ok(Json(DeleteResponse { deleted }))
}
