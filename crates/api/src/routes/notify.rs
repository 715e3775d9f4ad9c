//! Internal notification surface
//!
//! The external producer's view of the bus. Publishing is best-effort:
//! reaching zero subscribers is a normal outcome, never a failure.

use axum::extract::State;
use axum::Json;
use bus::Signal;

use crate::models::{ChannelInfo, ChannelsResponse, NotifyRequest, NotifyResponse};
use crate::state::AppState;

/// Default signal name for externally published notifications.
const DEFAULT_SIGNAL: &str = "notification";

/// `POST /notify`
pub async fn publish(
    State(state): State<AppState>,
    Json(request): Json<NotifyRequest>,
) -> Json<NotifyResponse> {
    let name = request.signal.unwrap_or_else(|| DEFAULT_SIGNAL.to_string());
    let delivered = state
        .bus
        .publish(&request.channel, Signal::new(name, request.payload));
    Json(NotifyResponse { delivered })
}

/// `GET /notify`
pub async fn channels(State(state): State<AppState>) -> Json<ChannelsResponse> {
    let channels = state
        .bus
        .channel_counts()
        .into_iter()
        .map(|(channel, subscribers)| ChannelInfo {
            channel,
            subscribers,
        })
        .collect();
    Json(ChannelsResponse { channels })
}
