//! Signals carried by the notification bus
//!
//! A signal's `name` is how receivers tell real data-changed notifications
//! apart from synthesized liveness heartbeats — the refresh-on-signal logic
//! depends on that distinction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A new event was ingested. Payload is the stored event.
pub const NEW_EVENT: &str = "new-event";
/// Fresh statistics are available. Payload is an `EventStats` snapshot.
pub const STATS_UPDATE: &str = "stats-update";
/// Synthesized liveness signal. Never triggers a data refresh.
pub const HEARTBEAT: &str = "heartbeat";

/// One published notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    /// Signal name ([`NEW_EVENT`], [`STATS_UPDATE`], [`HEARTBEAT`], or an
    /// application-defined name).
    pub name: String,
    /// Arbitrary JSON payload.
    pub payload: Value,
    /// When the signal was published.
    pub emitted_at: DateTime<Utc>,
}

impl Signal {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
            emitted_at: Utc::now(),
        }
    }

    /// Synthesized liveness signal.
    pub fn heartbeat() -> Self {
        Self::new(HEARTBEAT, Value::Null)
    }

    /// Whether this signal is a liveness heartbeat rather than data.
    pub fn is_heartbeat(&self) -> bool {
        self.name == HEARTBEAT
    }
}
