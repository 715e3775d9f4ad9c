//! Derived statistics shapes
//!
//! `EventStats` is recomputed fresh on every query and never persisted or
//! cached across calls; it always reflects the store state at read time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One user's accumulated value within the window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserValue {
    pub user_id: String,
    /// Sum of `value` across the user's events in the window.
    pub value: f64,
}

/// One clock-hour bucket of the trailing-24h histogram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourBucket {
    /// Clock hour (0-23) the bucket starts at.
    pub hour: u32,
    /// Events whose `timestamp` falls inside the bucket.
    pub count: u64,
    /// Display label, `"HH:00"`.
    pub label: String,
}

/// Rolling-window aggregate statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    /// Events inside the caller's window.
    pub total_events: u64,
    /// Count per `type`, window-scoped.
    pub events_by_type: HashMap<String, u64>,
    /// Up to 5 users, descending by accumulated value, ties in
    /// first-encountered order.
    pub top_users: Vec<UserValue>,
    /// Mean `value` over `purchase` events in the window; 0 when there are
    /// none.
    pub average_ticket: f64,
    /// Exactly 24 clock-aligned buckets, oldest first. Always covers the
    /// trailing 24 hours regardless of the caller's window.
    pub events_by_hour: Vec<HourBucket>,
    /// When this snapshot was computed.
    pub last_update: DateTime<Utc>,
}

impl EventStats {
    /// An empty snapshot computed at `now`.
    pub fn empty(now: DateTime<Utc>, events_by_hour: Vec<HourBucket>) -> Self {
        Self {
            total_events: 0,
            events_by_type: HashMap::new(),
            top_users: Vec::new(),
            average_ticket: 0.0,
            events_by_hour,
            last_update: now,
        }
    }
}
