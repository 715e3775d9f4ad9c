//! Refresh data source seam
//!
//! The connector does not know where its data comes from: a live in-process
//! store, a remote HTTP API, or a test double all sit behind
//! [`RefreshSource`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_types::{EventStats, Result, StoredEvent};
use serde::{Deserialize, Serialize};

/// What a dashboard session displays: the latest events and the current
/// statistics, stamped with when they were fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub events: Vec<StoredEvent>,
    pub stats: EventStats,
    pub fetched_at: DateTime<Utc>,
}

/// Source of dashboard data, re-queried on every refresh tick.
#[async_trait]
pub trait RefreshSource: Send + Sync {
    /// Fetch the current events and statistics.
    async fn fetch(&self) -> Result<DashboardSnapshot>;
}
