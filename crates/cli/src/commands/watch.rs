//! `pulse watch` - follow the dashboard from a terminal
//!
//! Runs a session connector against a remote instance. There is no push
//! transport across processes, so the connector operates in its
//! polling-only mode — the degrade path, exercised deliberately.

use async_trait::async_trait;
use chrono::Utc;
use colored::Colorize;
use pulse_types::{EventStats, PulseError, Result as PulseResult, StoredEvent};
use serde::Deserialize;
use session::{DashboardSnapshot, RefreshSource, SessionConfig, SessionConnector};
use std::sync::Arc;
use std::time::Duration;

#[derive(Deserialize)]
struct EventsBody {
    events: Vec<StoredEvent>,
}

/// Refresh source backed by the remote HTTP API.
struct HttpRefreshSource {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpRefreshSource {
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> PulseResult<T> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| PulseError::TransientStore(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PulseError::Internal(format!(
                "{path} returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PulseError::Internal(e.to_string()))
    }
}

#[async_trait]
impl RefreshSource for HttpRefreshSource {
    async fn fetch(&self) -> PulseResult<DashboardSnapshot> {
        let events: EventsBody = self.get_json("/events?limit=10").await?;
        let stats: EventStats = self.get_json("/events/stats").await?;
        Ok(DashboardSnapshot {
            events: events.events,
            stats,
            fetched_at: Utc::now(),
        })
    }
}

async fn login(client: &reqwest::Client, api_url: &str, email: &str, password: &str) -> anyhow::Result<String> {
    #[derive(Deserialize)]
    struct LoginBody {
        token: String,
    }

    let body: LoginBody = client
        .post(format!("{api_url}/auth/login"))
        .json(&serde_json::json!({"email": email, "password": password}))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(body.token)
}

fn print_snapshot(snapshot: &DashboardSnapshot) {
    let stats = &snapshot.stats;
    println!(
        "{}  events={}  avg_ticket={:.2}  updated={}",
        "dashboard".bold(),
        stats.total_events,
        stats.average_ticket,
        stats.last_update.format("%H:%M:%S"),
    );

    for user in &stats.top_users {
        println!("  {} {:<12} {:.2}", "top".cyan(), user.user_id, user.value);
    }
    for event in snapshot.events.iter().take(5) {
        println!(
            "  {} {:<12} {:<12} {}",
            "event".dimmed(),
            event.event_type,
            event.user_id,
            event.timestamp.format("%H:%M:%S"),
        );
    }
}

pub async fn run(api_url: &str, email: &str, password: &str, interval: u64) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let token = login(&client, api_url, email, password).await?;
    println!("{} authenticated against {api_url}", "✓".green());

    let source = Arc::new(HttpRefreshSource {
        client,
        base_url: api_url.to_string(),
        token,
    });

    // No cross-process push transport: the connector silently runs on its
    // timers alone.
    let connector = SessionConnector::connect(
        SessionConfig {
            heartbeat_interval: Duration::from_secs(interval),
            refresh_interval: Duration::from_secs(interval),
        },
        source,
        None,
    )
    .await;

    println!("watching (refresh every {interval}s, ctrl-c to stop)");

    let mut last_seen = None;
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                if let Some(snapshot) = connector.latest().await {
                    if last_seen != Some(snapshot.fetched_at) {
                        last_seen = Some(snapshot.fetched_at);
                        print_snapshot(&snapshot);
                    }
                }
            }
        }
    }

    connector.disconnect().await;
    println!("disconnected");
    Ok(())
}
