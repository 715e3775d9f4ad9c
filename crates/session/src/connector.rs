//! Session connector state machine
//!
//! One background task per connected client. Two independent timers run
//! while connected: a heartbeat that synthesizes a liveness signal (the
//! connector self-reports as alive even absent real traffic) and a data
//! refresh that re-queries the source regardless of push notifications.
//! Push signals that carry data trigger an immediate out-of-band refresh;
//! heartbeats never do.

use bus::Signal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, warn};

use crate::source::{DashboardSnapshot, RefreshSource};

/// Connector lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Connector timer configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Period of the synthesized liveness signal.
    pub heartbeat_interval: Duration,
    /// Period of the unconditional data re-query.
    pub refresh_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            refresh_interval: Duration::from_secs(30),
        }
    }
}

#[derive(Default)]
struct SessionShared {
    state: RwLock<ConnectionState>,
    last_signal: RwLock<Option<Signal>>,
    snapshot: RwLock<Option<DashboardSnapshot>>,
}

/// A live dashboard session.
///
/// Constructed via [`SessionConnector::connect`]; dropping the connector
/// without calling [`disconnect`](SessionConnector::disconnect) leaves the
/// background task running until the process exits, so callers should
/// disconnect explicitly.
pub struct SessionConnector {
    shared: Arc<SessionShared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionConnector {
    /// Open a session: transition `Connecting` → `Connected` and start the
    /// timer loop.
    ///
    /// `push` is the optional notification-bus subscription. `None` — or a
    /// subscription that later closes or lags — is not an error: the
    /// connector silently operates in polling-only mode on its timers.
    pub async fn connect(
        config: SessionConfig,
        source: Arc<dyn RefreshSource>,
        push: Option<broadcast::Receiver<Signal>>,
    ) -> Self {
        let shared = Arc::new(SessionShared::default());
        *shared.state.write().await = ConnectionState::Connecting;

        let task = tokio::spawn(run_session(Arc::clone(&shared), config, source, push));

        *shared.state.write().await = ConnectionState::Connected;
        debug!("session connected");

        Self {
            shared,
            task: Mutex::new(Some(task)),
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> ConnectionState {
        *self.shared.state.read().await
    }

    /// The most recent signal observed (pushed or synthesized).
    pub async fn last_signal(&self) -> Option<Signal> {
        self.shared.last_signal.read().await.clone()
    }

    /// The most recently fetched dashboard snapshot.
    pub async fn latest(&self) -> Option<DashboardSnapshot> {
        self.shared.snapshot.read().await.clone()
    }

    /// Cancel both timers and transition to `Disconnected`.
    ///
    /// Cancellation is immediate (the background task is aborted) and the
    /// call is idempotent.
    pub async fn disconnect(&self) {
        if let Some(task) = self.task.lock().await.take() {
            task.abort();
            debug!("session disconnected");
        }
        *self.shared.state.write().await = ConnectionState::Disconnected;
    }
}

async fn run_session(
    shared: Arc<SessionShared>,
    config: SessionConfig,
    source: Arc<dyn RefreshSource>,
    mut push: Option<broadcast::Receiver<Signal>>,
) {
    let mut heartbeat = interval(config.heartbeat_interval);
    let mut refresh = interval(config.refresh_interval);

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                *shared.last_signal.write().await = Some(Signal::heartbeat());
            }
            _ = refresh.tick() => {
                do_refresh(&shared, source.as_ref()).await;
            }
            received = next_push(&mut push) => {
                match received {
                    Some(signal) => {
                        let is_heartbeat = signal.is_heartbeat();
                        *shared.last_signal.write().await = Some(signal);
                        // Data-changed signals refresh out-of-band;
                        // heartbeats are liveness only.
                        if !is_heartbeat {
                            do_refresh(&shared, source.as_ref()).await;
                        }
                    }
                    None => {
                        debug!("push transport closed, continuing in polling-only mode");
                        push = None;
                    }
                }
            }
        }
    }
}

/// Await the next push signal, absorbing lag. Resolves to `None` when the
/// transport closes; pends forever in polling-only mode so the select loop
/// runs on timers alone.
async fn next_push(push: &mut Option<broadcast::Receiver<Signal>>) -> Option<Signal> {
    match push {
        Some(receiver) => loop {
            match receiver.recv().await {
                Ok(signal) => return Some(signal),
                Err(RecvError::Lagged(dropped)) => {
                    warn!(dropped, "push subscription lagged, signals dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        },
        None => std::future::pending().await,
    }
}

async fn do_refresh(shared: &SessionShared, source: &dyn RefreshSource) {
    match source.fetch().await {
        Ok(snapshot) => {
            *shared.snapshot.write().await = Some(snapshot);
        }
        Err(err) => {
            // Refresh failures keep the session alive; the next tick retries.
            warn!(error = %err, "dashboard refresh failed");
        }
    }
}
