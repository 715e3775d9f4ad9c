//! Shared application state

use bus::NotificationBus;
use ingest::{GatewayConfig, IngestionGateway};
use pulse_config::PulseConfig;
use stats::StatsAggregator;
use std::sync::Arc;
use std::time::{Duration, Instant};
use store::{EventStore, MemoryEventStore};

use crate::auth::AuthService;

/// Everything a handler needs, cloned cheaply per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub aggregator: StatsAggregator,
    pub bus: Arc<NotificationBus>,
    pub gateway: IngestionGateway,
    pub auth: AuthService,
    pub service_name: String,
    pub request_timeout_secs: u64,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the engine together from configuration: one store, one bus, one
    /// gateway and one aggregator per process, all sharing the same store.
    pub fn from_config(config: &PulseConfig) -> Self {
        let store: Arc<dyn EventStore> = Arc::new(MemoryEventStore::new());
        let bus = Arc::new(NotificationBus::new());
        let gateway = IngestionGateway::with_config(
            Arc::clone(&store),
            Arc::clone(&bus),
            GatewayConfig {
                channel: config.ingest.channel.clone(),
                max_append_attempts: config.ingest.max_append_attempts,
                retry_backoff: Duration::from_millis(config.ingest.retry_backoff_ms),
            },
        );

        Self {
            aggregator: StatsAggregator::new(Arc::clone(&store)),
            store,
            bus,
            gateway,
            auth: AuthService::new(&config.auth),
            service_name: config.service.name.clone(),
            request_timeout_secs: config.service.request_timeout_secs,
            started_at: Instant::now(),
        }
    }
}
