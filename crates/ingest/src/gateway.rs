//! Ingestion gateway implementation

use bus::{signal, NotificationBus, Signal};
use pulse_types::{NewEvent, PulseError, Result, StoredEvent};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use store::EventStore;
use tracing::{debug, warn};

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Channel data-changed signals are published to.
    pub channel: String,
    /// Total append attempts before a transient store failure surfaces.
    pub max_append_attempts: u32,
    /// Backoff between append attempts.
    pub retry_backoff: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            channel: bus::DASHBOARD_CHANNEL.to_string(),
            max_append_attempts: 3,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

impl GatewayConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.channel.is_empty() {
            return Err(PulseError::Config("channel must not be empty".to_string()));
        }
        if self.max_append_attempts == 0 {
            return Err(PulseError::Config(
                "max_append_attempts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Validating write path into the event store.
///
/// Holds its store and bus as injected dependencies; one gateway serves the
/// whole process.
#[derive(Clone)]
pub struct IngestionGateway {
    store: Arc<dyn EventStore>,
    bus: Arc<NotificationBus>,
    config: GatewayConfig,
}

impl IngestionGateway {
    pub fn new(store: Arc<dyn EventStore>, bus: Arc<NotificationBus>) -> Self {
        Self::with_config(store, bus, GatewayConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn EventStore>,
        bus: Arc<NotificationBus>,
        config: GatewayConfig,
    ) -> Self {
        Self { store, bus, config }
    }

    /// Validate and store a raw event payload, then notify subscribers.
    ///
    /// Fails with `PulseError::Validation` listing every violated field
    /// rule. On success the event is durable in the store before any
    /// notification is attempted; a notification that reaches nobody (or
    /// fails outright) is logged and swallowed — ingestion has already
    /// succeeded.
    pub async fn ingest(&self, raw: &Value) -> Result<StoredEvent> {
        let event = NewEvent::from_value(raw)?;
        let stored = self.append_with_retry(event).await?;
        self.notify(&stored);
        Ok(stored)
    }

    /// Append, retrying transient store failures a bounded number of times.
    async fn append_with_retry(&self, event: NewEvent) -> Result<StoredEvent> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.append(event.clone()).await {
                Ok(stored) => return Ok(stored),
                Err(err) if err.is_retryable() && attempt < self.config.max_append_attempts => {
                    warn!(attempt, error = %err, "transient store failure, retrying append");
                    tokio::time::sleep(self.config.retry_backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Fire-and-forget fan-out of the stored event.
    fn notify(&self, stored: &StoredEvent) {
        let payload = match serde_json::to_value(stored) {
            Ok(payload) => payload,
            Err(err) => {
                // Absorbed here, never returned to the producer.
                let failure =
                    PulseError::NotificationDelivery(format!("payload encoding failed: {err}"));
                warn!(event_id = %stored.id, error = %failure, "notification skipped");
                return;
            }
        };

        let delivered = self
            .bus
            .publish(&self.config.channel, Signal::new(signal::NEW_EVENT, payload));
        debug!(
            event_id = %stored.id,
            channel = %self.config.channel,
            delivered,
            "ingest notification published"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pulse_types::{EventFilter, EventPatch};
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use store::MemoryEventStore;
    use uuid::Uuid;

    fn valid_payload() -> Value {
        json!({
            "userId": "u1",
            "type": "purchase",
            "value": 100.0,
            "timestamp": "2024-01-01T10:00:00Z",
        })
    }

    #[tokio::test]
    async fn test_ingest_stores_and_returns_the_event() {
        let store = Arc::new(MemoryEventStore::new());
        let gateway = IngestionGateway::new(store.clone(), Arc::new(NotificationBus::new()));

        let stored = gateway.ingest(&valid_payload()).await.unwrap();
        assert_eq!(stored.user_id, "u1");
        assert_eq!(stored.value, 100.0);

        let events = store.query(&EventFilter::default()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, stored.id);
    }

    #[tokio::test]
    async fn test_ingest_with_zero_subscribers_succeeds() {
        let gateway = IngestionGateway::new(
            Arc::new(MemoryEventStore::new()),
            Arc::new(NotificationBus::new()),
        );

        // Nobody is listening on the dashboard channel; ingestion must
        // neither fail nor hang.
        assert!(gateway.ingest(&valid_payload()).await.is_ok());
    }

    #[tokio::test]
    async fn test_ingest_notifies_subscribers_with_the_stored_event() {
        let bus = Arc::new(NotificationBus::new());
        let gateway = IngestionGateway::new(Arc::new(MemoryEventStore::new()), bus.clone());

        let mut rx = bus.subscribe(bus::DASHBOARD_CHANNEL);
        let stored = gateway.ingest(&valid_payload()).await.unwrap();

        let signal = rx.recv().await.unwrap();
        assert_eq!(signal.name, signal::NEW_EVENT);
        assert_eq!(signal.payload["id"], json!(stored.id.to_string()));
        assert_eq!(signal.payload["userId"], json!("u1"));
    }

    #[tokio::test]
    async fn test_ingest_reports_every_validation_failure() {
        let gateway = IngestionGateway::new(
            Arc::new(MemoryEventStore::new()),
            Arc::new(NotificationBus::new()),
        );

        let err = gateway.ingest(&json!({})).await.unwrap_err();
        match err {
            PulseError::Validation(violations) => {
                assert!(violations.iter().any(|v| v.contains("userId")));
                assert!(violations.iter().any(|v| v.contains("type")));
                assert!(violations.iter().any(|v| v.contains("timestamp")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    /// Store that fails transiently a fixed number of times before
    /// delegating to a real in-memory store.
    struct FlakyStore {
        inner: MemoryEventStore,
        failures_left: AtomicU32,
    }

    #[async_trait]
    impl EventStore for FlakyStore {
        async fn append(&self, event: NewEvent) -> Result<StoredEvent> {
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(PulseError::TransientStore("store offline".to_string()));
            }
            self.inner.append(event).await
        }

        async fn query(&self, filter: &EventFilter) -> Result<Vec<StoredEvent>> {
            self.inner.query(filter).await
        }

        async fn snapshot(&self) -> Result<Vec<StoredEvent>> {
            self.inner.snapshot().await
        }

        async fn get(&self, id: Uuid) -> Result<Option<StoredEvent>> {
            self.inner.get(id).await
        }

        async fn update(&self, id: Uuid, patch: EventPatch) -> Result<StoredEvent> {
            self.inner.update(id, patch).await
        }

        async fn delete(&self, id: Uuid) -> Result<bool> {
            self.inner.delete(id).await
        }

        async fn len(&self) -> Result<usize> {
            self.inner.len().await
        }
    }

    #[tokio::test]
    async fn test_transient_store_failures_are_retried() {
        let store = Arc::new(FlakyStore {
            inner: MemoryEventStore::new(),
            failures_left: AtomicU32::new(2),
        });
        let gateway = IngestionGateway::with_config(
            store,
            Arc::new(NotificationBus::new()),
            GatewayConfig {
                retry_backoff: Duration::from_millis(1),
                ..Default::default()
            },
        );

        // Two transient failures, third attempt lands.
        assert!(gateway.ingest(&valid_payload()).await.is_ok());
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let store = Arc::new(FlakyStore {
            inner: MemoryEventStore::new(),
            failures_left: AtomicU32::new(10),
        });
        let gateway = IngestionGateway::with_config(
            store,
            Arc::new(NotificationBus::new()),
            GatewayConfig {
                retry_backoff: Duration::from_millis(1),
                ..Default::default()
            },
        );

        let err = gateway.ingest(&valid_payload()).await.unwrap_err();
        assert_eq!(err.kind(), "transient_store_error");
    }

    #[test]
    fn test_config_validation() {
        assert!(GatewayConfig::default().validate().is_ok());
        assert!(GatewayConfig {
            channel: String::new(),
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(GatewayConfig {
            max_append_attempts: 0,
            ..Default::default()
        }
        .validate()
        .is_err());
    }
}
