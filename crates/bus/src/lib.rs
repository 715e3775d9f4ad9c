//! Best-effort in-process notification bus
//!
//! Fan-out with broadcast semantics: every current subscriber of a channel
//! receives every publish, delivery is at-most-once, and there is no
//! buffering or replay — a subscriber that connects after a publish never
//! sees it. Publishing with zero subscribers is a no-op, not an error, and
//! never blocks the publisher.

pub mod signal;

pub use signal::Signal;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

/// Channel name live dashboard sessions subscribe to.
pub const DASHBOARD_CHANNEL: &str = "dashboard";

/// Per-channel broadcast capacity. A subscriber that falls further behind
/// than this observes `Lagged` and loses the overwritten signals —
/// acceptable under at-most-once delivery.
const CHANNEL_CAPACITY: usize = 256;

/// Named-channel notification bus.
///
/// Cheap to share as `Arc<NotificationBus>`; channels are created lazily on
/// first subscribe or publish.
#[derive(Debug, Default)]
pub struct NotificationBus {
    channels: DashMap<String, broadcast::Sender<Signal>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a signal to every current subscriber of `channel`.
    ///
    /// Returns the number of receivers the signal was handed to. Zero
    /// subscribers (or an unknown channel) returns 0 without error.
    pub fn publish(&self, channel: &str, signal: Signal) -> usize {
        let Some(sender) = self.channels.get(channel) else {
            debug!(channel, signal = %signal.name, "publish to unknown channel, no subscribers");
            return 0;
        };

        match sender.send(signal) {
            Ok(delivered) => {
                debug!(channel, delivered, "signal published");
                delivered
            }
            Err(_) => {
                // All receivers dropped since the channel was created.
                debug!(channel, "publish with no live subscribers");
                0
            }
        }
    }

    /// Subscribe to a channel, creating it if needed.
    ///
    /// The receiver yields signals published after this call, for as long
    /// as the subscriber keeps it alive.
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<Signal> {
        self.channels
            .entry(channel.to_string())
            .or_insert_with(|| {
                debug!(channel, "channel created");
                broadcast::channel(CHANNEL_CAPACITY).0
            })
            .subscribe()
    }

    /// Current subscriber count for a channel.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .get(channel)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Subscriber counts for every known channel.
    pub fn channel_counts(&self) -> Vec<(String, usize)> {
        self.channels
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().receiver_count()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data_signal() -> Signal {
        Signal::new(signal::NEW_EVENT, json!({"id": "e1"}))
    }

    #[tokio::test]
    async fn test_publish_with_zero_subscribers_is_a_noop() {
        let bus = NotificationBus::new();
        assert_eq!(bus.publish(DASHBOARD_CHANNEL, data_signal()), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_every_publish() {
        let bus = NotificationBus::new();
        let mut rx1 = bus.subscribe(DASHBOARD_CHANNEL);
        let mut rx2 = bus.subscribe(DASHBOARD_CHANNEL);

        let delivered = bus.publish(DASHBOARD_CHANNEL, data_signal());
        assert_eq!(delivered, 2);

        assert_eq!(rx1.recv().await.unwrap().name, signal::NEW_EVENT);
        assert_eq!(rx2.recv().await.unwrap().name, signal::NEW_EVENT);
    }

    #[tokio::test]
    async fn test_late_subscriber_never_sees_earlier_publishes() {
        let bus = NotificationBus::new();
        let mut early = bus.subscribe(DASHBOARD_CHANNEL);
        bus.publish(DASHBOARD_CHANNEL, data_signal());

        let mut late = bus.subscribe(DASHBOARD_CHANNEL);
        bus.publish(DASHBOARD_CHANNEL, Signal::new(signal::STATS_UPDATE, json!({})));

        assert_eq!(early.recv().await.unwrap().name, signal::NEW_EVENT);
        assert_eq!(early.recv().await.unwrap().name, signal::STATS_UPDATE);
        // The late subscriber only sees the second publish.
        assert_eq!(late.recv().await.unwrap().name, signal::STATS_UPDATE);
        assert!(late.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_channels_are_independent() {
        let bus = NotificationBus::new();
        let mut dashboard = bus.subscribe(DASHBOARD_CHANNEL);
        let _other = bus.subscribe("audit");

        bus.publish("audit", data_signal());
        assert!(dashboard.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_subscriber_counts() {
        let bus = NotificationBus::new();
        assert_eq!(bus.subscriber_count(DASHBOARD_CHANNEL), 0);

        let rx = bus.subscribe(DASHBOARD_CHANNEL);
        assert_eq!(bus.subscriber_count(DASHBOARD_CHANNEL), 1);

        drop(rx);
        assert_eq!(bus.subscriber_count(DASHBOARD_CHANNEL), 0);
    }
}
