//! `mercado-feed` — live-update notification channel.
//!
//! Fire-and-forget pub/sub used to push refreshed catalog listings to
//! connected view clients:
//!
//! - At-most-once per connected subscriber (lagging receivers lose messages)
//! - No durability, no retry, no acknowledgment
//! - Publishing never blocks and never fails the caller

use serde::Serialize;
use tokio::sync::broadcast;

/// Topic published after any product create/delete.
pub const PRODUCTS_TOPIC: &str = "products.updated";

/// A message broadcast to connected subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Broadcast fan-out for live view updates.
#[derive(Debug)]
pub struct Feed {
    tx: broadcast::Sender<Notification>,
}

impl Feed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish to all currently-connected subscribers.
    ///
    /// A send with no subscribers is not an error; the notification is
    /// simply dropped.
    pub fn publish(&self, topic: &str, payload: serde_json::Value) {
        let delivered = self
            .tx
            .send(Notification {
                topic: topic.to_string(),
                payload,
            })
            .unwrap_or(0);
        tracing::debug!(topic, delivered, "published notification");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Number of currently-connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Feed {
    fn default() -> Self {
        // Enough buffering for bursty catalog edits; slow consumers lag.
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let feed = Feed::default();
        feed.publish(PRODUCTS_TOPIC, serde_json::json!([]));
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn each_subscriber_receives_every_notification() {
        let feed = Feed::default();
        let mut a = feed.subscribe();
        let mut b = feed.subscribe();

        feed.publish(PRODUCTS_TOPIC, serde_json::json!({"n": 1}));

        let got_a = a.try_recv().unwrap();
        let got_b = b.try_recv().unwrap();
        assert_eq!(got_a.topic, PRODUCTS_TOPIC);
        assert_eq!(got_a.payload, got_b.payload);
    }

    #[test]
    fn subscriber_joining_after_publish_misses_the_message() {
        let feed = Feed::default();
        feed.publish(PRODUCTS_TOPIC, serde_json::json!({"n": 1}));

        let mut late = feed.subscribe();
        assert!(late.try_recv().is_err());
    }
}
