use tokio::sync::broadcast;
use tracing::trace;

use super::Event;

/// Explicitly-owned registry of realtime subscribers.
///
/// Constructed once at startup, cloned into whatever needs to publish,
/// and handed to `process_events`. Clients subscribe to receive
/// cache-invalidation events; a lagging subscriber loses old events
/// rather than blocking publishers. Shutdown is dropping the last clone:
/// subscribers then observe `RecvError::Closed` and disconnect.
#[derive(Debug, Clone)]
pub struct RealtimeBroadcaster {
    tx: broadcast::Sender<Event>,
}

impl RealtimeBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Publish an event to every current subscriber. Having no
    /// subscribers is normal and not an error.
    pub fn publish(&self, event: Event) {
        match self.tx.send(event) {
            Ok(receivers) => trace!(receivers, "Broadcast event delivered"),
            Err(_) => trace!("Broadcast event dropped (no subscribers)"),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn publish_reaches_all_subscribers() {
        let broadcaster = RealtimeBroadcaster::new(8);
        let mut a = broadcaster.subscribe();
        let mut b = broadcaster.subscribe();

        let id = Uuid::new_v4();
        broadcaster.publish(Event::RepositionCreated(id));

        assert!(matches!(a.recv().await, Ok(Event::RepositionCreated(got)) if got == id));
        assert!(matches!(b.recv().await, Ok(Event::RepositionCreated(got)) if got == id));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let broadcaster = RealtimeBroadcaster::new(8);
        assert_eq!(broadcaster.subscriber_count(), 0);
        // must not panic or error out
        broadcaster.publish(Event::RepositionCreated(Uuid::new_v4()));
    }
}
