use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::Area;

pub mod broadcast;

pub use broadcast::RealtimeBroadcaster;

/// Events emitted after committed state transitions. Consumed by the
/// realtime broadcaster so connected clients can invalidate their cached
/// views; delivery is best-effort and carries no ordering guarantee
/// relative to persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Order events
    OrderCreated(Uuid),
    OrderCompleted(Uuid),
    OrderDeleted {
        order_id: Uuid,
        folio: String,
    },

    // Order transfer events
    TransferRequested {
        order_id: Uuid,
        transfer_id: Uuid,
        from_area: Area,
        to_area: Area,
        pieces: i32,
    },
    TransferAccepted {
        order_id: Uuid,
        transfer_id: Uuid,
        to_area: Area,
        /// Set when the acceptance consolidated every piece into one area.
        consolidated_area: Option<Area>,
    },
    TransferRejected {
        order_id: Uuid,
        transfer_id: Uuid,
    },

    // Reposition events
    RepositionCreated(Uuid),
    RepositionApproved(Uuid),
    RepositionRejected(Uuid),
    RepositionTransferRequested {
        reposition_id: Uuid,
        transfer_id: Uuid,
        from_area: Area,
        to_area: Area,
    },
    RepositionTransferAccepted {
        reposition_id: Uuid,
        transfer_id: Uuid,
        to_area: Area,
    },
    RepositionTransferRejected {
        reposition_id: Uuid,
        transfer_id: Uuid,
    },
    RepositionCompletionRequested(Uuid),
    RepositionCompleted(Uuid),
    RepositionDeleted(Uuid),

    // Notification events
    NotificationCreated {
        user_id: i32,
        notification_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously. Callers treat failures as
    /// best-effort: a full or closed channel never aborts the state
    /// transition that produced the event.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel and republishes onto the realtime broadcast
/// registry. Runs until every `EventSender` has been dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, broadcaster: RealtimeBroadcaster) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        debug!(?event, "Processing event");
        broadcaster.publish(event);
    }

    info!("Event channel closed; stopping event processing loop");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_flow_through_to_broadcast_subscribers() {
        let broadcaster = RealtimeBroadcaster::new(16);
        let mut subscriber = broadcaster.subscribe();

        let (tx, rx) = mpsc::channel(16);
        let sender = EventSender::new(tx);
        let worker = tokio::spawn(process_events(rx, broadcaster));

        let order_id = Uuid::new_v4();
        sender.send(Event::OrderCreated(order_id)).await.unwrap();
        drop(sender);

        let received = subscriber.recv().await.expect("broadcast event");
        match received {
            Event::OrderCreated(id) => assert_eq!(id, order_id),
            other => panic!("unexpected event: {other:?}"),
        }

        worker.await.unwrap();
    }

    #[tokio::test]
    async fn send_after_processor_stops_reports_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::OrderCreated(Uuid::new_v4())).await.is_err());
    }
}
