//! Push event broadcast hub.

use pictor_core::{PushError, PushEvent, PushNotifier};
use tokio::sync::broadcast;

/// Tracing target for event hub operations.
const TRACING_TARGET: &str = "pictor_server::service::events";

/// Fan-out channel between the coordinator and websocket subscribers.
///
/// Every push notification is broadcast to all connected browser
/// sessions; a hub with no subscribers drops events, which the
/// coordinator treats as an unanswered rendezvous (it times out and
/// the node falls back).
#[derive(Debug, Clone)]
pub struct EventHub {
    sender: broadcast::Sender<PushEvent>,
}

impl EventHub {
    /// Creates a hub buffering up to `capacity` undelivered events per
    /// subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to the event feed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.sender.subscribe()
    }

    /// Number of currently attached subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl PushNotifier for EventHub {
    fn push(&self, event: PushEvent) -> Result<(), PushError> {
        match self.sender.send(event) {
            Ok(delivered_to) => {
                tracing::trace!(
                    target: TRACING_TARGET,
                    subscribers = delivered_to,
                    "push event broadcast"
                );
                Ok(())
            }
            Err(_) => Err(PushError::NoSubscribers),
        }
    }
}
