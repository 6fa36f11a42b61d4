use crate::application::ports::event_publisher::{InteractionEvent, InteractionEvents};
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out of interaction events over a tokio broadcast channel. Replaces
/// the ambient client-wide event bus with an injected, typed publisher;
/// consumers call `subscribe()` and drop the receiver when done.
pub struct BroadcastEvents {
    sender: broadcast::Sender<InteractionEvent>,
}

impl BroadcastEvents {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InteractionEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionEvents for BroadcastEvents {
    fn publish(&self, event: InteractionEvent) {
        // A send error only means nobody is subscribed right now.
        if self.sender.send(event).is_err() {
            debug!("Interaction event published with no subscribers");
        }
    }
}
