// Live light-state push
//
// Uses tokio broadcast channel to fan light events out to every connected
// WebSocket client

use crate::room::LightStates;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event sent to dashboard clients, framed as `{"event": ..., "data": ...}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum LightEvent {
    /// Reply to a single client's status request
    #[serde(rename = "light:getStatus")]
    Status(LightStates),
    /// Lights changed, sent to every client
    #[serde(rename = "light:statusUpdate")]
    StatusUpdate(LightStates),
    #[serde(rename = "light:error")]
    Error { message: String },
}

impl LightEvent {
    pub fn error(message: impl Into<String>) -> Self {
        LightEvent::Error {
            message: message.into(),
        }
    }
}

/// Event broadcaster for light updates
#[derive(Clone)]
pub struct LightBroadcaster {
    sender: broadcast::Sender<LightEvent>,
}

impl LightBroadcaster {
    /// Create a new broadcaster with buffer size
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast an event to all subscribers
    pub fn broadcast(&self, event: LightEvent) {
        // Ignore error if no subscribers
        let _ = self.sender.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<LightEvent> {
        self.sender.subscribe()
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LightBroadcaster {
    fn default() -> Self {
        Self::new(1000) // Buffer last 1000 events
    }
}
