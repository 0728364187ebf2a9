//! Light command relay.
//!
//! Every switch goes through here so that the controller, the usage
//! accounting and the live clients stay in step.

use crate::broadcast::{LightBroadcaster, LightEvent};
use crate::device::{LightCommand, LightDevice};
use crate::room::{LightStates, Room};
use crate::usage::LightUsageTracker;
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};

pub struct LightRelay {
    device: Arc<dyn LightDevice>,
    usage: Arc<LightUsageTracker>,
    broadcaster: LightBroadcaster,
}

impl LightRelay {
    pub fn new(
        device: Arc<dyn LightDevice>,
        usage: Arc<LightUsageTracker>,
        broadcaster: LightBroadcaster,
    ) -> Self {
        Self {
            device,
            usage,
            broadcaster,
        }
    }

    pub fn broadcaster(&self) -> &LightBroadcaster {
        &self.broadcaster
    }

    pub async fn status(&self) -> Result<LightStates> {
        self.device.status().await
    }

    pub async fn toggle(&self, room: Room, state: bool) -> Result<serde_json::Value> {
        self.send(LightCommand::single(room, state)).await
    }

    pub async fn toggle_all(&self, state: bool) -> Result<serde_json::Value> {
        self.send(LightCommand::all(state)).await
    }

    async fn send(&self, command: LightCommand) -> Result<serde_json::Value> {
        let reply = self.device.set(&command).await?;
        info!(target: "relay", command = ?command, "Light command accepted");

        // Usage is bookkeeping; a storage hiccup must not undo a switch
        // that already happened.
        if let Err(e) = self.usage.record_command(&command) {
            warn!(target: "relay", error = %e, "Failed to record light usage");
        }

        let states = match self.device.status().await {
            Ok(states) => states,
            Err(e) => {
                warn!(target: "relay", error = %e, "Status refresh failed, broadcasting command");
                command.to_states()
            }
        };
        self.broadcaster.broadcast(LightEvent::StatusUpdate(states));

        Ok(reply)
    }
}
