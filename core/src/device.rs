//! Light controller client.
//!
//! The controller is a microcontroller on the LAN exposing two endpoints:
//! `GET /showlight` returns `{room: bool}` and `POST /led` accepts the same
//! shape with the rooms to switch.

use crate::room::{LightStates, Room};
use crate::{CasaError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Rooms to switch in a single `/led` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightCommand(BTreeMap<Room, bool>);

impl LightCommand {
    pub fn single(room: Room, state: bool) -> Self {
        Self(BTreeMap::from([(room, state)]))
    }

    pub fn all(state: bool) -> Self {
        Self(Room::ALL.iter().map(|room| (*room, state)).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Room, bool)> + '_ {
        self.0.iter().map(|(room, state)| (*room, *state))
    }

    /// The command as a state map, used when the controller cannot be re-read.
    pub fn to_states(&self) -> LightStates {
        self.iter()
            .map(|(room, state)| (room.to_string(), state))
            .collect()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LightDevice: Send + Sync {
    /// Current state of every light
    async fn status(&self) -> Result<LightStates>;

    /// Switch lights, returning the controller's reply
    async fn set(&self, command: &LightCommand) -> Result<serde_json::Value>;
}

/// Controller reached over plain HTTP
pub struct HttpLightDevice {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpLightDevice {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LightDevice for HttpLightDevice {
    async fn status(&self) -> Result<LightStates> {
        let url = format!("{}/showlight", self.base_url);
        debug!(target: "device", url = %url, "Reading light status");

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            warn!(target: "device", error = %e, "Light status request failed");
            CasaError::Device(format!("Status request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(target: "device", status = %status, "Controller returned error");
            return Err(CasaError::Device(format!(
                "Controller returned status: {}",
                status
            )));
        }

        response.json::<LightStates>().await.map_err(|e| {
            warn!(target: "device", error = %e, "Failed to parse light status");
            CasaError::Device(format!("Failed to parse light status: {}", e))
        })
    }

    async fn set(&self, command: &LightCommand) -> Result<serde_json::Value> {
        let url = format!("{}/led", self.base_url);
        debug!(target: "device", url = %url, command = ?command, "Sending light command");

        let response = self
            .http_client
            .post(&url)
            .json(command)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "device", error = %e, "Light command request failed");
                CasaError::Device(format!("Command request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(target: "device", status = %status, "Controller rejected command");
            return Err(CasaError::Device(format!(
                "Controller returned status: {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CasaError::Device(format!("Failed to read reply: {}", e)))?;

        Ok(reply_to_json(&body))
    }
}

// The controller firmware answers /led with either JSON or a bare text line.
fn reply_to_json(body: &str) -> serde_json::Value {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return serde_json::json!({});
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| serde_json::json!({ "response": trimmed }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_all_covers_every_room() {
        let command = LightCommand::all(true);
        let body = serde_json::to_value(&command).unwrap();
        assert_eq!(
            body,
            json!({"kitchen": true, "garage": true, "room": true, "bath": true})
        );
    }

    #[test]
    fn command_single_serializes_one_key() {
        let command = LightCommand::single(Room::Bath, false);
        assert_eq!(serde_json::to_value(&command).unwrap(), json!({"bath": false}));
        assert_eq!(command.to_states().get("bath"), Some(&false));
    }

    #[test]
    fn reply_falls_back_to_text() {
        assert_eq!(reply_to_json(""), json!({}));
        assert_eq!(reply_to_json("{\"ok\":true}"), json!({"ok": true}));
        assert_eq!(reply_to_json("OK\n"), json!({"response": "OK"}));
    }

    #[test]
    fn base_url_is_normalized() {
        let device = HttpLightDevice::new("http://10.0.0.5/", 1000);
        assert_eq!(device.base_url(), "http://10.0.0.5");
    }
}
