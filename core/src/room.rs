//! Rooms wired to the light controller.

use crate::{CasaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Light state per room name, as reported by the controller.
///
/// Keys are plain strings so that channels the controller reports beyond
/// the known rooms pass through untouched.
pub type LightStates = BTreeMap<String, bool>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Room {
    Kitchen,
    Garage,
    Room,
    Bath,
}

impl Room {
    pub const ALL: [Room; 4] = [Room::Kitchen, Room::Garage, Room::Room, Room::Bath];

    pub fn as_str(&self) -> &'static str {
        match self {
            Room::Kitchen => "kitchen",
            Room::Garage => "garage",
            Room::Room => "room",
            Room::Bath => "bath",
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Room {
    type Err = CasaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kitchen" => Ok(Room::Kitchen),
            "garage" => Ok(Room::Garage),
            "room" => Ok(Room::Room),
            "bath" => Ok(Room::Bath),
            _ => Err(CasaError::InvalidRoom(s.to_string())),
        }
    }
}
