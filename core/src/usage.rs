//! Per-room light usage accounting.
//!
//! Each room has one document holding the accumulated on-time and, while
//! the light is on, the instant it was switched on. Closing an interval
//! folds it into the total.

use crate::device::LightCommand;
use crate::room::Room;
use crate::storage::{Storage, CF_LIGHT_USAGE};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

const MS_PER_MINUTE: u64 = 60_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightUsage {
    pub room: String,
    pub total_usage_ms: u64,
    pub turned_on_at: Option<DateTime<Utc>>,
}

impl LightUsage {
    /// Accumulated time plus the running interval, if any
    pub fn duration_ms_at(&self, now: DateTime<Utc>) -> u64 {
        self.total_usage_ms + self.turned_on_at.map_or(0, |since| elapsed_ms(since, now))
    }
}

fn elapsed_ms(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - since).num_milliseconds()).unwrap_or(0)
}

/// Round half up to whole minutes
pub fn ms_to_minutes(ms: u64) -> u64 {
    (ms + MS_PER_MINUTE / 2) / MS_PER_MINUTE
}

pub struct LightUsageTracker {
    storage: Arc<Storage>,
    // serializes read-modify-write of usage documents
    write_lock: Mutex<()>,
}

impl LightUsageTracker {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub fn record_state(&self, room: Room, state: bool) -> Result<()> {
        self.record_state_at(room, state, Utc::now())
    }

    pub fn record_state_at(&self, room: Room, state: bool, now: DateTime<Utc>) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let key = room.as_str();
        let record: Option<LightUsage> = self.storage.get(CF_LIGHT_USAGE, key)?;

        match (state, record) {
            (true, None) => {
                self.storage.put(
                    CF_LIGHT_USAGE,
                    key,
                    &LightUsage {
                        room: key.to_string(),
                        total_usage_ms: 0,
                        turned_on_at: Some(now),
                    },
                )?;
                debug!(target: "usage", room = %room, "First switch-on recorded");
            }
            (true, Some(mut usage)) if usage.turned_on_at.is_none() => {
                usage.turned_on_at = Some(now);
                self.storage.put(CF_LIGHT_USAGE, key, &usage)?;
                debug!(target: "usage", room = %room, "Interval opened");
            }
            (false, Some(mut usage)) => {
                if let Some(since) = usage.turned_on_at.take() {
                    let interval = elapsed_ms(since, now);
                    usage.total_usage_ms += interval;
                    self.storage.put(CF_LIGHT_USAGE, key, &usage)?;
                    debug!(target: "usage", room = %room, interval_ms = interval, total_ms = usage.total_usage_ms, "Interval closed");
                }
            }
            // already on, or off without a record
            _ => {}
        }

        Ok(())
    }

    pub fn record_command(&self, command: &LightCommand) -> Result<()> {
        let now = Utc::now();
        for (room, state) in command.iter() {
            self.record_state_at(room, state, now)?;
        }
        Ok(())
    }

    pub fn usage(&self, room: Room) -> Result<Option<LightUsage>> {
        self.storage.get(CF_LIGHT_USAGE, room.as_str())
    }

    pub fn durations_ms_at(&self, now: DateTime<Utc>) -> Result<BTreeMap<String, u64>> {
        Ok(self
            .storage
            .scan::<LightUsage>(CF_LIGHT_USAGE)?
            .into_iter()
            .map(|(_, usage)| {
                let duration = usage.duration_ms_at(now);
                (usage.room, duration)
            })
            .collect())
    }

    pub fn durations_minutes(&self) -> Result<BTreeMap<String, u64>> {
        self.durations_minutes_at(Utc::now())
    }

    pub fn durations_minutes_at(&self, now: DateTime<Utc>) -> Result<BTreeMap<String, u64>> {
        Ok(self
            .durations_ms_at(now)?
            .into_iter()
            .map(|(room, ms)| (room, ms_to_minutes(ms)))
            .collect())
    }

    pub fn reset(&self) -> Result<usize> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.storage.clear(CF_LIGHT_USAGE)
    }
}
