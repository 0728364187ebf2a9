use super::WeatherSnapshot;
use crate::storage::{Storage, CF_TEMPERATURE};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// Stored weather readings, grouped by city
pub struct TemperatureHistory {
    storage: Arc<Storage>,
}

impl TemperatureHistory {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    fn city_prefix(city: &str) -> String {
        format!("{}/", city.trim().to_lowercase())
    }

    // Zero-padded so that key order is chronological order.
    fn key(city: &str, snapshot: &WeatherSnapshot) -> String {
        format!(
            "{}{:020}",
            Self::city_prefix(city),
            snapshot.timestamp.max(0)
        )
    }

    /// Store a reading under the city name it was requested by, which may
    /// differ from the name upstream reports in `snapshot.city`.
    pub fn record(&self, city: &str, snapshot: &WeatherSnapshot) -> Result<()> {
        self.storage
            .put(CF_TEMPERATURE, &Self::key(city, snapshot), snapshot)?;
        debug!(target: "weather", city = %city, reported = %snapshot.city, timestamp = snapshot.timestamp, "Reading stored");
        Ok(())
    }

    /// Readings for `city`, newest first
    pub fn history(&self, city: &str) -> Result<Vec<WeatherSnapshot>> {
        let mut readings: Vec<WeatherSnapshot> = self
            .storage
            .scan_prefix(CF_TEMPERATURE, &Self::city_prefix(city))?
            .into_iter()
            .map(|(_, snapshot)| snapshot)
            .collect();
        readings.reverse();
        Ok(readings)
    }

    pub fn latest(&self, city: &str) -> Result<Option<WeatherSnapshot>> {
        Ok(self.history(city)?.into_iter().next())
    }
}
