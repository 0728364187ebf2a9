//! Weather data from OpenWeatherMap with local temperature history.

mod history;
mod provider;

pub use history::TemperatureHistory;
pub use provider::{daily_forecast, WeatherConfig, WeatherProvider};

use serde::{Deserialize, Serialize};

/// One weather reading, in the shape the dashboard widgets consume
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// Degrees Celsius
    pub temperature: f64,
    /// Metres per second
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub description: String,
    /// OpenWeatherMap icon code, e.g. `04d`
    pub icon: String,
    pub city: String,
    /// Unix milliseconds
    pub timestamp: i64,
}
