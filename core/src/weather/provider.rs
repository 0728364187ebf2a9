//! Weather Provider
//!
//! Current conditions and a 5-day forecast from the OpenWeatherMap REST API
//! (metric units). The raw current-weather document is also exposed for
//! clients that want every field.
use super::WeatherSnapshot;
use crate::{CasaError, Result};
use chrono::{DateTime, Timelike, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for weather provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Current weather endpoint
    pub current_endpoint: String,
    /// 5 day / 3 hour forecast endpoint
    pub forecast_endpoint: String,
    pub api_key: String,
    /// City used when a request names none
    pub default_city: String,
    /// Timeout for API requests in milliseconds
    pub timeout_ms: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            current_endpoint: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            forecast_endpoint: "https://api.openweathermap.org/data/2.5/forecast".to_string(),
            api_key: String::new(),
            default_city: "Warsaw".to_string(),
            timeout_ms: 10_000,
            user_agent: "casa/0.1".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

#[derive(Debug, Default, Deserialize)]
struct Wind {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: f64,
}

/// Current weather response
#[derive(Debug, Deserialize)]
struct CurrentResponse {
    name: String,
    dt: i64,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
    #[serde(default)]
    wind: Wind,
}

/// Forecast response
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
    city: ForecastCity,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
    #[serde(default)]
    wind: Wind,
}

#[derive(Debug, Deserialize)]
struct ForecastCity {
    name: String,
}

fn snapshot(
    city: &str,
    dt_secs: i64,
    main: &MainReadings,
    weather: &[Condition],
    wind: &Wind,
) -> WeatherSnapshot {
    let (description, icon) = weather
        .first()
        .map(|c| (c.description.clone(), c.icon.clone()))
        .unwrap_or_default();

    WeatherSnapshot {
        temperature: main.temp,
        wind_speed: wind.speed,
        wind_deg: wind.deg,
        description,
        icon,
        city: city.to_string(),
        timestamp: dt_secs * 1000,
    }
}

/// Reduce the 3-hourly forecast to one reading per UTC day, the one closest
/// to midday.
pub fn daily_forecast(response: &serde_json::Value) -> Result<Vec<WeatherSnapshot>> {
    let forecast: ForecastResponse = serde_json::from_value(response.clone())
        .map_err(|e| CasaError::Weather(format!("Failed to parse forecast: {}", e)))?;
    Ok(reduce_daily(&forecast))
}

fn reduce_daily(forecast: &ForecastResponse) -> Vec<WeatherSnapshot> {
    let mut days: BTreeMap<chrono::NaiveDate, (u32, &ForecastEntry)> = BTreeMap::new();

    for entry in &forecast.list {
        let Some(at) = DateTime::<Utc>::from_timestamp(entry.dt, 0) else {
            continue;
        };
        let distance = at.hour().abs_diff(12);
        days.entry(at.date_naive())
            .and_modify(|best| {
                if distance < best.0 {
                    *best = (distance, entry);
                }
            })
            .or_insert((distance, entry));
    }

    days.values()
        .map(|(_, e)| snapshot(&forecast.city.name, e.dt, &e.main, &e.weather, &e.wind))
        .collect()
}

/// Weather provider
pub struct WeatherProvider {
    config: WeatherConfig,
    http_client: reqwest::Client,
}

impl WeatherProvider {
    pub fn new(config: WeatherConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(&config.user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        if config.api_key.is_empty() {
            warn!(target: "weather", "No weather API key configured, requests will be rejected upstream");
        }

        Self {
            config,
            http_client,
        }
    }

    pub fn default_city(&self) -> &str {
        &self.config.default_city
    }

    async fn fetch(&self, endpoint: &str, city: &str) -> Result<serde_json::Value> {
        debug!(target: "weather", endpoint = %endpoint, city = %city, "Fetching weather data");

        let response = self
            .http_client
            .get(endpoint)
            .query(&[
                ("q", city),
                ("appid", self.config.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(target: "weather", error = %e, "Weather API request failed");
                CasaError::Weather(format!("Weather API request failed: {}", e))
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(target: "weather", city = %city, "City not known upstream");
                return Err(CasaError::CityNotFound(city.to_string()));
            }
            status if !status.is_success() => {
                warn!(target: "weather", status = %status, "Weather API returned error");
                return Err(CasaError::Weather(format!(
                    "Weather API returned status: {}",
                    status
                )));
            }
            _ => {}
        }

        response.json().await.map_err(|e| {
            warn!(target: "weather", error = %e, "Failed to parse weather response");
            CasaError::Weather(format!("Failed to parse weather response: {}", e))
        })
    }

    /// Current weather document as returned upstream
    pub async fn current_raw(&self, city: &str) -> Result<serde_json::Value> {
        self.fetch(&self.config.current_endpoint, city).await
    }

    pub async fn current(&self, city: &str) -> Result<WeatherSnapshot> {
        let raw = self.current_raw(city).await?;
        parse_current(raw)
    }

    pub async fn forecast(&self, city: &str) -> Result<Vec<WeatherSnapshot>> {
        let raw = self.fetch(&self.config.forecast_endpoint, city).await?;
        daily_forecast(&raw)
    }
}

fn parse_current(raw: serde_json::Value) -> Result<WeatherSnapshot> {
    let current: CurrentResponse = serde_json::from_value(raw)
        .map_err(|e| CasaError::Weather(format!("Failed to parse current weather: {}", e)))?;
    Ok(snapshot(
        &current.name,
        current.dt,
        &current.main,
        &current.weather,
        &current.wind,
    ))
}
