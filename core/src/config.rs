// Runtime configuration
//
// Optional TOML file (path in CASA_CONFIG) first, then environment variables
// on top. Every field has a default so an empty environment still boots.

use crate::weather::WeatherConfig;
use crate::{CasaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CasaConfig {
    pub server: ServerConfig,
    pub device: DeviceConfig,
    pub storage: StorageConfig,
    pub weather: WeatherConfig,
    pub auth: AuthConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Light events buffered per WebSocket client before it starts lagging
    pub broadcast_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3100,
            broadcast_capacity: 1000,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Light controller
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.2.191".to_string(),
            timeout_ms: 5_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/casa-db"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub session_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs.max(1))
    }
}

impl CasaConfig {
    /// File named by `CASA_CONFIG` (if any), then environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("CASA_CONFIG").ok().filter(|p| !p.is_empty()) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)
            .map_err(|e| CasaError::Config(format!("{}: {}", path.display(), e)))?;
        info!(target: "config", path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CasaError::Config(e.to_string()))
    }

    /// Override fields from `lookup` (the process environment in production)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(host) = var("CASA_HOST") {
            self.server.host = host;
        }
        parse_into(&var, "CASA_PORT", &mut self.server.port);
        parse_into(&var, "CASA_BROADCAST_CAPACITY", &mut self.server.broadcast_capacity);
        if let Some(url) = var("CASA_DEVICE_URL") {
            self.device.base_url = url;
        }
        parse_into(&var, "CASA_DEVICE_TIMEOUT_MS", &mut self.device.timeout_ms);
        if let Some(path) = var("CASA_DB_PATH") {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(key) = var("WEATHER_API_KEY") {
            self.weather.api_key = key;
        }
        if let Some(city) = var("CASA_DEFAULT_CITY") {
            self.weather.default_city = city;
        }
        parse_into(&var, "CASA_SESSION_TTL_SECS", &mut self.auth.session_ttl_secs);
    }
}

fn parse_into<T>(var: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T)
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = var(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(e) => warn!(target: "config", key = %key, value = %raw, error = %e, "Invalid value, keeping default"),
    }
}
