use std::sync::Arc;

use casa_core::{
    Accounts, CasaConfig, HttpLightDevice, LightBroadcaster, LightDevice, LightRelay,
    LightUsageTracker, Storage, TemperatureHistory, WeatherProvider,
};
use tracing::info;

/// Shared by every handler and socket task
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<CasaConfig>,
    pub relay: Arc<LightRelay>,
    pub usage: Arc<LightUsageTracker>,
    pub weather: Arc<WeatherProvider>,
    pub history: Arc<TemperatureHistory>,
    pub accounts: Arc<Accounts>,
}

impl AppState {
    /// Wire the services on an already opened store and a chosen controller
    pub fn new(config: CasaConfig, storage: Arc<Storage>, device: Arc<dyn LightDevice>) -> Self {
        let usage = Arc::new(LightUsageTracker::new(storage.clone()));
        let relay = Arc::new(LightRelay::new(
            device,
            usage.clone(),
            LightBroadcaster::new(config.server.broadcast_capacity.max(1)),
        ));
        let weather = Arc::new(WeatherProvider::new(config.weather.clone()));
        let history = Arc::new(TemperatureHistory::new(storage.clone()));
        let accounts = Arc::new(Accounts::new(storage, config.auth.session_ttl()));

        Self {
            config: Arc::new(config),
            relay,
            usage,
            weather,
            history,
            accounts,
        }
    }

    pub fn from_config(config: CasaConfig) -> casa_core::Result<Self> {
        if let Some(parent) = config.storage.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let storage = Storage::open(&config.storage.path)?;
        info!(path = %config.storage.path.display(), "Storage opened");

        let device = Arc::new(HttpLightDevice::new(
            config.device.base_url.clone(),
            config.device.timeout_ms,
        ));
        info!(url = %config.device.base_url, "Light controller configured");

        Ok(Self::new(config, storage, device))
    }
}
