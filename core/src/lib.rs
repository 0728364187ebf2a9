// Casa Core Library
// Home automation runtime: light relay, usage tracking, weather, accounts

pub mod account;
pub mod broadcast;
pub mod config;
pub mod device;
pub mod relay;
pub mod room;
pub mod storage;
pub mod usage;
pub mod weather;

// Export core types
pub use account::{Accounts, NewUser, PasswordStore, Session, SessionStore, User, UserStore};
pub use broadcast::{LightBroadcaster, LightEvent};
pub use config::CasaConfig;
pub use device::{HttpLightDevice, LightCommand, LightDevice};
pub use relay::LightRelay;
pub use room::{LightStates, Room};
pub use storage::Storage;
pub use usage::{LightUsage, LightUsageTracker};
pub use weather::{TemperatureHistory, WeatherConfig, WeatherProvider, WeatherSnapshot};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CasaError {
    #[error("Invalid room: {0}")]
    InvalidRoom(String),

    #[error("Device error: {0}")]
    Device(String),

    #[error("Weather error: {0}")]
    Weather(String),

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
pub type Result<T> = std::result::Result<T, CasaError>;
