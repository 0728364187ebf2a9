mod light;
mod user;
mod weather;

pub use light::{light_status, light_usage, reset_light_usage, toggle_all_lights, toggle_light};
pub use user::{authenticate, create_user, logout};
pub use weather::{forecast, raw_weather, temperature, temperature_history};

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
