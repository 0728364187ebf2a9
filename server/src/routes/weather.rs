use axum::{
    extract::{Path, Query, State},
    Json,
};
use casa_core::WeatherSnapshot;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{error::AppError, state::AppState};

#[derive(Deserialize)]
pub struct CityQuery {
    city: Option<String>,
}

/// Upstream current-weather document, untouched. Any failure, an unknown
/// city included, is reported as a generic 500.
pub async fn raw_weather(
    State(state): State<AppState>,
    Query(query): Query<CityQuery>,
) -> Result<Json<Value>, AppError> {
    let city = query
        .city
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| state.weather.default_city().to_string());

    state.weather.current_raw(&city).await.map(Json).map_err(|e| {
        warn!(error = %e, city = %city, "Error fetching weather data");
        AppError::Weather
    })
}

/// Current reading; also appended to the city's history
pub async fn temperature(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<WeatherSnapshot>, AppError> {
    let snapshot = state.weather.current(&city).await?;
    if let Err(e) = state.history.record(&city, &snapshot) {
        warn!(error = %e, city = %city, "Failed to store weather reading");
    }
    Ok(Json(snapshot))
}

pub async fn forecast(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<Vec<WeatherSnapshot>>, AppError> {
    Ok(Json(state.weather.forecast(&city).await?))
}

pub async fn temperature_history(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<Vec<WeatherSnapshot>>, AppError> {
    Ok(Json(state.history.history(&city)?))
}
