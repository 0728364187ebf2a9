use std::collections::BTreeMap;

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use casa_core::{LightStates, Room};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{error::AppError, state::AppState};

const TOGGLE_USAGE: &str = "Invalid payload. Expected { room: string, state: boolean }";
const TOGGLE_ALL_USAGE: &str = "Invalid payload. Expected { state: boolean }";

#[derive(Deserialize)]
pub struct ToggleRequest {
    room: String,
    state: bool,
}

#[derive(Deserialize)]
pub struct ToggleAllRequest {
    state: bool,
}

pub async fn light_status(State(state): State<AppState>) -> Result<Json<LightStates>, AppError> {
    Ok(Json(state.relay.status().await?))
}

pub async fn toggle_light(
    State(state): State<AppState>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload.map_err(|e| {
        debug!(error = %e, "Rejected toggle payload");
        AppError::BadRequest(TOGGLE_USAGE.into())
    })?;
    let room: Room = request
        .room
        .parse()
        .map_err(|_| AppError::BadRequest(TOGGLE_USAGE.into()))?;

    Ok(Json(state.relay.toggle(room, request.state).await?))
}

pub async fn toggle_all_lights(
    State(state): State<AppState>,
    payload: Result<Json<ToggleAllRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload.map_err(|_| AppError::BadRequest(TOGGLE_ALL_USAGE.into()))?;

    Ok(Json(state.relay.toggle_all(request.state).await?))
}

/// Minutes of on-time per room
pub async fn light_usage(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, u64>>, AppError> {
    Ok(Json(state.usage.durations_minutes()?))
}

pub async fn reset_light_usage(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let removed = state.usage.reset()?;
    debug!(removed, "Light usage reset");
    Ok(StatusCode::NO_CONTENT)
}
