use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use casa_core::CasaError;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Bad request: {0}")]
    Registration(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Device error: {0}")]
    Device(String),

    #[error("Error fetching weather data")]
    Weather,

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CasaError> for AppError {
    fn from(err: CasaError) -> Self {
        match err {
            CasaError::Unauthorized => AppError::Unauthorized,
            CasaError::InvalidRoom(_) => AppError::BadRequest(err.to_string()),
            CasaError::Device(msg) => AppError::Device(msg),
            CasaError::CityNotFound(city) => AppError::CityNotFound(city),
            CasaError::Weather(_) => AppError::Weather,
            CasaError::Validation(_) | CasaError::Conflict(_) | CasaError::NotFound(_) => {
                AppError::Registration(err.to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Registration(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Bad request", "value": msg }),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
            AppError::Device(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("Light controller unavailable: {}", msg) }),
            ),
            AppError::Weather => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Error fetching weather data" }),
            ),
            AppError::CityNotFound(city) => (
                StatusCode::NOT_FOUND,
                json!({ "message": format!("City not found: {}", city) }),
            ),
            AppError::Internal(msg) => {
                warn!(target: "server", error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
