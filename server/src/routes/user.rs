use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use casa_core::{NewUser, User};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::{auth::AuthUser, error::AppError, state::AppState};

#[derive(Deserialize)]
pub struct Credentials {
    login: String,
    password: String,
}

/// Register a user. A payload naming an existing id is an update and needs
/// that user's own bearer token.
pub async fn create_user(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let Json(new_user) = payload.map_err(|e| AppError::Registration(e.body_text()))?;

    if let Some(id) = new_user.id.as_deref().filter(|id| !id.is_empty()) {
        if auth.as_ref().map(|a| a.user_id.as_str()) != Some(id) {
            debug!(user_id = %id, "Update rejected, caller is not the account owner");
            return Err(AppError::Unauthorized);
        }
    }

    Ok(Json(state.accounts.register(new_user).await?))
}

pub async fn authenticate(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(credentials) = payload.map_err(|_| AppError::Unauthorized)?;

    let session = state
        .accounts
        .authenticate(&credentials.login, &credentials.password)
        .await
        .map_err(|e| {
            debug!(error = %e, "Login rejected");
            AppError::Unauthorized
        })?;

    Ok(Json(json!({
        "token": session.token,
        "userId": session.user_id,
        "expiresAt": session.expires_at,
    })))
}

/// Drop every session of `user_id`; callers may only log themselves out
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if auth.user_id != user_id {
        return Err(AppError::Unauthorized);
    }
    let revoked = state.accounts.logout(&user_id)?;
    info!(user_id = %user_id, revoked, "User logged out");
    Ok(Json(json!({ "revoked": revoked })))
}
