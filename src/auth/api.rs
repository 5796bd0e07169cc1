//! Authentication API Endpoints
//! Mission: Exchange username/password for a bearer token

use crate::{
    api::routes::{ApiError, AppState},
    auth::models::{LoginRequest, LoginResponse},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{error, info, warn};

/// Login endpoint - POST /auth
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload?;

    info!("🔐 Login attempt: {}", payload.username);

    let identity = state
        .directory
        .authenticate(&payload.username, &payload.password)?;

    let Some(identity) = identity else {
        warn!("❌ Failed login attempt: {}", payload.username);
        return Err(ApiError::InvalidCredentials);
    };

    let token = state
        .tokens
        .issue(&identity.username, identity.role)
        .map_err(|e| {
            error!("Failed to issue token for {}: {}", identity.username, e);
            ApiError::Internal
        })?;

    info!("✅ Login successful: {} ({})", identity.username, identity.role);

    Ok(Json(LoginResponse {
        token,
        expires_in: state.tokens.validity_secs(),
    }))
}
