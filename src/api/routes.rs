use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::{
    auth::{api as auth_api, policy::AccessError, TokenService},
    middleware::request_logging_simple,
    users::{self, DirectoryError, UserDirectory},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<UserDirectory>,
    pub tokens: Arc<TokenService>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth", post(auth_api::login))
        .merge(users::api::router(state.tokens.clone()))
        .layer(middleware::from_fn(request_logging_simple))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Method/path combinations that exist but are not supported
pub async fn invalid_request() -> ApiError {
    ApiError::InvalidRequest
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

// ===== Error Handling =====

#[derive(Debug)]
pub enum ApiError {
    /// Unsupported route or unparseable body
    InvalidRequest,
    /// Missing or malformed required fields
    InvalidInput(&'static str),
    InvalidCredentials,
    Access(AccessError),
    NotFound(String),
    Conflict(String),
    Internal,
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        ApiError::Access(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        ApiError::InvalidRequest
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Conflict(_) => ApiError::Conflict(err.to_string()),
            DirectoryError::InvalidInput(message) => ApiError::InvalidInput(message),
            DirectoryError::NotFound(_) => ApiError::NotFound(err.to_string()),
            DirectoryError::Credential(_) | DirectoryError::Storage(_) => {
                tracing::error!("User directory error: {}", err);
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidRequest => return bad_request("Invalid request"),
            ApiError::InvalidInput(message) => return bad_request(message),
            ApiError::Access(err) => return err.into_response(),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": message,
        }));

        (status, body).into_response()
    }
}

fn bad_request(message: &str) -> Response {
    let body = Json(json!({
        "error": 400,
        "message": message,
    }));

    (StatusCode::BAD_REQUEST, body).into_response()
}
