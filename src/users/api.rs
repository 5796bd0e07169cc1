//! User API Endpoints
//! Mission: Expose the user directory over `/users` behind access policies

use crate::{
    api::routes::{invalid_request, ApiError, AppState},
    auth::{
        middleware::{decode_token, enforce},
        models::{Identity, UserRole},
        policy::{AccessError, AccessPolicy},
        TokenService,
    },
    users::directory::{NewUser, UserPatch, UserProfile, UserSummary},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    handler::Handler,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::get,
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

// ===== Route Policies =====

pub const LIST_USERS: AccessPolicy = AccessPolicy::Roles(&[UserRole::Admin, UserRole::Doctor]);
pub const CREATE_USER: AccessPolicy = AccessPolicy::Roles(&[UserRole::Admin]);
pub const OWN_RECORD: AccessPolicy = AccessPolicy::Owner {
    param: "username",
    overrides: &[UserRole::Admin],
};
pub const DELETE_USER: AccessPolicy = AccessPolicy::Roles(&[UserRole::Admin]);

/// `/users` routes. Every request passes the token decode stage; each
/// supported method is then gated by its own policy.
pub fn router(tokens: Arc<TokenService>) -> Router<AppState> {
    let collection = get(list_users.layer(from_fn_with_state(LIST_USERS, enforce)))
        .post(create_user.layer(from_fn_with_state(CREATE_USER, enforce)))
        .put(invalid_request)
        .delete(invalid_request);

    let member = get(get_user.layer(from_fn_with_state(OWN_RECORD, enforce)))
        .post(invalid_request)
        .put(update_user.layer(from_fn_with_state(OWN_RECORD, enforce)))
        .delete(delete_user.layer(from_fn_with_state(DELETE_USER, enforce)));

    Router::new()
        .route("/users", collection.clone())
        .route("/users/", collection)
        .route("/users/:username", member)
        .layer(from_fn_with_state(tokens, decode_token))
}

/// List all users - GET /users/
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.directory.list()?))
}

/// Create user - POST /users/
async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(data) = payload?;

    state.directory.create(data)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": 201, "message": "User created" })),
    ))
}

/// Get one user - GET /users/:username
async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.directory.get(&username)?))
}

/// Update user - PUT /users/:username
///
/// Owners may rename themselves; only admins may change a role.
async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(caller): Extension<Identity>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<UserProfile>, ApiError> {
    let Json(patch) = payload?;

    if patch.role.is_some() && caller.role != UserRole::Admin {
        debug!("{} attempted a role change on {}", caller.username, username);
        return Err(AccessError::Forbidden.into());
    }

    Ok(Json(state.directory.update(&username, patch)?))
}

/// Delete user - DELETE /users/:username
async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.directory.delete(&username)?;

    Ok(Json(json!({ "status": 200, "message": "User deleted" })))
}
