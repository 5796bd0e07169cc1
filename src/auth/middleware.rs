//! Authentication Middleware
//! Mission: Attach caller identity, then gate each route on its policy
//!
//! Two stages. `decode_token` runs on every request of a router and only
//! ever adds an `Identity`; a missing or unusable token is not an error
//! there. `enforce` is layered per route with that route's `AccessPolicy`
//! and produces the single 401/403 outcome.

use crate::auth::{
    jwt::TokenService,
    models::Identity,
    policy::{AccessError, AccessPolicy},
};
use axum::{
    extract::{Path, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller identity from request headers, if a valid token is present
pub fn decode_identity(tokens: &TokenService, headers: &HeaderMap) -> Option<Identity> {
    let token = bearer_token(headers)?;

    match tokens.verify(token) {
        Ok(identity) => Some(identity),
        Err(reason) => {
            debug!(%reason, "Bearer token rejected, continuing unauthenticated");
            None
        }
    }
}

/// Decode stage - never rejects
pub async fn decode_token(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(identity) = decode_identity(&tokens, req.headers()) {
        req.extensions_mut().insert(identity);
    }

    next.run(req).await
}

/// Enforce stage - rejects with 401/403 before the handler runs
pub async fn enforce(
    State(policy): State<AccessPolicy>,
    params: Option<Path<HashMap<String, String>>>,
    req: Request,
    next: Next,
) -> Result<Response, AccessError> {
    let subject = policy
        .subject_param()
        .and_then(|name| params.as_ref().and_then(|Path(p)| p.get(name)))
        .map(String::as_str);

    let caller = req.extensions().get::<Identity>();
    if let Err(denied) = policy.authorize(caller, subject) {
        debug!(
            method = %req.method(),
            path = %req.uri().path(),
            caller = caller.map(|c| c.username.as_str()).unwrap_or("-"),
            %denied,
            "Access denied"
        );
        return Err(denied);
    }

    Ok(next.run(req).await)
}
