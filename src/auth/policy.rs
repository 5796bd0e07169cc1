//! Access Policies
//! Mission: Decide per route whether a caller may proceed
//!
//! Policies are declared next to the routes as constants, so the role set and
//! policy kinds are closed at compile time.

use crate::auth::models::{Identity, UserRole};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Policy attached to a single route/method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// No identity required
    Open,
    /// Caller role must be one of the listed roles
    Roles(&'static [UserRole]),
    /// Caller must be the subject named by path parameter `param`, or hold
    /// an override role
    Owner {
        param: &'static str,
        overrides: &'static [UserRole],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Insufficient permissions")]
    Forbidden,
}

impl AccessPolicy {
    /// Name of the path parameter identifying the subject, for owner policies
    pub fn subject_param(&self) -> Option<&'static str> {
        match self {
            AccessPolicy::Owner { param, .. } => Some(*param),
            _ => None,
        }
    }

    /// Check `caller` against this policy.
    ///
    /// `subject` is the identifying path parameter of the targeted resource,
    /// if the route has one. Ownership always admits the caller; override
    /// roles only add to it.
    pub fn authorize(&self, caller: Option<&Identity>, subject: Option<&str>) -> Result<(), AccessError> {
        let caller = match (self, caller) {
            (AccessPolicy::Open, _) => return Ok(()),
            (_, None) => return Err(AccessError::Unauthorized),
            (_, Some(caller)) => caller,
        };

        let permitted = match self {
            AccessPolicy::Open => true,
            AccessPolicy::Roles(allowed) => allowed.contains(&caller.role),
            AccessPolicy::Owner { overrides, .. } => {
                subject == Some(caller.username.as_str()) || overrides.contains(&caller.role)
            }
        };

        if permitted {
            Ok(())
        } else {
            Err(AccessError::Forbidden)
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let status = match self {
            AccessError::Unauthorized => StatusCode::UNAUTHORIZED,
            AccessError::Forbidden => StatusCode::FORBIDDEN,
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
