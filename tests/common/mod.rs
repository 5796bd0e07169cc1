//! Shared harness for router-level tests
//!
//! Builds the full application router over a throw-away SQLite file seeded
//! with the two standard fixture users:
//!   admin      / password1  (admin)
//!   username01 / password2  (viewer)

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use hospital_records::{
    api::{create_router, AppState},
    auth::{
        credentials::Credential,
        user_store::{SqliteUserStore, StoredUser, UserStore},
        TokenService, UserRole,
    },
    users::UserDirectory,
};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tempfile::NamedTempFile;
use tower::ServiceExt;

pub const SECRET: &[u8] = b"integration-test-secret-0123456789";
pub const TOKEN_TTL: Duration = Duration::from_secs(24 * 3600);

pub struct TestApp {
    pub router: Router,
    pub tokens: Arc<TokenService>,
    _db: NamedTempFile,
}

fn fixture_users() -> Vec<StoredUser> {
    vec![
        StoredUser {
            username: "admin".to_string(),
            name: "Administrator".to_string(),
            role: UserRole::Admin,
            credential: Credential {
                hash: "db026a1dc117b7beff39938bae6b486bb92228724ac496e355a3751f1710bf54a4fe0b15e668d3e0eb8458b5f68580cbae68eacd56e1903c06e32eae2ebbe545".to_string(),
                salt: "060d7f1a132b6086".to_string(),
            },
        },
        StoredUser {
            username: "username01".to_string(),
            name: "User 01".to_string(),
            role: UserRole::Viewer,
            credential: Credential {
                hash: "aad7fc92e974c4d60b49fcb6f773b68504f73a0094e89ed34b95f896ea8244c7899e3def85c0c79985c2d72a7a9536f3d1d2a92e5a7b15a7a3e3b972bfe6eabe".to_string(),
                salt: "65537ea6d692d7c3".to_string(),
            },
        },
    ]
}

impl TestApp {
    pub fn new() -> Self {
        let db = NamedTempFile::new().unwrap();
        let store = SqliteUserStore::new(db.path().to_str().unwrap()).unwrap();
        for user in fixture_users() {
            store.insert(&user).unwrap();
        }

        let tokens = Arc::new(TokenService::new(SECRET, TOKEN_TTL));
        let state = AppState {
            directory: Arc::new(UserDirectory::new(Arc::new(store))),
            tokens: tokens.clone(),
        };

        Self {
            router: create_router(state),
            tokens,
            _db: db,
        }
    }

    /// Send a request and return status plus JSON body (`Null` if empty)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    /// Log in and return the issued token, panicking on failure
    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth",
                None,
                Some(serde_json::json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed for {username}: {body}");

        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login("admin", "password1").await
    }

    pub async fn viewer_token(&self) -> String {
        self.login("username01", "password2").await
    }

    /// Create a user through the API as admin
    pub async fn create_user(&self, username: &str, password: &str, role: &str) {
        let admin = self.admin_token().await;
        let (status, body) = self
            .request(
                Method::POST,
                "/users/",
                Some(&admin),
                Some(serde_json::json!({
                    "name": format!("{} name", username),
                    "username": username,
                    "password": password,
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    }
}
