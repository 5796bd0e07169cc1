//! `/users` endpoints: policies, directory rules and wire shapes

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_admin_lists_all_users() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app.get("/users/", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "name": "Administrator", "role": "admin" },
            { "name": "User 01", "role": "viewer" },
        ])
    );

    // Same listing without the trailing slash
    let (status, _) = app.get("/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_viewer_cannot_list_users() {
    let app = TestApp::new();
    let viewer = app.viewer_token().await;

    let (status, body) = app.get("/users/", Some(&viewer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_doctor_can_list_users() {
    let app = TestApp::new();
    app.create_user("drhouse", "vicodin", "doctor").await;
    let doctor = app.login("drhouse", "vicodin").await;

    let (status, body) = app.get("/users/", Some(&doctor)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_requires_token() {
    let app = TestApp::new();

    let (status, body) = app.get("/users/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn test_self_access_to_user_record() {
    let app = TestApp::new();
    app.create_user("alice", "alice-pw", "viewer").await;

    // No token
    let (status, _) = app.get("/users/alice", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Alice herself
    let alice = app.login("alice", "alice-pw").await;
    let (status, body) = app.get("/users/alice", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "name": "alice name", "username": "alice", "role": "viewer" })
    );

    // Another non-privileged user
    let viewer = app.viewer_token().await;
    let (status, body) = app.get("/users/alice", Some(&viewer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);

    // Doctors are not in the override set
    app.create_user("drhouse", "vicodin", "doctor").await;
    let doctor = app.login("drhouse", "vicodin").await;
    let (status, _) = app.get("/users/alice", Some(&doctor)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin override
    let admin = app.admin_token().await;
    let (status, _) = app.get("/users/alice", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_get_missing_user_is_404() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app.get("/users/ghost", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_create_user_flow() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let new_user = json!({
        "name": "Nurse Joy",
        "username": "joy",
        "password": "pokemon",
        "role": "viewer",
    });

    let (status, body) = app
        .request(Method::POST, "/users/", Some(&admin), Some(new_user.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], 201);

    // New user can log in with the password given at creation
    let joy = app.login("joy", "pokemon").await;
    let (status, _) = app.get("/users/joy", Some(&joy)).await;
    assert_eq!(status, StatusCode::OK);

    // Duplicate username
    let (status, body) = app
        .request(Method::POST, "/users/", Some(&admin), Some(new_user))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);
}

#[tokio::test]
async fn test_create_user_validation() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let invalid = [
        json!({ "username": "joy", "password": "pw", "role": "viewer" }),
        json!({ "name": "Joy", "username": "nurse joy", "password": "pw", "role": "viewer" }),
        json!({ "name": "Joy", "username": "joy", "password": "", "role": "viewer" }),
        json!({ "name": "Joy", "username": " joy", "password": "pw", "role": "viewer" }),
        json!({ "name": "Joy", "username": "joy ", "password": "pw", "role": "viewer" }),
        json!({ "name": "Joy", "username": "joy", "password": "pw", "role": "janitor" }),
        json!({ "name": "Joy", "username": "joy", "password": "pw", "role": " ADMIN " }),
        json!({}),
    ];

    for body in invalid {
        let (status, resp) = app
            .request(Method::POST, "/users/", Some(&admin), Some(body.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
        assert_eq!(resp, json!({ "error": 400, "message": "Incomplete parameters" }));
    }

    let (_, listing) = app.get("/users/", Some(&admin)).await;
    assert_eq!(listing.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_user_requires_admin() {
    let app = TestApp::new();
    let viewer = app.viewer_token().await;
    let body = json!({ "name": "X", "username": "x", "password": "pw", "role": "admin" });

    let (status, _) = app
        .request(Method::POST, "/users/", Some(&viewer), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request(Method::POST, "/users/", None, Some(body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unsupported_methods_are_invalid_requests() {
    let app = TestApp::new();

    for (method, uri) in [
        (Method::PUT, "/users/"),
        (Method::DELETE, "/users/"),
        (Method::POST, "/users/username01"),
    ] {
        let (status, body) = app.request(method, uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": 400, "message": "Invalid request" }));
    }
}

#[tokio::test]
async fn test_owner_updates_own_name() {
    let app = TestApp::new();
    let viewer = app.viewer_token().await;

    let (status, body) = app
        .request(
            Method::PUT,
            "/users/username01",
            Some(&viewer),
            Some(json!({ "name": "User One", "username": "hijack", "extra": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "name": "User One", "username": "username01", "role": "viewer" })
    );

    // Cannot touch someone else's record
    let (status, _) = app
        .request(
            Method::PUT,
            "/users/admin",
            Some(&viewer),
            Some(json!({ "name": "Pwned" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_change_requires_admin() {
    let app = TestApp::new();
    let viewer = app.viewer_token().await;

    let (status, _) = app
        .request(
            Method::PUT,
            "/users/username01",
            Some(&viewer),
            Some(json!({ "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await;
    let (status, body) = app
        .request(
            Method::PUT,
            "/users/username01",
            Some(&admin),
            Some(json!({ "role": "doctor" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "doctor");

    // The old token still carries the viewer role until it expires
    let (status, _) = app.get("/users/", Some(&viewer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A fresh login picks up the new role
    let doctor = app.viewer_token().await;
    let (status, _) = app.get("/users/", Some(&doctor)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_missing_user_is_404() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, _) = app
        .request(
            Method::PUT,
            "/users/ghost",
            Some(&admin),
            Some(json!({ "name": "Ghost" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user() {
    let app = TestApp::new();
    let viewer = app.viewer_token().await;
    let admin = app.admin_token().await;

    // Owners may not delete themselves; delete is admin-only
    let (status, _) = app
        .request(Method::DELETE, "/users/username01", Some(&viewer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(Method::DELETE, "/users/username01", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], 200);

    let (status, _) = app
        .request(Method::DELETE, "/users/username01", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deleted account's token stays decodable but the record is gone
    let (status, _) = app.get("/users/username01", Some(&viewer)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            Method::POST,
            "/auth",
            None,
            Some(json!({ "username": "username01", "password": "password2" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
