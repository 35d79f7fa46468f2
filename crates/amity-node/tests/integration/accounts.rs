//! Signup, login, token refresh and bearer authentication

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, PASSWORD};

#[tokio::test]
async fn test_signup_registers_account() {
    let app = TestApp::new();
    let (status, body) = app.signup("  Ada@Example.com ").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"], json!(["You have been registered successfully."]));

    // Normalized email is the login name
    let (status, _) = app.login("ada@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_rejects_taken_email_ignoring_case() {
    let app = TestApp::new();
    app.signup("ada@example.com").await;

    let (status, body) = app.signup("ADA@example.com").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["fields"]["email"], json!(["User with this email already exists."]));
}

#[tokio::test]
async fn test_signup_reports_every_field_problem() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/signup",
            None,
            Some(json!({
                "email": "not-an-email",
                "password": "tricky-bramble-42",
                "confirm_password": "tricky-bramble-43",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["email"], json!(["Enter a valid email address."]));
    assert_eq!(
        body["fields"]["password"],
        json!(["Password and confirm Password did not match."])
    );
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_signup_rejects_weak_password() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/signup/",
            None,
            Some(json!({
                "email": "cy@example.com",
                "password": "12345678",
                "confirm_password": "12345678",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["password"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.post("/login/", None, Some(json!(42))).await;

    assert!(status.is_client_error());
    assert_eq!(body["code"], "MALFORMED_REQUEST");
}

#[tokio::test]
async fn test_login_returns_tokens() {
    let app = TestApp::new();
    app.signup("ada@example.com").await;

    let (status, body) = app.login("Ada@Example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"], json!(["Success"]));
    assert!(body["access"].as_str().unwrap().contains('.'));
    assert!(body["refresh"].as_str().unwrap().contains('.'));
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let app = TestApp::new();
    app.signup("ada@example.com").await;

    for (email, password) in [("ada@example.com", "wrong-password"), ("nobody@example.com", PASSWORD)] {
        let (status, body) = app.login(email, password).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["messages"], json!(["Invalid email or password"]));
    }
}

#[tokio::test]
async fn test_refresh_issues_working_access_token() {
    let app = TestApp::new();
    app.signup("ada@example.com").await;
    let (_, tokens) = app.login("ada@example.com", PASSWORD).await;

    let (status, body) = app
        .post("/token/refresh/", None, Some(json!({ "refresh": tokens["refresh"] })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let access = body["access"].as_str().unwrap();
    let (status, _) = app.get("/list-friends/", Some(access)).await;
    assert_eq!(status, StatusCode::OK);

    // An access token is not a refresh token
    let (status, _) = app
        .post("/token/refresh/", None, Some(json!({ "refresh": tokens["access"] })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_need_access_token() {
    let app = TestApp::new();
    app.signup("ada@example.com").await;
    let (_, tokens) = app.login("ada@example.com", PASSWORD).await;

    let (status, body) = app.get("/list-friends/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "NOT_AUTHENTICATED");

    let refresh = tokens["refresh"].as_str().unwrap();
    let (status, _) = app.get("/list-friends/", Some(refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/send-friend-request/1/", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_operational_endpoints() {
    let app = TestApp::new();

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let (status, body) = app.get("/api/info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "test-node");
    assert_eq!(body["storage"], "memory");
    assert!(body["version"].is_string());
}
