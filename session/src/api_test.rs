use super::*;
use std::collections::HashMap;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{Value, json};

// =============================================================================
// STUB SERVICE
// =============================================================================

const GOOD_TOKEN: &str = "good-token";

async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == format!("Bearer {GOOD_TOKEN}") => (
            StatusCode::OK,
            Json(json!({ "username": "alice", "email": "alice@example.com", "id": 1, "is_active": true })),
        ),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Invalid authentication credentials" }))),
    }
}

async fn token(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    let username = form.get("username").map(String::as_str);
    let password = form.get("password").map(String::as_str);
    if username == Some("alice") && password == Some("pw & more") {
        (StatusCode::OK, Json(json!({ "access_token": GOOD_TOKEN, "token_type": "bearer" })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Incorrect username or password" })))
    }
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    match body.get("username").and_then(Value::as_str) {
        Some("taken") => (StatusCode::BAD_REQUEST, Json(json!({ "detail": "Username already registered" }))),
        Some("") => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "loc": ["body", "username"], "msg": "field required" }] })),
        ),
        Some(name) => (
            StatusCode::OK,
            Json(json!({ "username": name, "email": body["email"], "id": 2, "is_active": true })),
        ),
        None => (StatusCode::BAD_REQUEST, Json(json!({}))),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn not_json() -> &'static str {
    "<html>oops</html>"
}

fn stub_router() -> Router {
    Router::new()
        .route("/api/users/me", get(me))
        .route("/api/token", post(token))
        .route("/api/register", post(register))
        .route("/api/health", get(health))
        .route("/broken/api/users/me", get(not_json))
        .route("/broken/api/health", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
}

async fn spawn_stub() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("stub should bind");
    let addr = listener.local_addr().expect("stub should have an address");
    tokio::spawn(async move {
        axum::serve(listener, stub_router()).await.expect("stub server failed");
    });
    format!("http://{addr}")
}

async fn closed_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("stub listener should bind");
    let addr = listener.local_addr().expect("stub listener should have an address");
    drop(listener);
    format!("http://{addr}")
}

fn client(base_url: &str) -> HttpAuthApi {
    HttpAuthApi::new(&SessionConfig::new(base_url).unwrap()).unwrap()
}

// =============================================================================
// parse_detail
// =============================================================================

#[test]
fn parse_detail_string() {
    assert_eq!(parse_detail(r#"{"detail":"Username already registered"}"#).as_deref(), Some("Username already registered"));
}

#[test]
fn parse_detail_validation_list() {
    let body = r#"{"detail":[{"msg":"field required"},{"msg":"value is not a valid email"}]}"#;
    assert_eq!(parse_detail(body).as_deref(), Some("field required; value is not a valid email"));
}

#[test]
fn parse_detail_blank_string_is_none() {
    assert_eq!(parse_detail(r#"{"detail":"  "}"#), None);
}

#[test]
fn parse_detail_non_json_is_none() {
    assert_eq!(parse_detail("Internal Server Error"), None);
}

#[test]
fn parse_detail_missing_field_is_none() {
    assert_eq!(parse_detail(r#"{"error":"x"}"#), None);
}

// =============================================================================
// whoami
// =============================================================================

#[tokio::test]
async fn whoami_sends_bearer_token() {
    let api = client(&spawn_stub().await);
    let user = api.whoami(GOOD_TOKEN).await.unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.id, Some(1));
}

#[tokio::test]
async fn whoami_rejected_token_is_status_error() {
    let api = client(&spawn_stub().await);
    let err = api.whoami("stale").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.user_message(), "Invalid authentication credentials");
}

#[tokio::test]
async fn whoami_non_json_body_is_parse_error() {
    let base = spawn_stub().await;
    let api = client(&format!("{base}/broken"));
    assert!(matches!(api.whoami(GOOD_TOKEN).await, Err(ApiError::Parse(_))));
}

#[tokio::test]
async fn whoami_unreachable_service_is_request_error() {
    let api = client(&closed_base_url().await);
    assert!(matches!(api.whoami(GOOD_TOKEN).await, Err(ApiError::Request(_))));
}

// =============================================================================
// issue_token
// =============================================================================

#[tokio::test]
async fn issue_token_posts_form_encoded_credentials() {
    let api = client(&spawn_stub().await);
    let creds = Credentials { username: "alice".into(), password: "pw & more".into() };
    let grant = api.issue_token(&creds).await.unwrap();
    assert_eq!(grant.access_token, GOOD_TOKEN);
    assert_eq!(grant.token_type, "bearer");
}

#[tokio::test]
async fn issue_token_bad_password_carries_detail() {
    let api = client(&spawn_stub().await);
    let creds = Credentials { username: "alice".into(), password: "wrong".into() };
    let err = api.issue_token(&creds).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 401, .. }));
    assert_eq!(err.user_message(), "Incorrect username or password");
}

// =============================================================================
// register
// =============================================================================

#[tokio::test]
async fn register_posts_json() {
    let api = client(&spawn_stub().await);
    let reg = Registration { username: "carol".into(), email: "carol@example.com".into(), password: "pw".into() };
    assert!(api.register(&reg).await.is_ok());
}

#[tokio::test]
async fn register_duplicate_username_carries_detail() {
    let api = client(&spawn_stub().await);
    let reg = Registration { username: "taken".into(), email: "t@example.com".into(), password: "pw".into() };
    let err = api.register(&reg).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "Username already registered");
}

#[tokio::test]
async fn register_validation_error_joins_messages() {
    let api = client(&spawn_stub().await);
    let reg = Registration { username: String::new(), email: "x@example.com".into(), password: "pw".into() };
    let err = api.register(&reg).await.unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.user_message(), "field required");
}

// =============================================================================
// health
// =============================================================================

#[tokio::test]
async fn health_reports_status() {
    let api = client(&spawn_stub().await);
    assert_eq!(api.health().await.unwrap().status, "healthy");
}

#[tokio::test]
async fn health_unavailable_is_status_error() {
    let base = spawn_stub().await;
    let api = client(&format!("{base}/broken"));
    let err = api.health().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[test]
fn base_url_is_normalized() {
    let api = client("http://localhost:8000/");
    assert_eq!(api.base_url(), "http://localhost:8000");
}
