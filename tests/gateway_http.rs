//! HTTP surface: envelope, status codes and the bearer middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use phone_sso::config::{AuthConfig, PasswordConfig};
use phone_sso::gateway::{build_router, state::AppState};
use phone_sso::storage::MemoryStore;
use phone_sso::user_auth::AuthService;

const PHONE: &str = "+15550100";

fn app() -> (Arc<MemoryStore>, Router) {
    let store = MemoryStore::new().with_app(1, "s1").with_app(2, "s2");
    store.add_author(10, "Dostoevsky", "Novelist", "d.png", Some(50));
    store.add_article(20, "Essay", "e.png", "about reading");
    store.add_poet(30, "Pushkin", "p.png");
    store.add_quiz(40, "Who?", &[(1, "A", true), (2, "B", false)]);
    store.add_clip(50, "c.png", 40, &["opening", "ending"]);
    let store = Arc::new(store);

    let config = AuthConfig {
        token_ttl_secs: 600,
        op_timeout_ms: 5000,
        password: PasswordConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        },
    };
    let auth = Arc::new(AuthService::new(&config, store.clone(), store.clone()).unwrap());
    let state = Arc::new(AppState::new(
        auth,
        store.clone(),
        None,
        Duration::from_secs(5),
    ));
    (store, build_router(state))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Register PHONE and return (user_id, token for app 1)
async fn signed_in(app: &Router) -> (i64, String) {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({"phone": PHONE, "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = body["data"]["user_id"].as_i64().unwrap();

    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"phone": PHONE, "password": "pw", "app_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (user_id, body["data"]["token"].as_str().unwrap().to_string())
}

// ============================================================================
// Public routes
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (_store, app) = app();
    let (status, body) = call(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert!(body["data"]["timestamp_ms"].as_i64().unwrap() > 0);
    assert!(body["data"]["version"].is_string());
}

#[tokio::test]
async fn test_register_conflict_and_validation() {
    let (_store, app) = app();
    signed_in(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({"phone": PHONE, "password": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1002);
    assert_eq!(body["msg"], "user already exists");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({"password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "identity is required");
}

#[tokio::test]
async fn test_login_failures() {
    let (_store, app) = app();
    signed_in(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"phone": PHONE, "password": "wrong", "app_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2002);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"phone": PHONE, "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "app_id is required");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"phone": PHONE, "password": "pw", "app_id": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4002);
}

#[tokio::test]
async fn test_login_with_padded_phone() {
    let (_store, app) = app();
    let (user_id, _) = signed_in(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"phone": format!("  {} ", PHONE), "password": "pw", "app_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], user_id);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({"phone": format!("{}\t", PHONE), "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1002);
}

#[tokio::test]
async fn test_null_app_id_is_missing() {
    let (_store, app) = app();
    signed_in(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"phone": PHONE, "password": "pw", "app_id": null})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
    assert_eq!(body["msg"], "app_id is required");
}

#[tokio::test]
async fn test_malformed_bodies_use_envelope() {
    let (_store, app) = app();

    for (uri, body) in [
        ("/api/v1/auth/register", json!({"phone": 15550100, "password": "pw"})),
        ("/api/v1/auth/login", json!({"phone": PHONE, "password": "pw", "app_id": "one"})),
        ("/api/v1/auth/is_admin", json!({"user_id": "7"})),
    ] {
        let (status, body) = call(&app, Method::POST, uri, None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["code"], 1001, "{}", uri);
        assert!(body["msg"].as_str().unwrap().starts_with("invalid request body"));
    }

    // missing content type
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/register")
        .body(Body::from(json!({"phone": PHONE, "password": "pw"}).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn test_is_admin() {
    let (store, app) = app();
    let (user_id, _) = signed_in(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/is_admin",
        None,
        Some(json!({"user_id": user_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_admin"], false);

    store.set_admin(user_id, true);
    let (_, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/is_admin",
        None,
        Some(json!({"user_id": user_id})),
    )
    .await;
    assert_eq!(body["data"]["is_admin"], true);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/auth/is_admin",
        None,
        Some(json!({"user_id": 424242})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Bearer middleware
// ============================================================================

#[tokio::test]
async fn test_protected_route_without_token() {
    let (_store, app) = app();
    let (status, body) = call(&app, Method::GET, "/api/v1/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2001);
}

#[tokio::test]
async fn test_protected_route_with_garbage_token() {
    let (_store, app) = app();
    let (status, body) = call(&app, Method::GET, "/api/v1/feed", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2003);
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let (_store, app) = app();
    let (_, token) = signed_in(&app).await;

    let req = Request::builder()
        .uri("/api/v1/user")
        .header(header::AUTHORIZATION, token)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rotated_secret_invalidates_session() {
    let (store, app) = app();
    let (_, token) = signed_in(&app).await;

    let (status, _) = call(&app, Method::GET, "/api/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    store.rotate_secret(1, "rotated");
    let (status, _) = call(&app, Method::GET, "/api/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Content
// ============================================================================

#[tokio::test]
async fn test_profile_is_token_subject() {
    let (_store, app) = app();
    let (user_id, token) = signed_in(&app).await;

    let (status, body) = call(&app, Method::GET, "/api/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], user_id);
    assert_eq!(body["data"]["phone"], PHONE);
}

#[tokio::test]
async fn test_favorite_roundtrip_through_feed() {
    let (_store, app) = app();
    let (_, token) = signed_in(&app).await;

    let (status, _) = call(
        &app,
        Method::PATCH,
        "/api/v1/favorites",
        Some(&token),
        Some(json!({"kind": "poet", "item_id": 30, "is_fave": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, "/api/v1/feed", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["poets"][0]["is_fave"], true);
    assert_eq!(body["data"]["authors"][0]["is_fave"], false);
    assert_eq!(body["data"]["authors"][0]["text"], "Novelist");
    assert_eq!(body["data"]["authors"][0]["clip_id"], 50);
    assert_eq!(body["data"]["articles"][0]["is_fave"], false);

    let (status, body) = call(
        &app,
        Method::PATCH,
        "/api/v1/favorites",
        Some(&token),
        Some(json!({"kind": "author", "item_id": 999, "is_fave": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "item not found");
}

#[tokio::test]
async fn test_quiz() {
    let (_store, app) = app();
    let (_, token) = signed_in(&app).await;

    let (status, body) = call(&app, Method::GET, "/api/v1/quiz/40", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["answers"].as_array().unwrap().len(), 2);

    let (status, body) = call(&app, Method::GET, "/api/v1/quiz/41", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "quiz not found");
}

#[tokio::test]
async fn test_favorite_with_wrong_kind_uses_envelope() {
    let (_store, app) = app();
    let (_, token) = signed_in(&app).await;

    let (status, body) = call(
        &app,
        Method::PATCH,
        "/api/v1/favorites",
        Some(&token),
        Some(json!({"kind": "painter", "item_id": 30, "is_fave": true})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn test_clip() {
    let (_store, app) = app();
    let (_, token) = signed_in(&app).await;

    let (status, body) = call(&app, Method::GET, "/api/v1/clip/50", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 50);
    assert_eq!(body["data"]["text"][0]["position"], 1);
    assert_eq!(body["data"]["text"][0]["text"], "opening");
    assert_eq!(body["data"]["text"][1]["text"], "ending");
    assert_eq!(body["data"]["quiz"]["id"], 40);

    let (status, body) = call(&app, Method::GET, "/api/v1/clip/51", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "clip not found");

    let (status, _) = call(&app, Method::GET, "/api/v1/clip/50", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_user_ends_account() {
    let (store, app) = app();
    let (_, token) = signed_in(&app).await;

    let (status, _) = call(&app, Method::DELETE, "/api/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.user_count(), 0);

    // token still verifies, but the subject is gone
    let (status, _) = call(&app, Method::GET, "/api/v1/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"phone": PHONE, "password": "pw", "app_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_openapi_served() {
    let (_store, app) = app();
    let (status, body) = call(&app, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Phone SSO API");
}
