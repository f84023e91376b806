#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use staffpurchase_api::auth::identity::JwtVerifier;
use staffpurchase_api::auth::jwt::{issue_token, JwtConfig};
use staffpurchase_api::config::{NotificationConfig, ServerConfig};
use staffpurchase_api::router::build_app_router;
use staffpurchase_api::state::AppState;
use staffpurchase_db::MemoryStore;
use staffpurchase_events::{EventBus, LogMailer, ReminderScheduler, Templates};

pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            issuer: None,
        },
        notifications: NotificationConfig {
            admin_email: ADMIN_EMAIL.to_string(),
            rebate_email: None,
            base_url: "http://localhost:5173".to_string(),
        },
        reminder_hour: 8,
        seed_products: false,
    }
}

/// The router plus handles the tests inspect directly.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub event_bus: Arc<EventBus>,
    pub config: ServerConfig,
}

impl TestApp {
    /// Sign an identity token for `uid`.
    pub fn token(&self, uid: &str, email: &str, name: Option<&str>) -> String {
        issue_token(uid, Some(email), name, 3600, &self.config.jwt).expect("token should sign")
    }

    /// Sync the first account (which becomes admin) and return its token.
    pub async fn admin_token(&self) -> String {
        let token = self.token("admin-uid", ADMIN_EMAIL, Some("Alex Admin"));
        let response = post_json_auth(self.router.clone(), "/api/auth/sync", serde_json::json!({}), &token).await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        token
    }
}

/// Build the full application over an in-memory store, with the same
/// middleware stack production uses.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryStore::new());
    let event_bus = Arc::new(EventBus::default());
    let reminders = Arc::new(ReminderScheduler::new(
        store.clone(),
        Arc::new(LogMailer),
        Templates::new(config.notifications.base_url.clone()),
        config.reminder_hour,
    ));

    let state = AppState {
        requests: store.clone(),
        products: store.clone(),
        staff: store.clone(),
        identity: Arc::new(JwtVerifier::new(config.jwt.clone())),
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        reminders,
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        event_bus,
        config,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

fn json_request(
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, empty_request(Method::GET, uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request(Method::GET, uri, Some(token))).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, empty_request(Method::POST, uri, None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, body, None)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, body, Some(token))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, body, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request(Method::DELETE, uri, Some(token))).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A complete, valid submission body.
pub fn purchase_request_body(store: &str, employee: &str) -> serde_json::Value {
    serde_json::json!({
        "storeName": store,
        "employeeName": employee,
        "orderDate": "2026-01-10",
        "invoiceDate": "2026-01-12",
        "productModel": "HABROK - HQ35L 4K",
        "discount": "30%",
        "serialNumber": "SN-001",
        "email": "sight@store.example",
        "publicEmail": "filler@example.com"
    })
}
