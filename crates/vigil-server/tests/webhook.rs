//! End-to-end tests for the webhook pipeline, driven through the real
//! router with an in-memory store and a mock notification sink.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use vigil_server::middleware::rate_limit::{KeyStrategy, RateLimitConfig};
use vigil_server::{routes::create_router, AppState};
use vigil_store::{EventId, EventStore, InMemoryEventStore, PersistError};
use vigil_types::SecurityEvent;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A store whose backend is down.
struct FailingStore;

#[async_trait]
impl EventStore for FailingStore {
    async fn persist(&self, _event: &SecurityEvent) -> Result<EventId, PersistError> {
        Err(PersistError::Unavailable("connection refused".into()))
    }
}

fn generous_rate_limit() -> RateLimitConfig {
    RateLimitConfig::new(1000, Duration::from_secs(60)).with_bypass_path("/health")
}

fn app(store: Arc<dyn EventStore>, sink_url: Option<String>) -> Router {
    let state = AppState::new(store, sink_url).unwrap();
    create_router(state, generous_rate_limit())
}

async fn request(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn post_webhook(app: &Router, body: &Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    request(app, req).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    request(app, req).await
}

fn settings(monitored: &[&str], severity: &str) -> Value {
    json!({
        "auth_key": "test_key",
        "alert_threshold": 5,
        "time_window": 15,
        "alert_severity": severity,
        "alert_admins": ["DevOps-Lead"],
        "monitored_events": monitored,
    })
}

fn lockout_request(severity: &str) -> Value {
    json!({
        "event_type": "account_lockout",
        "payload": {
            "userId": "u1",
            "ipAddress": "1.2.3.4",
            "timestamp": 1722945600000_i64,
            "eventType": "account_lockout",
            "success": true,
            "attempts": 3,
            "lockoutDuration": "30 minutes",
        },
        "settings": settings(&["account_lockout"], severity),
    })
}

#[tokio::test]
async fn missing_top_level_fields_return_400() {
    let store = Arc::new(InMemoryEventStore::new());
    let app = app(store.clone(), None);

    let (status, body) = post_webhook(&app, &json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("event_type"));
    assert!(error.contains("payload"));
    assert!(error.contains("settings"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn invalid_settings_return_400_before_any_side_effect() {
    let sink = MockServer::start().await;
    let store = Arc::new(InMemoryEventStore::new());
    let app = app(store.clone(), Some(sink.uri()));

    let mut body = lockout_request("High");
    body["settings"]
        .as_object_mut()
        .unwrap()
        .remove("alert_admins");

    let (status, response) = post_webhook(&app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Invalid settings configuration");
    assert!(response["details"][0]
        .as_str()
        .unwrap()
        .contains("alert_admins"));
    assert!(store.is_empty());
    assert!(sink.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_settings_report_every_problem() {
    let store = Arc::new(InMemoryEventStore::new());
    let app = app(store.clone(), None);

    let mut body = lockout_request("High");
    body["settings"] = json!({});

    let (status, response) = post_webhook(&app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["details"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn unmonitored_event_is_skipped_without_persistence() {
    let sink = MockServer::start().await;
    let store = Arc::new(InMemoryEventStore::new());
    let app = app(store.clone(), Some(sink.uri()));

    let mut body = lockout_request("High");
    body["settings"]["monitored_events"] = json!(["failed_login"]);

    let (status, response) = post_webhook(&app, &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"status": "skipped"}));
    assert!(store.is_empty());
    assert!(sink.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_event_type_returns_400() {
    let store = Arc::new(InMemoryEventStore::new());
    let app = app(store.clone(), None);

    let body = json!({
        "event_type": "ddos_attack",
        "payload": {"userId": "u1"},
        "settings": settings(&["ddos_attack"], "High"),
    });

    let (status, response) = post_webhook(&app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"]
        .as_str()
        .unwrap()
        .contains("Unknown event type"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn payload_not_matching_declared_type_returns_400() {
    let store = Arc::new(InMemoryEventStore::new());
    let app = app(store.clone(), None);

    // Declared as failed_login, but the payload is an account_lockout.
    let body = json!({
        "event_type": "failed_login",
        "payload": {
            "userId": "u1",
            "ipAddress": "1.2.3.4",
            "timestamp": 1722945600000_i64,
            "eventType": "account_lockout",
            "success": true,
            "lockoutDuration": "30 minutes",
        },
        "settings": settings(&["failed_login"], "High"),
    });

    let (status, _) = post_webhook(&app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(store.is_empty());
}

#[tokio::test]
async fn processed_lockout_persists_and_dispatches_warning() {
    let sink = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&sink)
        .await;

    let store = Arc::new(InMemoryEventStore::new());
    let app = app(store.clone(), Some(sink.uri()));

    let (status, response) = post_webhook(&app, &lockout_request("High")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"status": "processed"}));

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].event.kind().as_str(), "account_lockout");

    let requests = sink.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let alert: Value = serde_json::from_slice(&requests[0].body).unwrap();
    // High is not Critical, so the channel status is a warning.
    assert_eq!(alert["status"], "warning");
    assert!(alert["message"]
        .as_str()
        .unwrap()
        .contains("Duration: 30 minutes"));
}

#[tokio::test]
async fn critical_severity_dispatches_error_status() {
    let sink = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&sink)
        .await;

    let store = Arc::new(InMemoryEventStore::new());
    let app = app(store.clone(), Some(sink.uri()));

    let (status, _) = post_webhook(&app, &lockout_request("Critical")).await;
    assert_eq!(status, StatusCode::OK);

    let requests = sink.received_requests().await.unwrap();
    let alert: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(alert["status"], "error");
}

#[tokio::test]
async fn monitored_but_benign_event_is_processed_without_dispatch() {
    let sink = MockServer::start().await;
    let store = Arc::new(InMemoryEventStore::new());
    let app = app(store.clone(), Some(sink.uri()));

    let body = json!({
        "event_type": "password_change",
        "payload": {
            "userId": "finance@secure.com",
            "ipAddress": "10.0.0.50",
            "timestamp": 1722945600000_i64,
            "eventType": "password_change",
            "success": true,
            "previousChange": "30 days ago",
        },
        "settings": settings(&["password_change"], "Low"),
    });

    let (status, response) = post_webhook(&app, &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"status": "processed"}));
    assert_eq!(store.len(), 1);
    assert!(sink.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_submissions_persist_and_dispatch_twice() {
    let sink = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&sink)
        .await;

    let store = Arc::new(InMemoryEventStore::new());
    let app = app(store.clone(), Some(sink.uri()));

    let body = lockout_request("High");
    let (first, _) = post_webhook(&app, &body).await;
    let (second, _) = post_webhook(&app, &body).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(store.len(), 2);
    assert_eq!(sink.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn persistence_failure_fails_the_request() {
    let sink = MockServer::start().await;
    let app = app(Arc::new(FailingStore), Some(sink.uri()));

    let (status, response) = post_webhook(&app, &lockout_request("High")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["code"], "persistence_error");
    // Nothing was persisted, so nothing may be dispatched either.
    assert!(sink.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn dispatch_failure_returns_500_but_keeps_the_record() {
    let sink = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&sink)
        .await;

    let store = Arc::new(InMemoryEventStore::new());
    let app = app(store.clone(), Some(sink.uri()));

    let (status, response) = post_webhook(&app, &lockout_request("High")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["code"], "dispatch_error");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn missing_sink_url_fails_dispatch_capable_calls() {
    let store = Arc::new(InMemoryEventStore::new());
    let app = app(store.clone(), None);

    let (status, response) = post_webhook(&app, &lockout_request("High")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["error"], "Webhook URL not configured");
    assert_eq!(response["setup_required"], true);
    // Persistence precedes dispatch and stands.
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn sixth_request_in_window_is_rejected() {
    let state = AppState::new(Arc::new(InMemoryEventStore::new()), None).unwrap();
    let rate_limit = RateLimitConfig::new(5, Duration::from_millis(200))
        .with_key_strategy(KeyStrategy::Global)
        .with_bypass_path("/health");
    let app = create_router(state, rate_limit);

    for _ in 0..5 {
        let (status, _) = get(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests");

    // A fresh window admits requests again.
    tokio::time::sleep(Duration::from_millis(250)).await;
    let (status, _) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_bypasses_the_rate_limiter() {
    let state = AppState::new(Arc::new(InMemoryEventStore::new()), None).unwrap();
    let rate_limit = RateLimitConfig::new(1, Duration::from_secs(60))
        .with_key_strategy(KeyStrategy::Global)
        .with_bypass_path("/health");
    let app = create_router(state, rate_limit);

    let (status, _) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, "/").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // The limiter is exhausted, yet health still answers.
    for _ in 0..3 {
        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}

#[tokio::test]
async fn bypass_token_skips_the_limiter() {
    let state = AppState::new(Arc::new(InMemoryEventStore::new()), None).unwrap();
    let rate_limit = RateLimitConfig::new(1, Duration::from_secs(60))
        .with_key_strategy(KeyStrategy::Global)
        .with_bypass_token("ci-secret");
    let app = create_router(state, rate_limit);

    let (status, _) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, "/").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let req = Request::builder()
        .uri("/")
        .header("x-vigil-bypass", "ci-secret")
        .body(Body::empty())
        .unwrap();
    let (status, _) = request(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_reports_uptime_and_timestamp() {
    let app = app(Arc::new(InMemoryEventStore::new()), None);

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["uptime"].is_number());
    assert!(body["timestamp"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn root_and_integration_spec_answer() {
    let app = app(Arc::new(InMemoryEventStore::new()), None);

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["message"].is_string());

    let (status, body) = get(&app, "/integrationspec").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["integration_type"], "webhook");

    let (status, _) = get(&app, "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
