#![allow(dead_code)]

use alertdesk_server::app;
use alertdesk_server::config::{ServerConfig, StorageBackend, StorageConfig};
use alertdesk_server::state::AppState;
use alertdesk_storage::{AlertStore, MemoryAlertStore, SeaOrmAlertStore};
use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub state: AppState,
    pub app: axum::Router,
}

fn test_config(temp_dir: &TempDir, backend: StorageBackend) -> ServerConfig {
    ServerConfig {
        storage: StorageConfig {
            backend,
            url: None,
            data_dir: temp_dir.path().to_string_lossy().to_string(),
        },
        ..Default::default()
    }
}

fn build_with_store(
    temp_dir: TempDir,
    store: Arc<dyn AlertStore>,
    backend: StorageBackend,
) -> TestContext {
    let config = test_config(&temp_dir, backend);
    let state = AppState::new(store, config);
    let app = app::build_http_app(state.clone());
    TestContext {
        temp_dir,
        state,
        app,
    }
}

/// Router over an empty in-memory store.
pub fn build_test_context() -> Result<TestContext> {
    alertdesk_common::id::init(1, 1);
    let temp_dir = tempfile::tempdir()?;
    Ok(build_with_store(
        temp_dir,
        Arc::new(MemoryAlertStore::new()),
        StorageBackend::Memory,
    ))
}

/// Router over an empty SQLite database in a temp dir.
pub async fn build_db_test_context() -> Result<TestContext> {
    alertdesk_common::id::init(1, 1);
    let temp_dir = tempfile::tempdir()?;
    let url = format!(
        "sqlite://{}/alertdesk.db?mode=rwc",
        temp_dir.path().display()
    );
    let store = SeaOrmAlertStore::new(&url, temp_dir.path()).await?;
    Ok(build_with_store(
        temp_dir,
        Arc::new(store),
        StorageBackend::Database,
    ))
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let req_body = body.unwrap_or(Value::Null).to_string();
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(req_body))
        .expect("request should build");
    send(app, req).await
}

pub async fn request_no_body(
    app: &axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, req).await
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub fn assert_ok_envelope(json: &Value) {
    assert_eq!(json["err_code"], 0);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
}

pub fn assert_err_envelope(json: &Value, err_code: i32) {
    assert_eq!(json["err_code"], err_code);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
    assert!(json.get("data").is_some());
    assert!(json["data"].is_null());
}

pub fn decode_data<T: DeserializeOwned>(json: &Value) -> T {
    serde_json::from_value(json["data"].clone()).expect("data should decode")
}

/// A complete, valid creation body; `overrides` replaces individual fields.
pub fn alert_body(name: &str, overrides: Value) -> Value {
    let mut body = json!({
        "name": name,
        "type": "host",
        "level": "MEDIUM",
        "status": "ACTIVE",
        "description": format!("{name} description"),
        "company": "acme",
        "systemName": "billing",
        "host": "10.0.0.1",
        "endTime": "2024-05-01 12:00:00"
    });
    if let (Some(target), Some(extra)) = (body.as_object_mut(), overrides.as_object()) {
        for (k, v) in extra {
            target.insert(k.clone(), v.clone());
        }
    }
    body
}

/// Creates an alert through the API and returns its id.
pub async fn create_alert(app: &axum::Router, name: &str, overrides: Value) -> String {
    let (status, body, _) =
        request_json(app, "POST", "/v1/alerts", Some(alert_body(name, overrides))).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["data"]["id"]
        .as_str()
        .expect("created alert should have an id")
        .to_string()
}
