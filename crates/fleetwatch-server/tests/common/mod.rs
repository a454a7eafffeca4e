#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use fleetwatch_alert::MetricRegistry;
use fleetwatch_server::app;
use fleetwatch_server::state::AppState;
use fleetwatch_storage::AlertStore;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub struct TestContext {
    pub state: AppState,
    pub app: axum::Router,
}

pub async fn build_test_context() -> TestContext {
    fleetwatch_common::id::init(1, 1);

    let store = Arc::new(
        AlertStore::in_memory()
            .await
            .expect("in-memory store should open"),
    );
    let state = AppState {
        store,
        metrics: Arc::new(MetricRegistry::new()),
        start_time: Utc::now(),
    };
    let app = app::build_http_app(state.clone());
    TestContext { state, app }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub trace_id: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("body should be json")
    }
}

pub async fn get(app: &axum::Router, uri: &str) -> TestResponse {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    let status = resp.status();
    let header = |name: &str| {
        resp.headers()
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string())
    };
    let content_type = header("content-type");
    let trace_id = header("x-trace-id");
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    TestResponse {
        status,
        content_type,
        trace_id,
        body: String::from_utf8(bytes.to_vec()).expect("body should be utf-8"),
    }
}
