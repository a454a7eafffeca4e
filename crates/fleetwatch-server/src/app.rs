use axum::extract::{Extension, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::logging::{self, TraceId};
use crate::state::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Serialize)]
struct HealthResponse {
    version: String,
    uptime_secs: i64,
    storage_status: String,
    /// Outcome of the last reconciliation pass, absent before the first.
    last_pass_status: Option<String>,
    trace_id: String,
}

async fn health(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let uptime = (Utc::now() - state.start_time).num_seconds();
    let (status, storage_status) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ok".to_string()),
        Err(e) => {
            tracing::error!(error = %e, "Health check storage ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    };
    (
        status,
        Json(HealthResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: uptime,
            storage_status,
            last_pass_status: state.metrics.status(),
            trace_id: trace_id.0,
        }),
    )
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render_prometheus(),
    )
}

pub fn build_http_app(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/v1/health", get(health))
        .layer(middleware::from_fn(logging::request_logging))
        .with_state(state)
}
