use axum::http::StatusCode;
use axum::{body::HttpBody, extract::State, routing::get, Json, Router};
use axum_prometheus::metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;

#[derive(Clone)]
struct HealthState {}

async fn health(State(_): State<HealthState>) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

async fn metrics(State(handle): State<PrometheusHandle>) -> String { handle.render() }

/// Health check and metrics scraping.
pub fn monitoring_router<B>(metric_handle: PrometheusHandle) -> Router<(), B>
where
    B: HttpBody + Send + 'static,
{
    Router::new()
        .route("/health", get(health).with_state(HealthState {}))
        .route("/metrics", get(metrics).with_state(metric_handle))
}
