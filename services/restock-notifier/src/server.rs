use axum::{extract::State, http::StatusCode, routing::get, Router};
use common_observability::RestockMetrics;
use std::sync::Arc;

/// Health and metrics endpoints served while running on a schedule.
pub fn ops_router(metrics: Arc<RestockMetrics>) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .with_state(metrics)
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics_endpoint(State(metrics): State<Arc<RestockMetrics>>) -> (StatusCode, String) {
    match metrics.render() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        ),
    }
}
