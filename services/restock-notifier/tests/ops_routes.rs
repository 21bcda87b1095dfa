use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common_observability::RestockMetrics;
use restock_notifier::server::ops_router;
use std::sync::Arc;
use tower::ServiceExt; // oneshot

#[tokio::test]
async fn healthz_returns_ok() {
    let metrics = Arc::new(RestockMetrics::new().unwrap());
    let resp = ops_router(metrics)
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn metrics_exposes_invocation_counters() {
    let metrics = Arc::new(RestockMetrics::new().unwrap());
    metrics.record_outcome("dispatched");
    metrics.dispatch_failures_total.inc();

    let resp = ops_router(metrics)
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("restock_invocations_total{outcome=\"dispatched\"} 1"), "{text}");
    assert!(text.contains("restock_dispatch_failures_total 1"), "{text}");
}
