//! Tests for health check and metrics endpoints.

use axum::http::StatusCode;
use integration_tests::setup::TestContext;
use telemetry::health;

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new();
    let response = ctx.server().get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();

    for field in ["status", "redpanda_connected", "clickhouse_connected", "components"] {
        assert!(body.get(field).is_some(), "Response should have '{}' field", field);
    }

    let status = body["status"].as_str().unwrap_or("");
    assert!(
        status == "healthy" || status == "degraded" || status == "unhealthy",
        "Status should be 'healthy', 'degraded', or 'unhealthy', got '{}'",
        status
    );

    let names: Vec<&str> = body["components"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["redpanda", "clickhouse"]);
}

/// Test liveness and readiness probes
#[tokio::test]
async fn test_probes() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server.get("/health/live").await.assert_status_ok();

    health().clickhouse.set_healthy();
    server.get("/health/ready").await.assert_status_ok();

    health().clickhouse.set_unhealthy("test outage");
    server
        .get("/health/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    health().clickhouse.set_healthy();
}

/// Test /metrics exposes the pipeline counters
#[tokio::test]
async fn test_metrics_endpoint() {
    let ctx = TestContext::new();
    let response = ctx.server().get("/metrics").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    for field in [
        "timestamp",
        "logs_consumed",
        "logs_parsed",
        "logs_rejected",
        "events_stored",
        "curve_requests",
        "curve_latency_mean_ms",
    ] {
        assert!(body.get(field).is_some(), "Metrics should have '{}' field", field);
    }
}
