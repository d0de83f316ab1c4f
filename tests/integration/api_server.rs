//! Integration tests for the API Server
//!
//! Tests HTTP endpoints, health checks, metrics, and the published snapshot reads.


use serde_json::Value;

use test_utils::TestApiServer;

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "plantwatch-api");
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApiServer::new().await;
    let _ = app.server.get("/health").await;

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    for name in [
        "http_requests_total",
        "http_request_duration_seconds",
        "http_requests_in_flight",
        "plants_classified_total",
    ] {
        assert!(body.contains(name), "Expected {} metric", name);
    }
    assert!(app.metrics.http_requests_total.get() >= 1);
}

#[tokio::test]
async fn empty_snapshot_serves_empty_lists() {
    let app = TestApiServer::new().await;

    let plants: Value = app.server.get("/api/plants").await.json();
    assert_eq!(plants.as_array().map(Vec::len), Some(0));

    let summary: Value = app.server.get("/api/summary").await.json();
    assert_eq!(summary["total"], 0);
    assert!(summary["publishedAt"].is_null());
}

#[tokio::test]
async fn plants_endpoint_lists_published_statuses() {
    let app = TestApiServer::with_fleet().await;

    let body: Value = app.server.get("/api/plants").await.json();
    let plants = body.as_array().expect("array of plants");

    assert_eq!(plants.len(), 3);
    let b = plants.iter().find(|p| p["code"] == "B").expect("plant B");
    assert_eq!(b["displayState"], "Curtailed");
    assert_eq!(b["status"]["isLikelyCurtailed"], true);
}

#[tokio::test]
async fn plants_endpoint_filters_by_fuel_region_and_state() {
    let app = TestApiServer::with_fleet().await;

    let solar: Value = app.server.get("/api/plants").add_query_param("fuel", "solar").await.json();
    assert_eq!(solar.as_array().map(Vec::len), Some(1));
    assert_eq!(solar[0]["code"], "C");

    let spp: Value = app.server.get("/api/plants").add_query_param("region", "spp").await.json();
    assert_eq!(spp.as_array().map(Vec::len), Some(2));

    let oklahoma: Value = app.server.get("/api/plants").add_query_param("state", "ok").await.json();
    assert_eq!(oklahoma.as_array().map(Vec::len), Some(1));
    assert_eq!(oklahoma[0]["code"], "B");
}

#[tokio::test]
async fn unknown_fuel_filter_is_a_bad_request() {
    let app = TestApiServer::with_fleet().await;
    let response = app.server.get("/api/plants").add_query_param("fuel", "coal").await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn plant_detail_includes_risk_rating() {
    let app = TestApiServer::with_fleet().await;

    let body: Value = app.server.get("/api/plants/B").await.json();

    assert_eq!(body["plant"]["code"], "B");
    assert_eq!(body["risk"]["plantCode"], "B");
    assert_eq!(body["risk"]["window30d"]["outageTopicCount"], 1);
}

#[tokio::test]
async fn plant_without_news_has_null_risk() {
    let app = TestApiServer::with_fleet().await;
    let body: Value = app.server.get("/api/plants/A").await.json();
    assert!(body["risk"].is_null());
}

#[tokio::test]
async fn unknown_plant_is_not_found() {
    let app = TestApiServer::with_fleet().await;
    let response = app.server.get("/api/plants/ZZZ").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn risk_endpoint_sorts_and_limits() {
    let app = TestApiServer::with_fleet().await;

    let all: Value = app.server.get("/api/risk").await.json();
    let all = all.as_array().expect("array of ratings");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["plantCode"], "B");
    assert!(all[0]["riskScore"].as_f64() >= all[1]["riskScore"].as_f64());

    let top: Value = app.server.get("/api/risk").add_query_param("limit", 1).await.json();
    assert_eq!(top.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn summary_counts_display_states() {
    let app = TestApiServer::with_fleet().await;

    let body: Value = app.server.get("/api/summary").await.json();

    assert_eq!(body["total"], 3);
    assert_eq!(body["byState"]["Curtailed"], 1);
    assert_eq!(body["byState"]["MaintenanceOffline"], 1);
    assert_eq!(body["byFuel"]["Solar"]["MaintenanceOffline"], 1);
    assert!(body["publishedAt"].is_string());
}
