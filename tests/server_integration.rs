//! HTTP Server Integration Tests
//!
//! Drives the router returned by `api::build_router` with
//! `tower::ServiceExt::oneshot`, without binding a socket.
//!
//! # Test Coverage
//!
//! 1. **Health Endpoint** - GET /health
//! 2. **Stats Endpoint** - GET /api/v1/stats
//! 3. **Data Endpoint** - POST /api/v1/data with scales, aggregators, defaults
//! 4. **Filters Endpoint** - GET /api/v1/filters with and without a prefix
//! 5. **Error Handling** - malformed filters and bodies

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use datastream_tsdb::{
    api::{build_router, AppState},
    config::ServerConfig,
    engine::MetricProcessor,
    types::{MetricRecord, TagSet},
};
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Test Helpers
// =============================================================================

fn test_router() -> Router {
    let processor = Arc::new(MetricProcessor::new());
    let rows = [
        (1, (2019, 3, 2), 10.0, "Chicago", "M"),
        (2, (2019, 3, 12), 20.0, "Chicago", "M"),
        (3, (2019, 3, 28), 30.0, "Chicago", "M"),
        (4, (2019, 4, 3), 12.5, "California", "F"),
    ];
    for (id, (y, m, d), value, location, gender) in rows {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let tags = TagSet::new()
            .with("location", location)
            .with("gender", gender);
        processor
            .ingest(MetricRecord::new(id, date, "online.spent", value), tags)
            .unwrap();
    }

    build_router(Arc::new(AppState::new(processor, ServerConfig::default())))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

// =============================================================================
// Health & Stats
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get(test_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_stats_endpoint() {
    let (status, body) = get(test_router(), "/api/v1/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"], 4);
    assert_eq!(body["tag_names"], 2);
    assert_eq!(body["tag_values"], 4);
    assert_eq!(body["catalog_filters"], 4);
}

// =============================================================================
// Data Endpoint
// =============================================================================

#[tokio::test]
async fn test_data_monthly_sum() {
    let (status, body) = post_json(
        test_router(),
        "/api/v1/data",
        json!({"filters": ["location:Chicago"], "scale": "Monthly", "aggregator": "Sum"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"timestamp": "2019-03-01T00:00:00Z", "value": 60.0}])
    );
}

#[tokio::test]
async fn test_data_defaults_to_monthly_count() {
    let (status, body) = post_json(test_router(), "/api/v1/data", json!({"filters": []})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"timestamp": "2019-03-01T00:00:00Z", "value": 3.0},
            {"timestamp": "2019-04-01T00:00:00Z", "value": 1.0}
        ])
    );
}

#[tokio::test]
async fn test_data_daily_average() {
    let (status, body) = post_json(
        test_router(),
        "/api/v1/data",
        json!({"filters": ["gender:M", "location:Chicago"], "scale": "Daily", "aggregator": "Avg"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0]["timestamp"], "2019-03-02T00:00:00Z");
    assert_eq!(points[2]["value"], 30.0);
}

#[tokio::test]
async fn test_data_disjoint_filters_are_empty() {
    let (status, body) = post_json(
        test_router(),
        "/api/v1/data",
        json!({"filters": ["location:Chicago", "gender:F"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_data_malformed_filter_is_bad_request() {
    let (status, body) = post_json(
        test_router(),
        "/api/v1/data",
        json!({"filters": ["location"]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("location"));
}

#[tokio::test]
async fn test_data_invalid_body_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/data")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(test_router(), request).await;
    assert!(status.is_client_error());
}

// =============================================================================
// Filters Endpoint
// =============================================================================

#[tokio::test]
async fn test_filters_prefix() {
    let (status, body) = get(test_router(), "/api/v1/filters?query=loc").await;
    assert_eq!(status, StatusCode::OK);

    let mut filters: Vec<String> = serde_json::from_value(body).unwrap();
    filters.sort();
    assert_eq!(filters, vec!["location:California", "location:Chicago"]);
}

#[tokio::test]
async fn test_filters_without_query_lists_all() {
    let (status, body) = get(test_router(), "/api/v1/filters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = get(test_router(), "/api/v1/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
