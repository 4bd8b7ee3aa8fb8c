//! Integration tests for the dashboard HTTP endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use headcount_observer::router::build_router;
use headcount_observer::state::AppState;
use headcount_observer::store::SnapshotStore;
use headcount_types::{DepartmentCount, Snapshot};
use serde_json::Value;
use tower::ServiceExt;

fn sample_snapshot() -> Snapshot {
    Snapshot {
        departments: vec![
            DepartmentCount {
                department: String::from("Engineering"),
                male_count: 50,
                female_count: 30,
                total_count: 80,
            },
            DepartmentCount {
                department: String::from("Arts"),
                male_count: 20,
                female_count: 10,
                total_count: 30,
            },
        ],
        total_alumni: 110,
        male_count: 70,
        female_count: 40,
        last_updated: Some(String::from("2024-05-17 14:03:09")),
    }
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: Arc<AppState>, uri: &str) -> axum::response::Response {
    build_router(state)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let response = get(Arc::new(AppState::default()), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(content_type.contains("text/html"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/api/count"));
    assert!(html.contains("count_update"));
}

#[tokio::test]
async fn test_count_before_first_fetch_is_zeroed() {
    let response = get(Arc::new(AppState::default()), "/api/count").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["departments"], serde_json::json!([]));
    assert_eq!(json["total_alumni"], 0);
    assert_eq!(json["male_count"], 0);
    assert_eq!(json["female_count"], 0);
    assert_eq!(json["last_updated"], Value::Null);
}

#[tokio::test]
async fn test_count_returns_stored_snapshot_verbatim() {
    let store = SnapshotStore::new();
    let state = Arc::new(AppState::new(store.clone()));
    store.replace(sample_snapshot()).await;

    let response = get(state, "/api/count").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, serde_json::to_value(sample_snapshot()).unwrap());
    assert_eq!(json["departments"][0]["department"], "Engineering");
    assert_eq!(json["departments"][1]["total_count"], 30);
}

#[tokio::test]
async fn test_count_is_read_only() {
    let store = SnapshotStore::with_snapshot(sample_snapshot());
    let state = Arc::new(AppState::new(store.clone()));

    let _ = get(Arc::clone(&state), "/api/count").await;
    let _ = get(state, "/api/count").await;

    assert_eq!(store.get().await, sample_snapshot());
}

#[tokio::test]
async fn test_health_reports_status() {
    let store = SnapshotStore::with_snapshot(sample_snapshot());
    let response = get(Arc::new(AppState::new(store)), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["clients"], 0);
    assert_eq!(json["last_updated"], "2024-05-17 14:03:09");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = get(Arc::new(AppState::default()), "/api/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
