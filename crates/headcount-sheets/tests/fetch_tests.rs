//! Integration tests for the sheet fetcher.
//!
//! A local Axum server stands in for the spreadsheet export host so the
//! full request, status handling and CSV decoding path is exercised.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::Router;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use headcount_sheets::{FetchError, RowSource, SheetFetcher, SheetSource, extract};
use tokio::net::TcpListener;

const LIVE_CSV: &str = "\"Department\",\"Male\",\"Female\",\"Total\"\n\
\"Engineering\",\"50\",\"30\",\"80\"\n\
\"Arts\",\"20\",\"10\",\"30\"\n\
\"\",\"\",\"\",\"\"\n";

const FIRST_TAB_CSV: &str = "Department,Male,Female,Total\nLaw,N/A,5,5\n";

async fn gviz(
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if id != "sheet-1" {
        return (StatusCode::NOT_FOUND, String::new());
    }
    match (params.get("tqx").map(String::as_str), params.get("sheet").map(String::as_str)) {
        (Some("out:csv"), Some("LIVE COUNT")) => (StatusCode::OK, LIVE_CSV.to_owned()),
        _ => (StatusCode::BAD_REQUEST, String::from("unknown sheet")),
    }
}

async fn export(Path(id): Path<String>) -> impl IntoResponse {
    if id == "sheet-1" {
        (StatusCode::OK, FIRST_TAB_CSV.to_owned())
    } else {
        (StatusCode::NOT_FOUND, String::new())
    }
}

async fn broken() -> impl IntoResponse {
    (StatusCode::OK, "Department\n\"never closed\n")
}

async fn spawn_export_host() -> SocketAddr {
    let router = Router::new()
        .route("/spreadsheets/d/{id}/gviz/tq", get(gviz))
        .route("/spreadsheets/d/{id}/export", get(export))
        .route("/spreadsheets/d/broken/export", get(broken));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn share_url(id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{id}/edit?usp=sharing")
}

#[tokio::test]
async fn fetches_named_tab_and_drops_empty_rows() {
    let addr = spawn_export_host().await;
    let fetcher = SheetFetcher::new(&format!("http://{addr}"), None).unwrap();

    let rows = fetcher
        .fetch(&share_url("sheet-1"), Some("LIVE COUNT"))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    let snap = extract(&rows);
    assert_eq!(snap.total_alumni, 110);
    assert_eq!(snap.male_count, 70);
    assert_eq!(snap.female_count, 40);
}

#[tokio::test]
async fn fetches_first_tab_without_name() {
    let addr = spawn_export_host().await;
    let fetcher = SheetFetcher::new(&format!("http://{addr}"), None).unwrap();
    let source = SheetSource::new(fetcher, share_url("sheet-1"), None);

    let rows = source.fetch_rows().await.unwrap();
    assert_eq!(rows, vec![vec!["Law", "N/A", "5", "5"]]);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let addr = spawn_export_host().await;
    let fetcher = SheetFetcher::new(&format!("http://{addr}"), None).unwrap();

    let err = fetcher
        .fetch(&share_url("missing"), Some("LIVE COUNT"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));

    let err = fetcher
        .fetch(&share_url("sheet-1"), Some("Other Tab"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 400, .. }));
}

#[tokio::test]
async fn malformed_payload_is_a_parse_error() {
    let addr = spawn_export_host().await;
    let fetcher = SheetFetcher::new(&format!("http://{addr}"), None).unwrap();

    let err = fetcher.fetch(&share_url("broken"), None).await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn unreachable_host_is_a_request_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = SheetFetcher::new(&format!("http://{addr}"), None).unwrap();
    let err = fetcher.fetch(&share_url("sheet-1"), None).await.unwrap_err();
    assert!(matches!(err, FetchError::Request { .. }));
}
