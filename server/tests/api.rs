use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server::{app, config::Config, state::State};
use store::MemoryStore;
use tower::ServiceExt;

fn test_app() -> Router {
    let config = Config {
        port: 0,
        store: None,
    };
    app(State::with_store(config, Arc::new(MemoryStore::new())))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(value) => Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

#[tokio::test]
async fn test_visitor_then_page_visit_scenario() {
    let app = test_app();

    let (status, visitor) = send(
        &app,
        "POST",
        "/api/visitors",
        Some(json!({"email": "a@b.com", "token": "zrch_001"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(visitor["access_count"], 0);
    assert_eq!(visitor["status"], "active");

    let (status, event) = send(
        &app,
        "POST",
        "/api/analytics-events",
        Some(json!({"eventType": "page_visit", "visitorToken": "zrch_001"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["event_type"], "page_visit");

    let (status, listing) = send(&app, "GET", "/api/visitors", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["table"], "visitors");
    assert_eq!(listing["source"], "memory");

    let visitor = listing["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["token"] == "zrch_001")
        .unwrap();
    assert_eq!(visitor["access_count"], 1);
    assert!(!visitor["first_access"].is_null());
    assert!(!visitor["last_access"].is_null());
}

#[tokio::test]
async fn test_event_type_filter_and_limit() {
    let app = test_app();

    for i in 0..3 {
        send(
            &app,
            "POST",
            "/api/analytics-events",
            Some(json!({
                "eventType": "download",
                "visitorToken": format!("zrch_{i}"),
                "data": {"file_type": "teaser"}
            })),
        )
        .await;
    }

    let (status, listing) = send(
        &app,
        "GET",
        "/api/analytics-events?event_type=download&limit=10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let data = listing["data"].as_array().unwrap();
    assert!(data.len() <= 10);
    // Three real downloads plus the one demo download.
    assert_eq!(listing["total"], 4);
    assert!(data.iter().all(|e| e["event_type"] == "download"));
}

#[tokio::test]
async fn test_analytics_alias_route() {
    let app = test_app();

    let (status, listing) = send(&app, "GET", "/api/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["table"], "analytics");
    assert_eq!(listing["demo_count"], 4);
    assert_eq!(listing["source"], "memory");
}

#[tokio::test]
async fn test_unconfigured_listings_report_memory_source() {
    let app = test_app();

    let (_, visitors) = send(&app, "GET", "/api/visitors", None).await;
    assert_eq!(visitors["source"], "memory");

    let (_, analytics) = send(&app, "GET", "/api/analytics-events", None).await;
    assert_eq!(analytics["source"], "memory");
    assert_eq!(analytics["demo_count"], 4);
    assert_eq!(analytics["real_count"], 0);
}

#[tokio::test]
async fn test_malformed_body_is_recovered() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/visitors")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{definitely not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let visitor: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(visitor["email"], "");
    assert_eq!(visitor["status"], "active");
}

#[tokio::test]
async fn test_unmatched_route_is_json_404() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
    assert_eq!(body["path"], "/api/nope");
}

#[tokio::test]
async fn test_options_is_always_ok() {
    let app = test_app();

    let (status, _) = send(&app, "OPTIONS", "/api/visitors", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "OPTIONS", "/api/does-not-exist", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_pagination_window() {
    let app = test_app();

    for i in 1..=9 {
        send(
            &app,
            "POST",
            "/api/analytics-events",
            Some(json!({
                "eventType": "cta_click",
                "visitorToken": "zrch_001",
                "timestamp": format!("2025-07-0{i}T00:00:00Z")
            })),
        )
        .await;
    }

    let (_, page2) = send(
        &app,
        "GET",
        "/api/analytics-events?event_type=cta_click&page=2&limit=4",
        None,
    )
    .await;

    assert_eq!(page2["total"], 9);
    assert_eq!(page2["page"], 2);
    assert_eq!(page2["limit"], 4);
    let data = page2["data"].as_array().unwrap();
    assert_eq!(data.len(), 4);
    // Newest first: page 2 starts at the 5th most recent.
    assert_eq!(data[0]["timestamp"], "2025-07-05T00:00:00Z");
}
