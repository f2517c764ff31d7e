//! Integration tests for the authority HTTP API
//!
//! Exercises the control surface and status query through the router
//! without a live socket.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use wallsync_server::api::{create_router, AppState};
use wallsync_server::broadcast::ClientRegistry;
use wallsync_server::session::TimelineAuthority;

fn setup_test_router() -> (axum::Router, Arc<TimelineAuthority>) {
    let registry = Arc::new(ClientRegistry::new());
    let authority = Arc::new(TimelineAuthority::new(Vec::new(), registry));

    let state = AppState {
        authority: Arc::clone(&authority),
        media_root: None,
        port: 5174,
    };
    (create_router(state), authority)
}

async fn make_request(
    app: &axum::Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_status_starts_paused_at_zero() {
    let (app, _) = setup_test_router();

    let (status, body) = make_request(&app, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playing"], json!(false));
    assert_eq!(body["playhead"].as_f64().unwrap(), 0.0);
    assert_eq!(body["endpoint"], json!("/ws/wall"));
}

#[tokio::test]
async fn test_play_pause_roundtrip() {
    let (app, authority) = setup_test_router();

    let (status, body) =
        make_request(&app, Method::POST, "/api/playback/play", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert!(authority.status().await.0);

    let (status, _) = make_request(&app, Method::POST, "/api/playback/pause", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!authority.status().await.0);
}

#[tokio::test]
async fn test_seek_updates_playhead() {
    let (app, authority) = setup_test_router();

    let (status, _) = make_request(
        &app,
        Method::POST,
        "/api/playback/seek",
        Some(json!({ "time": 5.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!((authority.playhead().await - 5.0).abs() < 0.05);

    let (_, body) = make_request(&app, Method::GET, "/status", None).await;
    assert!((body["playhead"].as_f64().unwrap() - 5.0).abs() < 0.1);
}

#[tokio::test]
async fn test_invalid_seek_targets_clamp_to_zero() {
    let (app, authority) = setup_test_router();
    authority.seek(30.0).await;

    // negative
    let (status, _) = make_request(
        &app,
        Method::POST,
        "/api/playback/seek",
        Some(json!({ "time": -4.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(authority.playhead().await, 0.0);

    // non-numeric
    authority.seek(30.0).await;
    let (status, _) = make_request(
        &app,
        Method::POST,
        "/api/playback/seek",
        Some(json!({ "time": "sideways" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(authority.playhead().await, 0.0);

    // missing entirely
    authority.seek(30.0).await;
    let (status, _) = make_request(
        &app,
        Method::POST,
        "/api/playback/seek",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(authority.playhead().await, 0.0);
}

#[tokio::test]
async fn test_stop_pauses_and_rewinds() {
    let (app, authority) = setup_test_router();
    authority.play().await;
    authority.seek(42.0).await;

    let (status, _) = make_request(&app, Method::POST, "/api/playback/stop", None).await;
    assert_eq!(status, StatusCode::OK);

    let (playing, playhead) = authority.status().await;
    assert!(!playing);
    assert!(playhead.abs() < 0.05);
}
