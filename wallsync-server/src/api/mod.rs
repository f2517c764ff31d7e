//! HTTP and WebSocket surface for the authority
//!
//! - `GET /status` — read-only status
//! - `POST /api/playback/{play,pause,stop,seek}` — the local control
//!   surface, the only external mutators of timeline state
//! - `GET /ws/wall` — display clients (state channel)
//! - `GET /ws/trigger` — trigger-capable clients (event channel)
//! - `/media/*` — optional static media mount

pub mod ws;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::session::TimelineAuthority;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Timeline authority session
    pub authority: Arc<TimelineAuthority>,
    /// Root folder for static media, if configured
    pub media_root: Option<PathBuf>,
    /// Server port
    pub port: u16,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/status", get(status))
        .route("/api/playback/play", post(play))
        .route("/api/playback/pause", post(pause))
        .route("/api/playback/stop", post(stop))
        .route("/api/playback/seek", post(seek))
        .route("/ws/wall", get(ws::wall_handler))
        .route("/ws/trigger", get(ws::trigger_handler));

    if let Some(media_root) = &state.media_root {
        router = router.nest_service("/media", ServeDir::new(media_root));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Read-only status query
async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (playing, playhead) = state.authority.status().await;
    Json(json!({
        "playing": playing,
        "playhead": playhead,
        "endpoint": ws::WALL_ENDPOINT,
        "port": state.port,
        "version": env!("CARGO_PKG_VERSION"),
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn play(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.authority.play().await;
    Json(json!({ "ok": true }))
}

async fn pause(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.authority.pause().await;
    Json(json!({ "ok": true }))
}

async fn stop(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.authority.stop().await;
    Json(json!({ "ok": true }))
}

/// Seek to `{"time": seconds}`
///
/// A missing or non-numeric `time` clamps to 0 rather than erroring,
/// so the body is read loosely instead of through a typed extractor.
async fn seek(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    let time = body.get("time").and_then(|t| t.as_f64()).unwrap_or(0.0);
    state.authority.seek(time).await;
    Json(json!({ "ok": true }))
}
