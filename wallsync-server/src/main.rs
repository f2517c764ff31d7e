//! Wallsync authority server - main entry point
//!
//! Owns the master timeline, evaluates the cue schedule, and fans
//! state snapshots and one-shot events out to connected display and
//! trigger clients over WebSocket.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallsync_server::api::{self, AppState};
use wallsync_server::broadcast::ClientRegistry;
use wallsync_server::config::TomlConfig;
use wallsync_server::session::{spawn_tick_loop, TimelineAuthority};

/// Command-line arguments for wallsync-server
#[derive(Parser, Debug)]
#[command(name = "wallsync-server")]
#[command(about = "Synchronized playback authority for wallsync")]
#[command(version)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "WALLSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "WALLSYNC_PORT")]
    port: Option<u16>,

    /// Path to the JSON cue schedule (overrides config)
    #[arg(long, env = "WALLSYNC_CUES")]
    cues: Option<PathBuf>,

    /// Root folder for static media, mounted at /media (overrides config)
    #[arg(long, env = "WALLSYNC_MEDIA_ROOT")]
    media_root: Option<PathBuf>,

    /// Master tick rate in Hz (overrides config)
    #[arg(long, env = "WALLSYNC_TICK_HZ")]
    tick_hz: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallsync=debug,wallsync_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TomlConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TomlConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(cues) = args.cues {
        config.cues_path = Some(cues);
    }
    if let Some(media_root) = args.media_root {
        config.media_root = Some(media_root);
    }
    if let Some(tick_hz) = args.tick_hz {
        config.tick_hz = tick_hz;
    }

    info!("Starting wallsync authority on port {}", config.port);

    let schedule = match &config.cues_path {
        Some(path) => {
            let cues = wallsync_common::cue::load_schedule(path)
                .with_context(|| format!("failed to load cue schedule {}", path.display()))?;
            info!("Loaded {} cues from {}", cues.len(), path.display());
            cues
        }
        None => {
            warn!("No cue schedule configured; running with an empty schedule");
            Vec::new()
        }
    };

    let registry = Arc::new(ClientRegistry::new());
    let authority = Arc::new(TimelineAuthority::new(schedule, registry));

    // Single-threaded cooperative tick loop: cue evaluation + heartbeat
    let tick_task = spawn_tick_loop(Arc::clone(&authority), config.tick_period());
    info!("Master tick loop running at {} Hz", config.tick_hz);

    if let Some(media_root) = &config.media_root {
        info!("Serving media from {}", media_root.display());
    }

    let app_state = AppState {
        authority,
        media_root: config.media_root.clone(),
        port: config.port,
    };
    let app = api::create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tick_task.abort();
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
