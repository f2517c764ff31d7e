//! Wallsync display client - main entry point
//!
//! Subscribes to the authority's state channel and keeps a local
//! playback surface converged on the broadcast timeline. The built-in
//! surface is a simulated local clock, which makes this binary a
//! stand-alone soak tester for the synchronization loop; a real
//! display embeds the library and provides its own surface.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallsync_display::client;
use wallsync_display::surface::LocalClockSurface;
use wallsync_display::sync::{SyncConfig, Synchronizer};

/// Command-line arguments for wallsync-display
#[derive(Parser, Debug)]
#[command(name = "wallsync-display")]
#[command(about = "Display-side synchronizer for wallsync")]
#[command(version)]
struct Args {
    /// Authority state-channel URL
    #[arg(
        short,
        long,
        default_value = "ws://127.0.0.1:5174/ws/wall",
        env = "WALLSYNC_SERVER"
    )]
    server: String,

    /// Local evaluation period in milliseconds
    #[arg(long, default_value = "250", env = "WALLSYNC_EVAL_MS")]
    eval_ms: u64,

    /// Paused-position tolerance in seconds
    #[arg(long, default_value = "0.02", env = "WALLSYNC_EPSILON")]
    epsilon: f64,

    /// Drift below this is considered in sync, in seconds
    #[arg(long, default_value = "0.04", env = "WALLSYNC_SOFT_NUDGE")]
    soft_nudge: f64,

    /// Drift above this is corrected by a direct seek, in seconds
    #[arg(long, default_value = "0.12", env = "WALLSYNC_HARD_SNAP")]
    hard_snap: f64,

    /// Rate offset applied while nudging
    #[arg(long, default_value = "0.015", env = "WALLSYNC_NUDGE")]
    nudge: f64,

    /// Simulated local clock skew (fractional; 0.01 runs 1% fast)
    #[arg(long, default_value = "0.0", env = "WALLSYNC_CLOCK_SKEW")]
    clock_skew: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallsync=debug,wallsync_display=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = SyncConfig {
        epsilon: args.epsilon,
        soft_nudge: args.soft_nudge,
        hard_snap: args.hard_snap,
        nudge: args.nudge,
    };
    info!(server = %args.server, ?config, "starting display synchronizer");

    let mut synchronizer = Synchronizer::new(config);
    let mut surface = LocalClockSurface::with_clock_skew(args.clock_skew);

    client::run(
        &args.server,
        &mut synchronizer,
        &mut surface,
        Duration::from_millis(args.eval_ms),
    )
    .await;

    Ok(())
}
