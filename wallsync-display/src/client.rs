//! WebSocket client loop
//!
//! Connects to the authority's state channel, feeds snapshots into
//! the synchronizer, and evaluates on every receipt plus an
//! independent local timer (local media clocks drift between
//! snapshots). Connections are retried forever with a fixed backoff;
//! a presentation must survive the authority restarting.

use std::time::{Duration, Instant};

use futures::StreamExt;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};
use wallsync_common::{ProtocolError, ServerMessage};

use crate::surface::PlaybackSurface;
use crate::sync::{log_correction, Synchronizer};

/// Delay between reconnection attempts
pub const RECONNECT_DELAY: Duration = Duration::from_millis(800);

/// Run the synchronizer against the authority at `url` until the task
/// is cancelled. `url` points at the state channel, e.g.
/// `ws://host:5174/ws/wall`.
pub async fn run<S: PlaybackSurface>(
    url: &str,
    synchronizer: &mut Synchronizer,
    surface: &mut S,
    eval_period: Duration,
) {
    loop {
        match connect_async(url).await {
            Ok((stream, _)) => {
                info!(url, "connected to authority");
                drive(stream, synchronizer, surface, eval_period).await;
                warn!("connection lost, reconnecting");
            }
            Err(e) => {
                warn!(url, "connect failed: {e}");
            }
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn drive<S, T>(
    stream: tokio_tungstenite::WebSocketStream<T>,
    synchronizer: &mut Synchronizer,
    surface: &mut S,
    eval_period: Duration,
) where
    S: PlaybackSurface,
    T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let (_write, mut read) = stream.split();

    let mut interval = tokio::time::interval(eval_period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            frame = read.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        handle_text(&text, synchronizer);
                        evaluate(synchronizer, surface);
                    }
                    Some(Ok(WsMessage::Close(_))) | None => return,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("websocket error: {e}");
                        return;
                    }
                }
            }
            _ = interval.tick() => {
                evaluate(synchronizer, surface);
            }
        }
    }
}

fn handle_text(text: &str, synchronizer: &mut Synchronizer) {
    match ServerMessage::from_json(text) {
        Ok(ServerMessage::State {
            playing,
            rate,
            offset,
            ..
        }) => {
            synchronizer.on_state(playing, rate, offset, Instant::now());
        }
        Ok(other) => {
            debug!(?other, "ignoring message on state channel");
        }
        Err(ProtocolError::Malformed) => {
            debug!("dropping malformed message");
        }
        Err(ProtocolError::Unrecognized(kind)) => {
            warn!(kind, "ignoring unrecognized message type");
        }
    }
}

fn evaluate<S: PlaybackSurface>(synchronizer: &Synchronizer, surface: &mut S) {
    let now = Instant::now();
    surface.poll(now);
    let correction = synchronizer.evaluate(surface, now);
    log_correction(&correction);
}
