//! Timeline authority session
//!
//! One object owns the canonical timeline and the cue engine behind a
//! single lock, and every external mutation goes through it: the HTTP
//! control surface, remote-control WebSocket messages, and the master
//! tick loop. Commands are last-writer-wins; there is no queueing.
//!
//! Each mutation broadcasts a fresh state snapshot, and the tick loop
//! heartbeats one every period regardless, which bounds how far a
//! display can drift between discrete events.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use wallsync_common::cue::{Cue, CueKind};
use wallsync_common::{ClientMessage, ServerMessage};

use crate::broadcast::{ClientRegistry, ClientRole};
use crate::cues::CueEngine;
use crate::timeline::Timeline;

struct Inner {
    timeline: Timeline,
    cues: CueEngine,
}

/// The single writer of timeline state
pub struct TimelineAuthority {
    inner: Mutex<Inner>,
    registry: Arc<ClientRegistry>,
    started_at: Instant,
}

impl TimelineAuthority {
    pub fn new(schedule: Vec<Cue>, registry: Arc<ClientRegistry>) -> Self {
        let now = Instant::now();
        Self {
            inner: Mutex::new(Inner {
                timeline: Timeline::new(now),
                cues: CueEngine::new(schedule),
            }),
            registry,
            started_at: now,
        }
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    fn snapshot(&self, timeline: &Timeline, now: Instant) -> ServerMessage {
        ServerMessage::State {
            playing: timeline.playing(),
            rate: timeline.rate(),
            // playhead at send time, not the stored offset
            offset: timeline.playhead_at(now),
            t0: now.duration_since(self.started_at).as_secs_f64() * 1000.0,
        }
    }

    /// Start playback; no-op (and no broadcast) if already playing
    pub async fn play(&self) {
        let snapshot = {
            let mut inner = self.inner.lock().await;
            let now = Instant::now();
            if !inner.timeline.play_at(now) {
                return;
            }
            info!(playhead = inner.timeline.playhead_at(now), "play");
            self.snapshot(&inner.timeline, now)
        };
        self.registry.send_to(ClientRole::Display, &snapshot).await;
    }

    /// Pause playback; no-op (and no broadcast) if already paused
    pub async fn pause(&self) {
        let snapshot = {
            let mut inner = self.inner.lock().await;
            let now = Instant::now();
            if !inner.timeline.pause_at(now) {
                return;
            }
            info!(playhead = inner.timeline.playhead_at(now), "pause");
            self.snapshot(&inner.timeline, now)
        };
        self.registry.send_to(ClientRole::Display, &snapshot).await;
    }

    /// Seek to a position in seconds; invalid targets clamp to 0
    ///
    /// Resets the cue cursor so cues past the new position can fire
    /// again.
    pub async fn seek(&self, target: f64) {
        let snapshot = {
            let mut inner = self.inner.lock().await;
            let now = Instant::now();
            let clamped = inner.timeline.seek_at(target, now);
            inner.cues.on_seek(clamped);
            info!(time = clamped, "seek");
            self.snapshot(&inner.timeline, now)
        };
        self.registry.send_to(ClientRole::Display, &snapshot).await;
    }

    /// Stop: pause, then rewind to 0
    pub async fn stop(&self) {
        self.pause().await;
        self.seek(0.0).await;
    }

    /// Current playhead in seconds
    pub async fn playhead(&self) -> f64 {
        self.inner.lock().await.timeline.playhead()
    }

    /// (playing, playhead) for the status endpoint
    pub async fn status(&self) -> (bool, f64) {
        let inner = self.inner.lock().await;
        (inner.timeline.playing(), inner.timeline.playhead())
    }

    /// Dispatch one inbound client message
    ///
    /// Remote control mutates the timeline; `ready` and `ack` are
    /// diagnostics with no effect on system behavior.
    pub async fn dispatch(&self, message: ClientMessage) {
        match message {
            ClientMessage::Play => self.play().await,
            ClientMessage::Pause => self.pause().await,
            ClientMessage::Seek { time } => self.seek(time).await,
            ClientMessage::Ready { can_play } => {
                info!(can_play, "client reported ready");
            }
            ClientMessage::Ack {
                target: acked,
                clip_id,
            } => {
                debug!(acked, ?clip_id, "client acknowledged event");
            }
        }
    }

    /// One evaluation of the master tick loop
    ///
    /// Advances the cue engine against the current playhead, delivers
    /// fired cues on the event channel, then heartbeats a state
    /// snapshot to the displays.
    pub async fn tick(&self) {
        let (fired, snapshot) = {
            let mut inner = self.inner.lock().await;
            let now = Instant::now();
            let playhead = inner.timeline.playhead_at(now);
            let fired = inner.cues.tick(playhead);
            (fired, self.snapshot(&inner.timeline, now))
        };

        for cue in fired {
            let event = match (cue.kind, &cue.clip_id) {
                (CueKind::Trigger, Some(clip_id)) => {
                    info!(time = cue.time, clip_id = %clip_id, "cue fired: trigger");
                    ServerMessage::Trigger {
                        clip_id: clip_id.clone(),
                    }
                }
                (CueKind::Trigger, None) => {
                    warn!(time = cue.time, "trigger cue without clipId, skipping");
                    continue;
                }
                (CueKind::Stop, _) => {
                    info!(time = cue.time, "cue fired: stop");
                    ServerMessage::Stop
                }
            };
            self.registry.send_to(ClientRole::Trigger, &event).await;
        }

        self.registry.send_to(ClientRole::Display, &snapshot).await;
    }
}

/// Run the master tick loop until the task is aborted
///
/// A single task drives all authority-side evaluation; missed ticks
/// are skipped, never run concurrently.
pub fn spawn_tick_loop(
    authority: Arc<TimelineAuthority>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            authority.tick().await;
        }
    })
}
