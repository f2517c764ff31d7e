//! Drift-correcting reconciliation
//!
//! The synchronizer keeps the last received timeline snapshot and, on
//! every evaluation, steers the local surface toward the target
//! position with tiered corrections:
//!
//! - beyond `hard_snap`: seek directly to the target (visible jump,
//!   bounds maximum divergence)
//! - between `soft_nudge` and `hard_snap`: run slightly slow/fast to
//!   converge imperceptibly
//! - within `soft_nudge`: considered in sync, nominal rate
//!
//! Evaluation is idempotent and tolerates a surface that is not ready
//! yet: that is a transient no-op retried next time, not an error.

use std::time::Instant;
use tracing::{debug, info, warn};

use crate::surface::PlaybackSurface;

/// Correction thresholds, in seconds except `nudge`
///
/// Deployment-tunable: network latency and display hardware variance
/// may justify different values, so these are a configuration surface
/// rather than constants.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// Paused-position tolerance before hard-setting
    pub epsilon: f64,
    /// Drift considered in sync below this
    pub soft_nudge: f64,
    /// Drift corrected by a direct seek above this
    pub hard_snap: f64,
    /// Rate offset applied while nudging (rate = 1.0 ± nudge)
    pub nudge: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.02,
            soft_nudge: 0.04,
            hard_snap: 0.12,
            nudge: 0.015,
        }
    }
}

/// Last received authority state plus local receipt time
#[derive(Debug, Clone, Copy)]
pub struct Snapshot {
    pub playing: bool,
    pub rate: f64,
    pub offset: f64,
    pub received_at: Instant,
}

/// What one evaluation did to the surface
#[derive(Debug, Clone, PartialEq)]
pub enum Correction {
    /// No snapshot received yet
    NoSnapshot,
    /// Surface not ready; retried next evaluation
    NotReady,
    /// Surface refused to start; status string, retried next evaluation
    Rejected { status: String },
    /// Paused and already within tolerance
    PausedAligned,
    /// Paused, position hard-set to the target
    PausedSnapped { to: f64 },
    /// Playing, position hard-set to the target
    Snapped { to: f64 },
    /// Playing, rate-adjusted to converge
    Nudged { rate: f64 },
    /// Playing within tolerance at nominal rate
    InSync,
}

/// Per-display reconciliation state
#[derive(Debug)]
pub struct Synchronizer {
    config: SyncConfig,
    snapshot: Option<Snapshot>,
}

impl Synchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            snapshot: None,
        }
    }

    /// Record a received state snapshot, superseding any previous one
    pub fn on_state(&mut self, playing: bool, rate: f64, offset: f64, received_at: Instant) {
        self.snapshot = Some(Snapshot {
            playing,
            rate,
            offset,
            received_at,
        });
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Authority-derived target position at `now`, if known
    pub fn target_at(&self, now: Instant) -> Option<f64> {
        let snap = self.snapshot.as_ref()?;
        if !snap.playing {
            return Some(snap.offset);
        }
        let elapsed = now.saturating_duration_since(snap.received_at).as_secs_f64();
        Some(snap.offset + snap.rate * elapsed)
    }

    /// Reconcile the surface against the current target
    pub fn evaluate<S: PlaybackSurface>(&self, surface: &mut S, now: Instant) -> Correction {
        let Some(snap) = self.snapshot.as_ref() else {
            return Correction::NoSnapshot;
        };
        if !surface.ready() {
            return Correction::NotReady;
        }

        if !snap.playing {
            let target = snap.offset;
            if !surface.paused() {
                surface.pause();
            }
            let local = surface.position();
            let snapped = (local - target).abs() > self.config.epsilon;
            if snapped {
                surface.set_position(target);
            }
            surface.set_rate(1.0);
            return if snapped {
                Correction::PausedSnapped { to: target }
            } else {
                Correction::PausedAligned
            };
        }

        let elapsed = now.saturating_duration_since(snap.received_at).as_secs_f64();
        let target = snap.offset + snap.rate * elapsed;

        if surface.paused() {
            if let Err(e) = surface.play() {
                return Correction::Rejected { status: e.0 };
            }
        }

        let drift = surface.position() - target;

        if drift.abs() > self.config.hard_snap {
            surface.set_position(target);
            surface.set_rate(1.0);
            Correction::Snapped { to: target }
        } else if drift.abs() > self.config.soft_nudge {
            // run slow when ahead, fast when behind
            let rate = if drift > 0.0 {
                1.0 - self.config.nudge
            } else {
                1.0 + self.config.nudge
            };
            surface.set_rate(rate);
            Correction::Nudged { rate }
        } else {
            surface.set_rate(1.0);
            Correction::InSync
        }
    }
}

/// Log one correction at an appropriate level
pub fn log_correction(correction: &Correction) {
    match correction {
        Correction::NoSnapshot | Correction::PausedAligned | Correction::InSync => {}
        Correction::NotReady => debug!("surface not ready, skipping evaluation"),
        Correction::Rejected { status } => warn!(status, "surface rejected playback start"),
        Correction::PausedSnapped { to } | Correction::Snapped { to } => {
            info!(to, "hard snap");
        }
        Correction::Nudged { rate } => debug!(rate, "soft nudge"),
    }
}
