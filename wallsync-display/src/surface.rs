//! Playback surface seam
//!
//! The actual display (window creation, media decode, rendering) is
//! an external collaborator; the synchronizer only needs a narrow
//! control interface over it. Media readiness is inherently
//! asynchronous, so the surface is polled, never awaited, and may
//! refuse to start (autoplay-style rejection) with a status string.

use std::time::Instant;
use thiserror::Error;

/// A playback start was refused by the surface
///
/// Carries a human-readable status; the synchronizer surfaces it and
/// retries on the next evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("playback surface rejected start: {0}")]
pub struct SurfaceError(pub String);

/// Control interface over one local playback surface
pub trait PlaybackSurface {
    /// Whether the surface can accept position/rate commands yet
    fn ready(&self) -> bool;

    fn paused(&self) -> bool;

    /// Locally observed playback position in seconds
    fn position(&self) -> f64;

    /// Start/resume playback; may be rejected transiently
    fn play(&mut self) -> Result<(), SurfaceError>;

    fn pause(&mut self);

    /// Hard-set the playback position (a visible jump)
    fn set_position(&mut self, position: f64);

    /// Adjust the playback rate (1.0 = nominal)
    fn set_rate(&mut self, rate: f64);

    /// Give the surface a chance to observe the passage of time and
    /// finish pending loading; called once per evaluation.
    fn poll(&mut self, _now: Instant) {}
}

/// Simulated playback surface driven by its own local clock
///
/// Stands in for a real media element: position advances at the
/// configured rate (optionally skewed, like a drifting hardware
/// clock) between polls. Used by the binary for soak testing and by
/// the reconciliation tests.
#[derive(Debug)]
pub struct LocalClockSurface {
    ready: bool,
    paused: bool,
    rate: f64,
    position: f64,
    /// Fractional local-clock error; 0.01 runs 1% fast
    clock_skew: f64,
    last_poll: Option<Instant>,
    reject_play: Option<String>,
}

impl LocalClockSurface {
    pub fn new() -> Self {
        Self {
            ready: true,
            paused: true,
            rate: 1.0,
            position: 0.0,
            clock_skew: 0.0,
            last_poll: None,
            reject_play: None,
        }
    }

    pub fn with_clock_skew(skew: f64) -> Self {
        Self {
            clock_skew: skew,
            ..Self::new()
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Simulate a surface that has not finished loading
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Simulate autoplay-style rejection of `play()`
    pub fn set_reject_play(&mut self, status: Option<String>) {
        self.reject_play = status;
    }
}

impl Default for LocalClockSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSurface for LocalClockSurface {
    fn ready(&self) -> bool {
        self.ready
    }

    fn paused(&self) -> bool {
        self.paused
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn play(&mut self) -> Result<(), SurfaceError> {
        if let Some(status) = &self.reject_play {
            return Err(SurfaceError(status.clone()));
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn set_position(&mut self, position: f64) {
        self.position = position.max(0.0);
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn poll(&mut self, now: Instant) {
        let last = self.last_poll.replace(now);
        if self.paused {
            return;
        }
        if let Some(last) = last {
            let dt = now.saturating_duration_since(last).as_secs_f64();
            self.position += dt * self.rate * (1.0 + self.clock_skew);
        }
    }
}
