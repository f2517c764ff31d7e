//! Master timeline clock
//!
//! Stores `playing`, `rate`, `offset` and the monotonic epoch start;
//! the playhead is derived from those on demand:
//!
//! - paused:  `playhead = offset`
//! - playing: `playhead = offset + rate * (now - epoch_start)`
//!
//! The timeline has a single writer (the authority session) and is
//! never persisted. All mutators take an explicit `now` so tests can
//! drive the clock deterministically; `Instant::now()` convenience
//! wrappers exist for the live path.

use std::time::Instant;

/// Canonical playback state
#[derive(Debug, Clone, Copy)]
pub struct Timeline {
    playing: bool,
    rate: f64,
    offset: f64,
    epoch_start: Instant,
}

impl Timeline {
    /// New timeline, paused at offset 0
    pub fn new(now: Instant) -> Self {
        Self {
            playing: false,
            rate: 1.0,
            offset: 0.0,
            epoch_start: now,
        }
    }

    pub fn playing(&self) -> bool {
        self.playing
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Current playhead in seconds; pure with respect to state
    pub fn playhead_at(&self, now: Instant) -> f64 {
        if !self.playing {
            return self.offset;
        }
        let dt = now.saturating_duration_since(self.epoch_start).as_secs_f64();
        self.offset + dt * self.rate
    }

    pub fn playhead(&self) -> f64 {
        self.playhead_at(Instant::now())
    }

    /// Start playback; no-op if already playing
    ///
    /// Returns true if the state changed.
    pub fn play_at(&mut self, now: Instant) -> bool {
        if self.playing {
            return false;
        }
        self.epoch_start = now;
        self.playing = true;
        true
    }

    pub fn play(&mut self) -> bool {
        self.play_at(Instant::now())
    }

    /// Pause playback, freezing the playhead; no-op if already paused
    ///
    /// Returns true if the state changed.
    pub fn pause_at(&mut self, now: Instant) -> bool {
        if !self.playing {
            return false;
        }
        self.offset = self.playhead_at(now);
        self.playing = false;
        true
    }

    pub fn pause(&mut self) -> bool {
        self.pause_at(Instant::now())
    }

    /// Seek to a position in seconds, regardless of play state
    ///
    /// Non-finite and negative targets clamp to 0. Returns the
    /// clamped position.
    pub fn seek_at(&mut self, target: f64, now: Instant) -> f64 {
        let target = if target.is_finite() { target.max(0.0) } else { 0.0 };
        self.offset = target;
        self.epoch_start = now;
        target
    }

    pub fn seek(&mut self, target: f64) -> f64 {
        self.seek_at(target, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_starts_paused_at_zero() {
        let now = Instant::now();
        let timeline = Timeline::new(now);
        assert!(!timeline.playing());
        assert_eq!(timeline.playhead_at(now), 0.0);
        assert_eq!(timeline.playhead_at(now + secs(100.0)), 0.0);
    }

    #[test]
    fn test_playhead_advances_while_playing() {
        let now = Instant::now();
        let mut timeline = Timeline::new(now);
        timeline.play_at(now);

        let p = timeline.playhead_at(now + secs(2.0));
        assert!((p - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_playhead_monotonic_while_playing() {
        let now = Instant::now();
        let mut timeline = Timeline::new(now);
        timeline.play_at(now);

        let read1 = timeline.playhead_at(now + secs(1.0));
        let read2 = timeline.playhead_at(now + secs(1.5));
        assert!(read2 >= read1);
    }

    #[test]
    fn test_pause_freezes_playhead() {
        let now = Instant::now();
        let mut timeline = Timeline::new(now);
        timeline.play_at(now);
        timeline.pause_at(now + secs(3.0));

        assert!(!timeline.playing());
        assert!((timeline.playhead_at(now + secs(10.0)) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_play_is_idempotent() {
        let now = Instant::now();
        let mut timeline = Timeline::new(now);
        assert!(timeline.play_at(now));

        // A second play() later must not reset the epoch
        assert!(!timeline.play_at(now + secs(5.0)));
        let p = timeline.playhead_at(now + secs(6.0));
        assert!((p - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let now = Instant::now();
        let mut timeline = Timeline::new(now);
        timeline.play_at(now);
        assert!(timeline.pause_at(now + secs(2.0)));
        assert!(!timeline.pause_at(now + secs(4.0)));
        assert!((timeline.offset() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_seek_while_playing() {
        let now = Instant::now();
        let mut timeline = Timeline::new(now);
        timeline.play_at(now);
        timeline.seek_at(50.0, now + secs(10.0));

        assert!(timeline.playing());
        assert!((timeline.playhead_at(now + secs(10.0)) - 50.0).abs() < 1e-9);
        // subsequent reads grow from 50
        assert!((timeline.playhead_at(now + secs(11.0)) - 51.0).abs() < 1e-9);
    }

    #[test]
    fn test_seek_while_paused() {
        let now = Instant::now();
        let mut timeline = Timeline::new(now);
        timeline.seek_at(5.0, now);
        assert!((timeline.playhead_at(now + secs(60.0)) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_seek_clamps_invalid_targets() {
        let now = Instant::now();
        let mut timeline = Timeline::new(now);

        assert_eq!(timeline.seek_at(-12.0, now), 0.0);
        assert_eq!(timeline.seek_at(f64::NAN, now), 0.0);
        assert_eq!(timeline.seek_at(f64::INFINITY, now), 0.0);
        assert_eq!(timeline.playhead_at(now), 0.0);
    }

    #[test]
    fn test_playhead_never_negative() {
        let now = Instant::now();
        let mut timeline = Timeline::new(now);
        timeline.seek_at(-100.0, now);
        timeline.play_at(now);
        // even when asked about an instant before the epoch
        assert!(timeline.playhead_at(now - secs(0.0)) >= 0.0);
        assert!(timeline.playhead_at(now + secs(1.0)) >= 0.0);

        timeline.pause_at(now + secs(1.0));
        assert!(timeline.playhead_at(now + secs(2.0)) >= 0.0);
    }

    #[test]
    fn test_playback_at_double_rate() {
        let now = Instant::now();
        let mut timeline = Timeline {
            playing: false,
            rate: 2.0,
            offset: 0.0,
            epoch_start: now,
        };
        timeline.play_at(now);
        assert!((timeline.playhead_at(now + secs(3.0)) - 6.0).abs() < 1e-9);
    }
}
