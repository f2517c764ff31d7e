//! Cue scheduling state machine
//!
//! Each cue moves `Armed → Fired` exactly once during forward
//! playback; seeks re-arm cues ahead of the new position. The engine
//! is pure (no transport, no clock): `tick` reports which cues became
//! due and the caller delivers them.

use std::collections::HashSet;
use wallsync_common::cue::{secs_to_key_ms, Cue, CueKey};

/// Per-cue firing state over a static, ascending schedule
#[derive(Debug)]
pub struct CueEngine {
    /// Schedule, ascending by time, immutable after construction
    cues: Vec<Cue>,

    /// Keys of cues already consumed in the current seek epoch
    fired: HashSet<CueKey>,

    /// Last evaluated playhead value
    last_time: f64,
}

impl CueEngine {
    pub fn new(mut cues: Vec<Cue>) -> Self {
        // evaluation relies on ascending order for early exit
        cues.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            cues,
            fired: HashSet::new(),
            last_time: 0.0,
        }
    }

    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    /// Evaluate the window `(last_time, current]` and consume every
    /// qualifying un-fired cue, in ascending time order.
    ///
    /// A `current` below the cursor is a stale/out-of-order evaluation:
    /// nothing fires. Repeated calls with an unchanged `current` are
    /// no-ops. Returns the cues that fired.
    pub fn tick(&mut self, current: f64) -> Vec<Cue> {
        let last = self.last_time;
        self.last_time = current;

        // Only fire when moving forward
        if current < last {
            return Vec::new();
        }

        let mut due = Vec::new();
        for cue in &self.cues {
            if cue.time <= last {
                continue;
            }
            if cue.time > current {
                break;
            }
            let key = cue.key();
            if self.fired.contains(&key) {
                continue;
            }
            self.fired.insert(key);
            due.push(cue.clone());
        }
        due
    }

    /// Reset the cursor after a seek
    ///
    /// Cues past the new position become re-armable; cues at or before
    /// it stay consumed. A forward seek therefore permanently skips
    /// any un-fired cues it jumps over.
    pub fn on_seek(&mut self, new_time: f64) {
        self.last_time = new_time;
        let cutoff = secs_to_key_ms(new_time);
        self.fired.retain(|key| key.time_ms <= cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallsync_common::cue::CueKind;

    fn trigger(time: f64, clip: &str) -> Cue {
        Cue {
            time,
            kind: CueKind::Trigger,
            clip_id: Some(clip.to_string()),
        }
    }

    fn stop(time: f64) -> Cue {
        Cue {
            time,
            kind: CueKind::Stop,
            clip_id: None,
        }
    }

    fn times(cues: &[Cue]) -> Vec<f64> {
        cues.iter().map(|c| c.time).collect()
    }

    #[test]
    fn test_fires_cue_in_window() {
        let mut engine = CueEngine::new(vec![trigger(10.0, "a")]);
        assert!(engine.tick(9.9).is_empty());
        let fired = engine.tick(10.0);
        assert_eq!(times(&fired), vec![10.0]);
    }

    #[test]
    fn test_fires_all_cues_in_one_window() {
        let mut engine = CueEngine::new(vec![
            trigger(1.0, "a"),
            trigger(2.0, "b"),
            stop(3.0),
            trigger(99.0, "z"),
        ]);
        let fired = engine.tick(5.0);
        assert_eq!(times(&fired), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_repeat_tick_same_time_is_noop() {
        let mut engine = CueEngine::new(vec![trigger(10.0, "a")]);
        let first = engine.tick(10.0);
        assert_eq!(first.len(), 1);
        assert!(engine.tick(10.0).is_empty());
        assert!(engine.tick(10.0).is_empty());
    }

    #[test]
    fn test_backwards_tick_fires_nothing() {
        let mut engine = CueEngine::new(vec![trigger(10.0, "a"), trigger(20.0, "b")]);
        engine.tick(15.0);
        // stale evaluation: no firing, cursor follows input
        assert!(engine.tick(12.0).is_empty());
        assert_eq!(engine.last_time(), 12.0);
    }

    #[test]
    fn test_seek_rearms_later_cues_only() {
        let mut engine = CueEngine::new(vec![trigger(10.0, "a"), trigger(20.0, "b")]);
        let fired = engine.tick(25.0);
        assert_eq!(times(&fired), vec![10.0, 20.0]);

        engine.on_seek(15.0);
        let refired = engine.tick(22.0);
        // t=20 re-fires, t=10 does not
        assert_eq!(times(&refired), vec![20.0]);
    }

    #[test]
    fn test_forward_seek_permanently_skips_unfired_cues() {
        let mut engine = CueEngine::new(vec![trigger(10.0, "a")]);
        engine.tick(5.0);
        engine.on_seek(15.0);

        // jumped past t=10 without firing it; it is never retroactively fired
        assert!(engine.tick(16.0).is_empty());

        // and a later backwards seek re-arms it again
        engine.on_seek(0.0);
        assert_eq!(times(&engine.tick(12.0)), vec![10.0]);
    }

    #[test]
    fn test_cue_at_exact_seek_target_stays_consumed() {
        let mut engine = CueEngine::new(vec![trigger(10.0, "a")]);
        engine.tick(11.0);
        engine.on_seek(10.0);
        // time <= newTime is retained as fired
        assert!(engine.tick(12.0).is_empty());
    }

    #[test]
    fn test_duplicate_schedule_entries_fire_once() {
        let mut engine = CueEngine::new(vec![trigger(10.0, "a"), trigger(10.0, "a")]);
        let fired = engine.tick(11.0);
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn test_empty_schedule() {
        let mut engine = CueEngine::new(Vec::new());
        assert!(engine.tick(100.0).is_empty());
        engine.on_seek(0.0);
        assert!(engine.tick(100.0).is_empty());
    }
}
