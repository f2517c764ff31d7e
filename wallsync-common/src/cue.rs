//! Cue schedule model
//!
//! A cue is a one-shot event bound to a timeline position. The
//! schedule is loaded once at startup from a JSON array ordered
//! ascending by time:
//!
//! ```json
//! [
//!   { "time": 12.0, "kind": "trigger", "clipId": "intro" },
//!   { "time": 45.0, "kind": "stop" }
//! ]
//! ```
//!
//! Unknown `kind` values are logged and skipped, never fatal.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::{Error, Result};

/// What a cue does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueKind {
    /// Begin playing a named clip on trigger-capable clients
    Trigger,
    /// Stop/reset triggered playback
    Stop,
}

/// A scheduled one-shot event, immutable after load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Timeline position in seconds
    pub time: f64,

    pub kind: CueKind,

    /// Clip to play (trigger cues only)
    #[serde(rename = "clipId", default, skip_serializing_if = "Option::is_none")]
    pub clip_id: Option<String>,
}

impl Cue {
    /// Identity used to mark this cue instance as consumed
    pub fn key(&self) -> CueKey {
        CueKey {
            time_ms: secs_to_key_ms(self.time),
            kind: self.kind,
            clip_id: self.clip_id.clone(),
        }
    }
}

/// Hashable identity of a fired cue: `(time, kind, clipId)`
///
/// Times are quantized to whole milliseconds so the f64 schedule time
/// can participate in set membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CueKey {
    pub time_ms: i64,
    pub kind: CueKind,
    pub clip_id: Option<String>,
}

/// Quantize a schedule time in seconds to the key's millisecond grid
pub fn secs_to_key_ms(secs: f64) -> i64 {
    (secs * 1000.0).round() as i64
}

/// Raw schedule entry before kind validation
#[derive(Debug, Deserialize)]
struct RawCue {
    time: f64,
    kind: String,
    #[serde(rename = "clipId", default)]
    clip_id: Option<String>,
}

/// Parse a cue schedule from JSON text
///
/// Entries with an unknown kind or a non-finite time are skipped with
/// a warning. Out-of-order input is tolerated and sorted so the
/// engine always fires multiple qualifying cues in ascending order.
pub fn schedule_from_str(raw: &str) -> Result<Vec<Cue>> {
    let entries: Vec<RawCue> = serde_json::from_str(raw)?;

    let mut cues = Vec::with_capacity(entries.len());
    for entry in entries {
        if !entry.time.is_finite() {
            warn!(kind = %entry.kind, "skipping cue with non-finite time");
            continue;
        }
        let kind = match entry.kind.as_str() {
            "trigger" => CueKind::Trigger,
            "stop" => CueKind::Stop,
            other => {
                warn!(kind = %other, time = entry.time, "skipping cue with unknown kind");
                continue;
            }
        };
        cues.push(Cue {
            time: entry.time,
            kind,
            clip_id: entry.clip_id,
        });
    }

    if cues.windows(2).any(|w| w[0].time > w[1].time) {
        warn!("cue schedule not ascending by time; sorting");
        cues.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    Ok(cues)
}

/// Load a cue schedule from a JSON file
pub fn load_schedule(path: &Path) -> Result<Vec<Cue>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("cannot read cue schedule {}: {}", path.display(), e))
    })?;
    schedule_from_str(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_schedule_parses_known_kinds() {
        let cues = schedule_from_str(
            r#"[
                { "time": 12.0, "kind": "trigger", "clipId": "intro" },
                { "time": 45.0, "kind": "stop" }
            ]"#,
        )
        .unwrap();

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].kind, CueKind::Trigger);
        assert_eq!(cues[0].clip_id.as_deref(), Some("intro"));
        assert_eq!(cues[1].kind, CueKind::Stop);
        assert_eq!(cues[1].clip_id, None);
    }

    #[test]
    fn test_unknown_kind_skipped_not_fatal() {
        let cues = schedule_from_str(
            r#"[
                { "time": 1.0, "kind": "trigger", "clipId": "a" },
                { "time": 2.0, "kind": "lasers" },
                { "time": 3.0, "kind": "stop" }
            ]"#,
        )
        .unwrap();

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].time, 1.0);
        assert_eq!(cues[1].time, 3.0);
    }

    #[test]
    fn test_unordered_input_is_sorted() {
        let cues = schedule_from_str(
            r#"[
                { "time": 30.0, "kind": "stop" },
                { "time": 10.0, "kind": "trigger", "clipId": "a" }
            ]"#,
        )
        .unwrap();

        assert_eq!(cues[0].time, 10.0);
        assert_eq!(cues[1].time, 30.0);
    }

    #[test]
    fn test_malformed_schedule_is_an_error() {
        assert!(schedule_from_str("{ not json").is_err());
    }

    #[test]
    fn test_cue_key_identity() {
        let a = Cue {
            time: 10.0,
            kind: CueKind::Trigger,
            clip_id: Some("a".to_string()),
        };
        let b = Cue {
            time: 10.0,
            kind: CueKind::Trigger,
            clip_id: Some("a".to_string()),
        };
        let c = Cue {
            time: 10.0,
            kind: CueKind::Stop,
            clip_id: None,
        };

        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_load_schedule_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[ {{ "time": 5.0, "kind": "trigger", "clipId": "x" }} ]"#
        )
        .unwrap();

        let cues = load_schedule(file.path()).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].clip_id.as_deref(), Some("x"));
    }

    #[test]
    fn test_load_schedule_missing_file() {
        let err = load_schedule(Path::new("/nonexistent/cues.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
