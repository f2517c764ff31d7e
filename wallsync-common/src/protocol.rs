//! Wire protocol for the wallsync message channels
//!
//! Two logical channels are carried over each persistent WebSocket
//! connection: a periodic state stream (authority → display clients)
//! and a one-shot event stream (authority → trigger-capable clients).
//! Messages are JSON objects tagged by a `type` field.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Messages sent from the authority to connected clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Greeting sent when a trigger-capable client connects
    Hello {
        /// WebSocket endpoint path the client is attached to
        endpoint: String,
    },

    /// Timeline state snapshot
    ///
    /// `offset` is the playhead at send time; `t0` is the authority's
    /// send timestamp in monotonic milliseconds (diagnostic only —
    /// clients derive elapsed time from their own receipt clock).
    State {
        playing: bool,
        rate: f64,
        offset: f64,
        t0: f64,
    },

    /// Begin playing a named clip (one-shot, best-effort)
    Trigger {
        #[serde(rename = "clipId")]
        clip_id: String,
    },

    /// Stop/reset triggered playback immediately
    Stop,
}

/// Messages sent from clients to the authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Remote control: start playback
    Play,

    /// Remote control: pause playback
    Pause,

    /// Remote control: seek to a position in seconds
    ///
    /// A missing `time` deserializes to 0.0, matching the authority's
    /// clamp-to-zero policy for invalid seek targets.
    Seek {
        #[serde(default)]
        time: f64,
    },

    /// Client readiness report (playback unlocked on the device)
    Ready {
        #[serde(rename = "canPlay", default)]
        can_play: bool,
    },

    /// Diagnostic acknowledgment of a received one-shot event
    ///
    /// Non-binding: the authority logs it and nothing else.
    Ack {
        #[serde(rename = "for")]
        target: String,

        #[serde(rename = "clipId", default, skip_serializing_if = "Option::is_none")]
        clip_id: Option<String>,
    },
}

/// Inbound message parse failure classification
///
/// Malformed JSON is dropped silently; a well-formed object with an
/// unrecognized `type` is logged and ignored. The two cases carry
/// different policies, so the parser distinguishes them.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    #[error("malformed message")]
    Malformed,

    #[error("unrecognized message type: {0:?}")]
    Unrecognized(String),
}

fn parse_tagged<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|_| ProtocolError::Malformed)?;
    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string();
    serde_json::from_value(value).map_err(|_| ProtocolError::Unrecognized(kind))
}

impl ServerMessage {
    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        parse_tagged(raw)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl ClientMessage {
    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        parse_tagged(raw)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
