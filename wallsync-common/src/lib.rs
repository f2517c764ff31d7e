//! # Wallsync Common Library
//!
//! Shared code for the wallsync authority and display clients:
//! - Wire protocol message types (tagged JSON enums)
//! - Cue schedule model and loader
//! - Common error types

pub mod cue;
pub mod error;
pub mod protocol;

pub use cue::{Cue, CueKey, CueKind};
pub use error::{Error, Result};
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
