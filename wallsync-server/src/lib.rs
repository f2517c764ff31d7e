//! Wallsync authority server library
//!
//! Exposes the synchronization core for integration testing:
//! - `timeline`: master timeline clock
//! - `cues`: one-shot cue scheduling state machine
//! - `broadcast`: client registry and best-effort fan-out
//! - `session`: the timeline authority object and tick loop
//! - `api`: HTTP and WebSocket surface
//! - `config`: TOML bootstrap configuration

pub mod api;
pub mod broadcast;
pub mod config;
pub mod cues;
pub mod error;
pub mod session;
pub mod timeline;

pub use error::{Error, Result};
