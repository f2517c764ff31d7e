//! Wallsync display client library
//!
//! One instance runs per display surface. It holds the last received
//! timeline snapshot and continuously reconciles a local playback
//! surface against the authority-derived target position:
//! - `sync`: snapshot store and tiered drift correction
//! - `surface`: the playback-surface seam and a simulated surface
//! - `client`: WebSocket connection loop with auto-reconnect

pub mod client;
pub mod surface;
pub mod sync;

pub use surface::{LocalClockSurface, PlaybackSurface, SurfaceError};
pub use sync::{Correction, Snapshot, SyncConfig, Synchronizer};
