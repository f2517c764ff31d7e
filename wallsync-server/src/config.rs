//! Configuration for the wallsync authority server
//!
//! A minimal TOML bootstrap config: port, cue schedule path, media
//! root, tick rate, logging. Runtime state (the timeline) is never
//! persisted, so there is no database tier.
//!
//! Settings sources priority:
//! 1. Command-line arguments
//! 2. Environment variables (via clap `env` fallbacks)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bootstrap configuration loaded from a TOML file
///
/// These settings cannot change during runtime; restart to pick up
/// changes.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP/WebSocket server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the JSON cue schedule
    #[serde(default)]
    pub cues_path: Option<PathBuf>,

    /// Root folder for static media, mounted at /media when set
    #[serde(default)]
    pub media_root: Option<PathBuf>,

    /// Master tick rate in Hz; drives cue evaluation and the state
    /// heartbeat. Must keep heartbeat period well under the clients'
    /// hard-snap threshold.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cues_path: None,
            media_root: None,
            tick_hz: default_tick_hz(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_port() -> u16 {
    5174
}

fn default_tick_hz() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("invalid config: {e}")))
    }

    /// Period of the master tick loop
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz.max(1)))
    }
}
