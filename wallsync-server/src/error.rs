//! Error types for the wallsync authority server

use thiserror::Error;

/// Main error type for the authority server
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors bubbled up from the shared library (schedule load, protocol)
    #[error(transparent)]
    Common(#[from] wallsync_common::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using the server Error
pub type Result<T> = std::result::Result<T, Error>;
