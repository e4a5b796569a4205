//! Error types for tracecamp-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tracecamp-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Trace directory missing or not a directory
    #[error("trace directory not found: {}", .0.display())]
    TraceDirMissing(PathBuf),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Trace file server error
    #[error("server error: {0}")]
    Server(String),
}

/// Result type alias for tracecamp-core
pub type Result<T> = std::result::Result<T, Error>;
