//! Error types for the spool
//!
//! Fallible helpers (listing, reading, decoding, configuration) return
//! `SpoolResult`. The fire-and-forget entry points never surface these to
//! their callers; they report them through a [`DiagnosticSink`] instead.
//!
//! [`DiagnosticSink`]: crate::diagnostics::DiagnosticSink

use std::path::PathBuf;

use thiserror::Error;

/// Result type for spool operations
pub type SpoolResult<T> = Result<T, SpoolError>;

/// Errors that can occur in spool operations
#[derive(Debug, Error)]
pub enum SpoolError {
    /// I/O error while touching the filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Event could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored block is not valid codec output
    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Root directory cannot be created or is not a directory
    #[error("Invalid root directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SpoolError {
    /// Create a new Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
