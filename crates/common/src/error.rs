//! Error types for portlens
//!
//! Only conditions that stop a whole scan live here. Failures of a single
//! probe never surface as errors; they turn into a missing observation.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortlensError {
    #[error("Invalid port specification: {0}")]
    InvalidPortSpec(String),

    #[error("Cannot resolve hostname '{0}'")]
    ResolutionFailed(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl PortlensError {
    /// True for errors caused by operator input rather than the environment.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, PortlensError::InvalidPortSpec(_) | PortlensError::Config(_))
    }
}

/// Result type alias for portlens operations
pub type PortlensResult<T> = Result<T, PortlensError>;
