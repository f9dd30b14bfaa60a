//! Error types for HEAD operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing HEAD.
#[derive(Debug, Error)]
pub enum RefError {
    /// The HEAD file holds something other than a fingerprint.
    #[error("invalid HEAD at {}: {reason}", .path.display())]
    InvalidHead { path: PathBuf, reason: String },

    /// I/O error during file-based operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for HEAD operations.
pub type Result<T> = std::result::Result<T, RefError>;
