//! Error handling for the ngshift engine
//!
//! The public pipeline entry point never fails for business-logic reasons:
//! unresolvable conflicts become `ManualReviewItem`s and per-file I/O failures
//! become `FileError` entries in the result. `NgshiftError` covers the one
//! failure worth propagating with `?` internally — a root scan that cannot
//! start at all.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type used throughout the ngshift engine
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NgshiftError {
    #[error("Scan failed for {root}: {message}")]
    Scan { message: String, root: PathBuf },
}

impl NgshiftError {
    /// Create a new scan error for a root directory
    pub fn scan(message: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self::Scan {
            message: message.into(),
            root: root.into(),
        }
    }
}

/// Result type alias for convenience
pub type NgshiftResult<T> = Result<T, NgshiftError>;
