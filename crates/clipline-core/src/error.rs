//! Error types shared across the Clipline crates.

use std::fmt;
use thiserror::Error;

/// Main error type for Clipline operations.
#[derive(Error, Debug)]
pub enum CliplineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A source's duration could not be determined within the bounded wait.
    /// Callers substitute the documented fallback instead of surfacing this.
    #[error("duration unknown for source '{0}'")]
    DurationUnknown(String),

    /// An operation referenced a clip id that is not in the model.
    #[error("clip not found: {0}")]
    ClipNotFound(uuid::Uuid),

    /// A resize, trim, or cut request whose start does not precede its end.
    #[error("invalid range: start {start} must precede end {end}")]
    InvalidRange { start: f64, end: f64 },

    /// A clip's source failed to load or decode.
    #[error("media load failed: {0}")]
    MediaLoad(String),

    /// The capture pipeline could not produce a finished artifact.
    #[error("export failed ({reason}): {detail}")]
    ExportFailed { reason: ExportFailure, detail: String },
}

/// Why an export attempt produced no artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFailure {
    /// Nothing to capture: no clips, or an empty selection.
    NoContent,
    /// The encoding session reported an error mid-stream.
    Device,
    /// The wall-clock ceiling elapsed before the session finished.
    Timeout,
    /// The caller cancelled the attempt.
    Cancelled,
}

impl fmt::Display for ExportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportFailure::NoContent => "no content",
            ExportFailure::Device => "device error",
            ExportFailure::Timeout => "timeout",
            ExportFailure::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl CliplineError {
    /// Shorthand for a device-side export failure.
    pub fn export_device(detail: impl Into<String>) -> Self {
        CliplineError::ExportFailed {
            reason: ExportFailure::Device,
            detail: detail.into(),
        }
    }

    /// True when the error is any flavor of export failure.
    pub fn is_export_failure(&self) -> bool {
        matches!(self, CliplineError::ExportFailed { .. })
    }
}

/// Result type alias using CliplineError.
pub type Result<T> = std::result::Result<T, CliplineError>;
