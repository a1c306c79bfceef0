//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by a conversion.
#[derive(Debug, Error)]
pub enum ConverterError {
    #[error("ffmpeg not found at {path}")]
    FfmpegNotFound { path: PathBuf },

    #[error("Conversion input missing: {path}")]
    InputNotFound { path: PathBuf },

    /// The target image format is not one of jpeg, png or webp.
    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Cannot create directory for conversion output: {path}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// ffmpeg exited successfully without writing the output.
    #[error("Conversion produced no output at {path}")]
    MissingOutput { path: PathBuf },

    /// ffmpeg exited unsuccessfully. `stderr` holds its last lines.
    #[error("Conversion failed: {reason}")]
    ConversionFailed {
        reason: String,
        stderr: Option<String>,
    },

    #[error("Conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    pub fn conversion_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
            stderr,
        }
    }
}
