//! Error types for the thumbnail module.

use std::path::PathBuf;
use thiserror::Error;

use crate::converter::ConverterError;

/// Errors that can occur while fetching a remote thumbnail.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request failed or the server returned an error status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an empty body.
    #[error("Empty response body from {url}")]
    EmptyBody { url: String },
}

/// Errors that can occur during thumbnail processing.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// No downloaded thumbnail exists for the entry.
    #[error("Thumbnail not found for entry {entry_id}")]
    NotFound { entry_id: String },

    /// The conversion tool failed.
    #[error("Thumbnail conversion failed: {0}")]
    Conversion(#[from] ConverterError),

    /// The remote thumbnail could not be fetched.
    #[error("Thumbnail fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Filesystem error around the conversion.
    #[error("Thumbnail I/O failed for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ThumbnailError {
    /// Creates an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
