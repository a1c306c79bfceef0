//! Error types for the subscription module.

use std::path::PathBuf;
use thiserror::Error;

use crate::watcher::WatcherError;

/// Errors that can occur while downloading.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// yt-dlp binary not found.
    #[error("yt-dlp not found at path: {path}")]
    NotFound { path: PathBuf },

    /// The download process exited unsuccessfully.
    #[error("Download failed with exit code {code:?}")]
    Failed {
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// The download did not finish in time.
    #[error("Download timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort a whole subscription run.
///
/// Failures of single entries are reported in the run report instead.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// The name cannot be used as a directory name.
    #[error("Invalid subscription name: {name:?}")]
    InvalidName { name: String },

    /// The working directory could not be created.
    #[error("Failed to create working directory: {path}")]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The download failed.
    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    /// The watcher worker failed.
    #[error(transparent)]
    Watcher(#[from] WatcherError),
}
