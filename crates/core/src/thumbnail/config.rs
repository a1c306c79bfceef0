//! Configuration for thumbnail processing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the thumbnail processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Attempts made by the URL fetch-and-convert sequence.
    #[serde(default = "default_fetch_attempts")]
    pub fetch_attempts: u32,

    /// Delay between attempts in milliseconds.
    #[serde(default)]
    pub retry_delay_ms: u64,

    /// Timeout for a single HTTP request in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Directory for downloaded thumbnails awaiting conversion.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
}

fn default_fetch_attempts() -> u32 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("subsync-thumbnails")
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            fetch_attempts: default_fetch_attempts(),
            retry_delay_ms: 0,
            request_timeout_secs: default_request_timeout(),
            temp_dir: default_temp_dir(),
        }
    }
}

impl ThumbnailConfig {
    /// Sets the temp directory.
    pub fn with_temp_dir(mut self, dir: PathBuf) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Sets the number of fetch attempts.
    pub fn with_fetch_attempts(mut self, attempts: u32) -> Self {
        self.fetch_attempts = attempts;
        self
    }
}
