//! Configuration for the downloader.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the yt-dlp downloader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Path to the yt-dlp binary.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,

    /// Kill the download after this many seconds. No limit when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Arguments passed to every invocation, before the subscription's own.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            timeout_secs: None,
            extra_args: Vec::new(),
        }
    }
}

impl DownloaderConfig {
    /// Creates a config with a custom yt-dlp path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            ytdlp_path: path,
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DownloaderConfig::default();
        assert_eq!(config.ytdlp_path, PathBuf::from("yt-dlp"));
        assert_eq!(config.timeout_secs, None);
        assert!(config.extra_args.is_empty());
    }

    #[test]
    fn test_deserialize() {
        let config: DownloaderConfig = toml::from_str(
            r#"
            ytdlp_path = "/usr/local/bin/yt-dlp"
            timeout_secs = 3600
            extra_args = ["--rate-limit", "2M"]
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout_secs, Some(3600));
        assert_eq!(config.extra_args.len(), 2);
    }
}
