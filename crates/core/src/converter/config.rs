//! Configuration for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for the thumbnail conversion tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// ffmpeg binary, looked up on `PATH` when relative.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Upper bound for one image conversion, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Value passed to `-loglevel`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Arguments inserted before the input, e.g. `-hide_banner`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            timeout_secs: default_timeout(),
            log_level: default_log_level(),
            extra_args: Vec::new(),
        }
    }
}

impl ConverterConfig {
    /// Uses the ffmpeg binary at `ffmpeg_path`.
    pub fn with_path(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_suit_thumbnails() {
        let config = ConverterConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.log_level, "error");
        assert!(config.extra_args.is_empty());
    }

    #[test]
    fn test_builders() {
        let config = ConverterConfig::with_path(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
            .with_timeout(5)
            .with_extra_args(["-hide_banner"]);

        assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.extra_args, vec!["-hide_banner"]);
    }

    #[test]
    fn test_partial_section() {
        let config: ConverterConfig = toml::from_str(r#"log_level = "warning""#).unwrap();
        assert_eq!(config.log_level, "warning");
        assert_eq!(config.timeout_secs, 30);
    }
}
