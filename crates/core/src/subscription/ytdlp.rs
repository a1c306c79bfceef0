//! yt-dlp based downloader implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::entry::EntryInfo;

use super::config::DownloaderConfig;
use super::error::DownloadError;
use super::traits::Downloader;
use super::types::SubscriptionSource;

/// Suffix of the per-entry info documents yt-dlp writes.
const INFO_SUFFIX: &str = ".info.json";

/// Largest stderr excerpt kept on failure.
const MAX_STDERR_BYTES: usize = 4096;

/// Reads every entry info document directly inside `working_dir`.
///
/// Documents that do not parse as an entry (playlist metadata, partial
/// writes) are skipped. Entries are sorted by id.
pub fn read_entries(working_dir: &Path) -> Result<Vec<EntryInfo>, DownloadError> {
    let mut entries = Vec::new();

    for dir_entry in WalkDir::new(working_dir).min_depth(1).max_depth(1) {
        let dir_entry = dir_entry.map_err(|e| {
            DownloadError::Io(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            )
        })?;
        let is_info = dir_entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(INFO_SUFFIX));
        if !dir_entry.file_type().is_file() || !is_info {
            continue;
        }

        let bytes = std::fs::read(dir_entry.path())?;
        match EntryInfo::from_slice(&bytes) {
            Ok(info) => entries.push(info),
            Err(e) => {
                warn!(path = ?dir_entry.path(), error = %e, "Skipping unreadable entry info");
            }
        }
    }

    entries.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(entries)
}

/// Downloader that shells out to yt-dlp.
pub struct YtDlpDownloader {
    config: DownloaderConfig,
}

impl YtDlpDownloader {
    pub fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    /// Creates a downloader with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(DownloaderConfig::default())
    }

    /// Builds yt-dlp arguments for one run.
    fn build_args(
        &self,
        source: &SubscriptionSource,
        working_dir: &Path,
        extra_args: &[String],
    ) -> Vec<String> {
        let output_template = working_dir.join("%(id)s.%(ext)s");
        let mut args = vec![
            "--no-progress".to_string(),
            "--write-info-json".to_string(),
            "--write-thumbnail".to_string(),
            "--no-write-playlist-metafiles".to_string(),
            "-o".to_string(),
            output_template.to_string_lossy().to_string(),
        ];

        args.extend(self.config.extra_args.iter().cloned());
        args.extend(extra_args.iter().cloned());
        args.push(source.url().to_string());

        args
    }

    fn spawn_error(&self, e: std::io::Error) -> DownloadError {
        if e.kind() == std::io::ErrorKind::NotFound {
            DownloadError::NotFound {
                path: self.config.ytdlp_path.clone(),
            }
        } else {
            DownloadError::Io(e)
        }
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn download(
        &self,
        source: &SubscriptionSource,
        working_dir: &Path,
        extra_args: &[String],
    ) -> Result<Vec<EntryInfo>, DownloadError> {
        let args = self.build_args(source, working_dir, extra_args);
        debug!(ytdlp = ?self.config.ytdlp_path, ?args, "Running yt-dlp");

        let child = Command::new(&self.config.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let output = match self.config.timeout_secs {
            Some(secs) => match timeout(Duration::from_secs(secs), child.wait_with_output()).await {
                Ok(result) => result?,
                Err(_) => return Err(DownloadError::Timeout { timeout_secs: secs }),
            },
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(DownloadError::Failed {
                code: output.status.code(),
                stderr: if stderr.is_empty() {
                    None
                } else {
                    Some(truncate_tail(stderr, MAX_STDERR_BYTES).to_string())
                },
            });
        }

        read_entries(working_dir)
    }

    async fn validate(&self) -> Result<(), DownloadError> {
        let output = Command::new(&self.config.ytdlp_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(DownloadError::Failed {
                code: output.status.code(),
                stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
            });
        }

        Ok(())
    }
}

/// Keeps the last `max` bytes; yt-dlp prints the actual error last.
fn truncate_tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
