//! Mock downloader for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::entry::EntryInfo;
use crate::subscription::{read_entries, DownloadError, Downloader, SubscriptionSource};

/// A recorded download for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedDownload {
    pub source: SubscriptionSource,
    pub working_dir: PathBuf,
    pub extra_args: Vec<String>,
}

/// An entry the mock writes into the working directory.
#[derive(Debug, Clone)]
pub struct MockEntry {
    pub info: EntryInfo,
    /// Thumbnail extension to write, if any.
    pub thumbnail_ext: Option<String>,
}

impl MockEntry {
    pub fn new(info: EntryInfo) -> Self {
        Self {
            info,
            thumbnail_ext: None,
        }
    }

    pub fn with_thumbnail(mut self, ext: impl Into<String>) -> Self {
        self.thumbnail_ext = Some(ext.into());
        self
    }
}

/// Mock implementation of the Downloader trait.
///
/// Writes `{id}.{ext}`, `{id}.info.json` and optionally a thumbnail for
/// every configured entry, the way yt-dlp lays out a working directory.
#[derive(Debug, Clone, Default)]
pub struct MockDownloader {
    entries: Arc<RwLock<Vec<MockEntry>>>,
    downloads: Arc<RwLock<Vec<RecordedDownload>>>,
    next_error: Arc<RwLock<Option<DownloadError>>>,
    /// Pause after each written entry, in milliseconds.
    entry_delay_ms: Arc<RwLock<u64>>,
}

impl MockDownloader {
    /// Create a new mock downloader with no entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry written by every download.
    pub async fn add_entry(&self, entry: MockEntry) {
        self.entries.write().await.push(entry);
    }

    /// Configure the next download to fail with the given error.
    pub async fn set_next_error(&self, error: DownloadError) {
        *self.next_error.write().await = Some(error);
    }

    /// Pause after each written entry so a watcher can observe it.
    pub async fn set_entry_delay(&self, delay: Duration) {
        *self.entry_delay_ms.write().await = delay.as_millis() as u64;
    }

    /// Get all recorded downloads.
    pub async fn recorded_downloads(&self) -> Vec<RecordedDownload> {
        self.downloads.read().await.clone()
    }

    async fn write_entry(working_dir: &Path, entry: &MockEntry) -> Result<(), DownloadError> {
        let id = &entry.info.id;
        tokio::fs::write(working_dir.join(format!("{}.{}", id, entry.info.ext)), b"media").await?;
        if let Some(ext) = &entry.thumbnail_ext {
            tokio::fs::write(working_dir.join(format!("{id}.{ext}")), b"thumbnail").await?;
        }

        let json = serde_json::to_vec(&entry.info)
            .map_err(|e| DownloadError::Io(std::io::Error::other(e)))?;
        tokio::fs::write(working_dir.join(format!("{id}.info.json")), json).await?;
        Ok(())
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn download(
        &self,
        source: &SubscriptionSource,
        working_dir: &Path,
        extra_args: &[String],
    ) -> Result<Vec<EntryInfo>, DownloadError> {
        self.downloads.write().await.push(RecordedDownload {
            source: source.clone(),
            working_dir: working_dir.to_path_buf(),
            extra_args: extra_args.to_vec(),
        });

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let delay = Duration::from_millis(*self.entry_delay_ms.read().await);
        let entries = self.entries.read().await.clone();
        for entry in &entries {
            Self::write_entry(working_dir, entry).await?;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        read_entries(working_dir)
    }

    async fn validate(&self) -> Result<(), DownloadError> {
        Ok(())
    }
}
