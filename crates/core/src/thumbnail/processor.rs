//! Thumbnail processor implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::converter::{ConversionJob, Converter, ImageFormat};
use crate::entry::Entry;
use crate::metrics;

use super::config::ThumbnailConfig;
use super::error::ThumbnailError;
use super::fetch::ThumbnailFetcher;

/// Outcome of converting an entry's downloaded thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalThumbnail {
    /// The converted thumbnail already existed; nothing was done.
    AlreadyConverted(PathBuf),
    /// The downloaded thumbnail was converted.
    Converted(PathBuf),
    /// No downloaded thumbnail exists and the caller tolerates that.
    Missing,
}

/// Outcome of fetching and converting a remote thumbnail.
///
/// Exhausted retries are a normal outcome, not an error: callers decide
/// whether to continue without a thumbnail.
#[must_use = "an unavailable thumbnail must be handled explicitly"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlThumbnail {
    /// The thumbnail was written to `path`.
    Converted { path: PathBuf, attempts: u32 },
    /// Every attempt failed.
    Unavailable { attempts: u32, last_error: String },
}

impl UrlThumbnail {
    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted { .. })
    }
}

/// Converts downloaded or remote thumbnails through the external converter.
pub struct ThumbnailProcessor<C: Converter, F: ThumbnailFetcher> {
    converter: Arc<C>,
    fetcher: Arc<F>,
    config: ThumbnailConfig,
}

impl<C: Converter, F: ThumbnailFetcher> ThumbnailProcessor<C, F> {
    /// Creates a new thumbnail processor.
    pub fn new(converter: Arc<C>, fetcher: Arc<F>, config: ThumbnailConfig) -> Self {
        Self {
            converter,
            fetcher,
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ThumbnailConfig {
        &self.config
    }

    /// Converts the entry's downloaded thumbnail to jpeg next to it.
    ///
    /// Does nothing when the converted thumbnail already exists. A missing
    /// downloaded thumbnail is an error only with `error_if_missing`.
    pub async fn convert_local(
        &self,
        entry: &Entry,
        error_if_missing: bool,
    ) -> Result<LocalThumbnail, ThumbnailError> {
        let converted = entry.converted_thumbnail_path();
        if converted.is_file() {
            debug!(entry_id = entry.id(), path = ?converted, "Thumbnail already converted");
            return Ok(LocalThumbnail::AlreadyConverted(converted));
        }

        let Some(downloaded) = entry.downloaded_thumbnail_path() else {
            if error_if_missing {
                return Err(ThumbnailError::NotFound {
                    entry_id: entry.id().to_string(),
                });
            }
            debug!(entry_id = entry.id(), "No downloaded thumbnail, skipping conversion");
            return Ok(LocalThumbnail::Missing);
        };

        let job = ConversionJob::bitexact(&downloaded, &converted).with_format(ImageFormat::Jpeg);
        match self.converter.convert(job).await {
            Ok(_) => {
                metrics::THUMBNAIL_CONVERSIONS
                    .with_label_values(&["local", "success"])
                    .inc();
            }
            Err(e) => {
                metrics::THUMBNAIL_CONVERSIONS
                    .with_label_values(&["local", "failure"])
                    .inc();
                return Err(e.into());
            }
        }

        info!(entry_id = entry.id(), from = ?downloaded, to = ?converted, "Converted thumbnail");
        Ok(LocalThumbnail::Converted(converted))
    }

    /// Fetches `url` and converts it into `destination`.
    ///
    /// The fetch-and-convert sequence is attempted up to
    /// `fetch_attempts` times; each attempt uses a fresh temporary file
    /// that is removed however the attempt ends.
    pub async fn convert_from_url(&self, url: &str, destination: &Path) -> UrlThumbnail {
        let max_attempts = self.config.fetch_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match self.fetch_and_convert(url, destination).await {
                Ok(()) => {
                    metrics::THUMBNAIL_FETCH_ATTEMPTS
                        .with_label_values(&["success"])
                        .inc();
                    info!(url, ?destination, attempt, "Converted thumbnail from url");
                    return UrlThumbnail::Converted {
                        path: destination.to_path_buf(),
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    metrics::THUMBNAIL_FETCH_ATTEMPTS
                        .with_label_values(&["failure"])
                        .inc();
                    warn!(url, attempt, max_attempts, error = %e, "Thumbnail attempt failed");
                    last_error = e.to_string();

                    if attempt < max_attempts && self.config.retry_delay_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms))
                            .await;
                    }
                }
            }
        }

        UrlThumbnail::Unavailable {
            attempts: max_attempts,
            last_error,
        }
    }

    /// Re-encodes `path` as `format`, replacing it atomically.
    pub async fn convert_in_place(
        &self,
        path: &Path,
        format: ImageFormat,
    ) -> Result<(), ThumbnailError> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let temp = tempfile::Builder::new()
            .prefix(".subsync-convert-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile_in(parent)
            .map_err(|e| ThumbnailError::io(parent, e))?;

        let job = ConversionJob::bitexact(path, temp.path()).with_format(format);
        if let Err(e) = self.converter.convert(job).await {
            metrics::THUMBNAIL_CONVERSIONS
                .with_label_values(&["in_place", "failure"])
                .inc();
            return Err(e.into());
        }

        temp.persist(path)
            .map_err(|e| ThumbnailError::io(path, e.error))?;

        metrics::THUMBNAIL_CONVERSIONS
            .with_label_values(&["in_place", "success"])
            .inc();
        debug!(?path, %format, "Converted thumbnail in place");
        Ok(())
    }

    /// One independent fetch-and-convert attempt.
    async fn fetch_and_convert(&self, url: &str, destination: &Path) -> Result<(), ThumbnailError> {
        let bytes = self.fetcher.fetch(url).await?;

        tokio::fs::create_dir_all(&self.config.temp_dir)
            .await
            .map_err(|e| ThumbnailError::io(&self.config.temp_dir, e))?;

        let temp = tempfile::Builder::new()
            .prefix("thumbnail-")
            .tempfile_in(&self.config.temp_dir)
            .map_err(|e| ThumbnailError::io(&self.config.temp_dir, e))?;

        tokio::fs::write(temp.path(), &bytes)
            .await
            .map_err(|e| ThumbnailError::io(temp.path(), e))?;

        let mut job = ConversionJob::bitexact(temp.path(), destination);
        if let Some(format) = ImageFormat::from_path(destination) {
            job = job.with_format(format);
        }
        self.converter.convert(job).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ConverterError;
    use crate::entry::EntryInfo;
    use crate::testing::{MockConverter, MockFetcher};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    struct Fixture {
        processor: ThumbnailProcessor<MockConverter, MockFetcher>,
        converter: Arc<MockConverter>,
        fetcher: Arc<MockFetcher>,
        work_dir: TempDir,
        temp_dir: TempDir,
    }

    fn fixture() -> Fixture {
        let work_dir = TempDir::new().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let converter = Arc::new(MockConverter::new());
        let fetcher = Arc::new(MockFetcher::new());
        let config = ThumbnailConfig::default().with_temp_dir(temp_dir.path().to_path_buf());

        Fixture {
            processor: ThumbnailProcessor::new(Arc::clone(&converter), Arc::clone(&fetcher), config),
            converter,
            fetcher,
            work_dir,
            temp_dir,
        }
    }

    fn entry(dir: &Path) -> Entry {
        Entry::merge(EntryInfo::new("abc", "mp4"), &BTreeMap::new(), dir)
    }

    fn temp_files(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_convert_local_converts_downloaded() {
        let f = fixture();
        std::fs::write(f.work_dir.path().join("abc.webp"), b"webp").unwrap();

        let outcome = f.processor.convert_local(&entry(f.work_dir.path()), true).await.unwrap();

        let converted = f.work_dir.path().join("abc.jpg");
        assert_eq!(outcome, LocalThumbnail::Converted(converted.clone()));
        assert!(converted.is_file());

        let jobs = f.converter.recorded_jobs().await;
        assert_eq!(jobs.len(), 1);
        assert!(jobs[0].bitexact);
        assert_eq!(jobs[0].input_path, f.work_dir.path().join("abc.webp"));
    }

    #[tokio::test]
    async fn test_convert_local_is_idempotent() {
        let f = fixture();
        std::fs::write(f.work_dir.path().join("abc.webp"), b"webp").unwrap();
        let entry = entry(f.work_dir.path());

        f.processor.convert_local(&entry, true).await.unwrap();
        let first = std::fs::read(f.work_dir.path().join("abc.jpg")).unwrap();

        let outcome = f.processor.convert_local(&entry, true).await.unwrap();
        let second = std::fs::read(f.work_dir.path().join("abc.jpg")).unwrap();

        assert!(matches!(outcome, LocalThumbnail::AlreadyConverted(_)));
        assert_eq!(first, second);
        assert_eq!(f.converter.conversion_count().await, 1);
    }

    #[tokio::test]
    async fn test_convert_local_missing_strict() {
        let f = fixture();
        let result = f.processor.convert_local(&entry(f.work_dir.path()), true).await;
        assert!(matches!(result, Err(ThumbnailError::NotFound { entry_id }) if entry_id == "abc"));
    }

    #[tokio::test]
    async fn test_convert_local_missing_lenient() {
        let f = fixture();
        let outcome = f.processor.convert_local(&entry(f.work_dir.path()), false).await.unwrap();
        assert_eq!(outcome, LocalThumbnail::Missing);
        assert_eq!(f.converter.conversion_count().await, 0);
    }

    #[tokio::test]
    async fn test_convert_local_surfaces_conversion_failure() {
        let f = fixture();
        std::fs::write(f.work_dir.path().join("abc.png"), b"png").unwrap();
        f.converter
            .set_next_error(ConverterError::conversion_failed("boom", None))
            .await;

        let result = f.processor.convert_local(&entry(f.work_dir.path()), true).await;
        assert!(matches!(result, Err(ThumbnailError::Conversion(_))));
        assert!(!f.work_dir.path().join("abc.jpg").exists());
    }

    #[tokio::test]
    async fn test_convert_from_url_success() {
        let f = fixture();
        f.fetcher.set_response(b"remote".to_vec()).await;
        let dest = f.work_dir.path().join("poster.jpg");

        let outcome = f.processor.convert_from_url("https://img/1", &dest).await;

        assert_eq!(
            outcome,
            UrlThumbnail::Converted {
                path: dest.clone(),
                attempts: 1
            }
        );
        assert_eq!(std::fs::read(&dest).unwrap(), b"remote");
        assert_eq!(temp_files(f.temp_dir.path()), 0);

        let jobs = f.converter.recorded_jobs().await;
        assert_eq!(jobs[0].format, Some(ImageFormat::Jpeg));
    }

    #[tokio::test]
    async fn test_convert_from_url_exhausts_five_attempts() {
        let f = fixture();
        f.fetcher.set_always_fail(true).await;
        let dest = f.work_dir.path().join("poster.jpg");

        let outcome = f.processor.convert_from_url("https://img/1", &dest).await;

        assert!(matches!(outcome, UrlThumbnail::Unavailable { attempts: 5, .. }));
        assert_eq!(f.fetcher.fetch_count().await, 5);
        assert_eq!(f.converter.conversion_count().await, 0);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_convert_from_url_retries_conversion_failures() {
        let f = fixture();
        f.fetcher.set_response(b"remote".to_vec()).await;
        f.converter.set_always_fail(true).await;
        let dest = f.work_dir.path().join("poster.jpg");

        let outcome = f.processor.convert_from_url("https://img/1", &dest).await;

        assert!(!outcome.is_converted());
        assert_eq!(f.fetcher.fetch_count().await, 5);
        assert_eq!(f.converter.conversion_count().await, 5);
        assert_eq!(temp_files(f.temp_dir.path()), 0);
    }

    #[tokio::test]
    async fn test_convert_from_url_recovers_after_failures() {
        let f = fixture();
        f.fetcher.set_response(b"remote".to_vec()).await;
        f.fetcher.fail_next(2).await;
        let dest = f.work_dir.path().join("poster.png");

        let outcome = f.processor.convert_from_url("https://img/1", &dest).await;

        assert!(matches!(outcome, UrlThumbnail::Converted { attempts: 3, .. }));
        assert_eq!(f.fetcher.fetch_count().await, 3);
        assert!(dest.is_file());
    }

    #[tokio::test]
    async fn test_convert_in_place_replaces_file() {
        let f = fixture();
        let path = f.work_dir.path().join("poster.webp");
        std::fs::write(&path, b"webp").unwrap();

        f.processor.convert_in_place(&path, ImageFormat::Jpeg).await.unwrap();

        assert!(path.is_file());
        assert_eq!(temp_files(f.work_dir.path()), 1);
        let jobs = f.converter.recorded_jobs().await;
        assert_eq!(jobs[0].input_path, path);
        assert_eq!(jobs[0].format, Some(ImageFormat::Jpeg));
    }

    #[tokio::test]
    async fn test_convert_in_place_failure_keeps_original() {
        let f = fixture();
        let path = f.work_dir.path().join("poster.webp");
        std::fs::write(&path, b"webp").unwrap();
        f.converter.set_always_fail(true).await;

        let result = f.processor.convert_in_place(&path, ImageFormat::Png).await;

        assert!(result.is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"webp");
        assert_eq!(temp_files(f.work_dir.path()), 1);
    }
}
