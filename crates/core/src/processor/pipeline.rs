//! Post-process pipeline implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::converter::Converter;
use crate::descriptor::{DescriptorError, DescriptorGenerator};
use crate::entry::Entry;
use crate::metrics;
use crate::tagging::{TagWriter, TaggingError, TaggingProcessor};
use crate::template::{self, TemplateError};
use crate::thumbnail::{
    ThumbnailConfig, ThumbnailError, ThumbnailFetcher, ThumbnailProcessor, UrlThumbnail,
};

use super::config::PostProcessConfig;
use super::types::{PostProcessResult, ThumbnailOutcome};

/// Error type for post-processing. The first failing stage aborts the
/// remaining ones; earlier stages are not rolled back.
#[derive(Debug, thiserror::Error)]
pub enum PostProcessError {
    /// Tagging failed.
    #[error("Tagging failed: {0}")]
    Tagging(#[from] TaggingError),

    /// A destination template could not be rendered.
    #[error("{stage} destination failed: {source}")]
    Template {
        stage: &'static str,
        #[source]
        source: TemplateError,
    },

    /// Copying the media file failed.
    #[error("Failed to copy {from} to {to}: {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Placing or converting the thumbnail failed.
    #[error("Thumbnail failed: {0}")]
    Thumbnail(#[from] ThumbnailError),

    /// `nfo` is configured without `nfo_name`.
    #[error("Descriptor fields configured without a destination name")]
    MissingDescriptorName,

    /// Generating the descriptor failed.
    #[error("Descriptor failed: {0}")]
    Descriptor(#[from] DescriptorError),
}

impl PostProcessError {
    /// Name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Tagging(_) => "tagging",
            Self::Template { stage, .. } => *stage,
            Self::Copy { .. } => "copy",
            Self::Thumbnail(_) => "thumbnail",
            Self::MissingDescriptorName | Self::Descriptor(_) => "descriptor",
        }
    }

    fn template(stage: &'static str) -> impl FnOnce(TemplateError) -> Self {
        move |source| Self::Template { stage, source }
    }
}

/// Runs the post-process stages for downloaded entries.
///
/// Stages run strictly in order: tagging, media copy, thumbnail,
/// descriptor.
pub struct PostProcessor<C: Converter, T: TagWriter, F: ThumbnailFetcher> {
    tagging: TaggingProcessor<T>,
    thumbnails: ThumbnailProcessor<C, F>,
    descriptors: DescriptorGenerator,
}

impl<C: Converter, T: TagWriter, F: ThumbnailFetcher> PostProcessor<C, T, F> {
    /// Creates a new post-processor.
    pub fn new(
        converter: Arc<C>,
        tag_writer: Arc<T>,
        fetcher: Arc<F>,
        thumbnail_config: ThumbnailConfig,
    ) -> Self {
        Self {
            tagging: TaggingProcessor::new(tag_writer),
            thumbnails: ThumbnailProcessor::new(converter, fetcher, thumbnail_config),
            descriptors: DescriptorGenerator::new(),
        }
    }

    /// Returns the thumbnail processor.
    pub fn thumbnails(&self) -> &ThumbnailProcessor<C, F> {
        &self.thumbnails
    }

    /// Post-processes one entry into `output_path`.
    pub async fn run(
        &self,
        entry: &Entry,
        config: &PostProcessConfig,
        output_path: &Path,
    ) -> Result<PostProcessResult, PostProcessError> {
        let started = Instant::now();
        let entry = entry.clone().with_sanitized_fields();

        let result = self.run_stages(&entry, config, output_path, started).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(r) => {
                metrics::ENTRIES_PROCESSED.with_label_values(&["success"]).inc();
                metrics::POST_PROCESS_DURATION
                    .with_label_values(&["success"])
                    .observe(elapsed);
                info!(
                    entry_id = %r.entry_id,
                    media = ?r.media_path,
                    tags = r.tags_written,
                    duration_ms = r.duration_ms,
                    "Post-processed entry"
                );
            }
            Err(e) => {
                metrics::ENTRIES_PROCESSED.with_label_values(&["failed"]).inc();
                metrics::STAGE_FAILURES.with_label_values(&[e.stage()]).inc();
                metrics::POST_PROCESS_DURATION
                    .with_label_values(&["failed"])
                    .observe(elapsed);
                warn!(entry_id = entry.id(), stage = e.stage(), error = %e, "Post-processing failed");
            }
        }

        result
    }

    async fn run_stages(
        &self,
        entry: &Entry,
        config: &PostProcessConfig,
        output_path: &Path,
        started: Instant,
    ) -> Result<PostProcessResult, PostProcessError> {
        let tags_written = match &config.tagging {
            Some(tags) => self.tagging.apply_tags(entry, tags).await?,
            None => 0,
        };

        let media_path = self.place_media(entry, config, output_path).await?;

        let (thumbnail, thumbnail_converted) = match &config.thumbnail_name {
            Some(name) => self.place_thumbnail(entry, config, name, output_path).await?,
            None => (ThumbnailOutcome::NotRequested, false),
        };

        let descriptor_path = match &config.nfo {
            Some(fields) => {
                let name = config
                    .nfo_name
                    .as_deref()
                    .ok_or(PostProcessError::MissingDescriptorName)?;
                let path = self
                    .descriptors
                    .generate(entry, fields, config.nfo_root.as_deref(), name, output_path)
                    .await?;
                Some(path)
            }
            None => None,
        };

        Ok(PostProcessResult {
            entry_id: entry.id().to_string(),
            media_path,
            thumbnail,
            thumbnail_converted,
            descriptor_path,
            tags_written,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Copies the media file to its destination. The source is kept.
    async fn place_media(
        &self,
        entry: &Entry,
        config: &PostProcessConfig,
        output_path: &Path,
    ) -> Result<PathBuf, PostProcessError> {
        let destination = template::render_path(&config.file_name, entry, output_path, true)
            .await
            .map_err(PostProcessError::template("copy"))?;
        let source = entry.file_path();

        tokio::fs::copy(&source, &destination)
            .await
            .map_err(|error| PostProcessError::Copy {
                from: source.clone(),
                to: destination.clone(),
                error,
            })?;

        debug!(from = ?source, to = ?destination, "Placed media file");
        Ok(destination)
    }

    /// Places the thumbnail unless the destination already exists.
    async fn place_thumbnail(
        &self,
        entry: &Entry,
        config: &PostProcessConfig,
        name: &str,
        output_path: &Path,
    ) -> Result<(ThumbnailOutcome, bool), PostProcessError> {
        let destination = template::render_path(name, entry, output_path, true)
            .await
            .map_err(PostProcessError::template("thumbnail"))?;

        if destination.exists() {
            debug!(path = ?destination, "Thumbnail already placed");
            return Ok((ThumbnailOutcome::AlreadyPresent(destination), false));
        }

        let outcome = if let Some(raw) = entry.downloaded_thumbnail_path() {
            tokio::fs::copy(&raw, &destination)
                .await
                .map_err(|e| ThumbnailError::io(&destination, e))?;
            ThumbnailOutcome::Copied(destination.clone())
        } else {
            match entry.thumbnail_url().filter(|_| config.thumbnail_from_url) {
                Some(url) => match self.thumbnails.convert_from_url(url, &destination).await {
                    UrlThumbnail::Converted { path, .. } => ThumbnailOutcome::Fetched(path),
                    UrlThumbnail::Unavailable {
                        attempts,
                        last_error,
                    } => {
                        warn!(
                            entry_id = entry.id(),
                            attempts,
                            error = %last_error,
                            "Thumbnail unavailable, continuing without it"
                        );
                        ThumbnailOutcome::Missing
                    }
                },
                None => {
                    debug!(entry_id = entry.id(), "No thumbnail to place");
                    ThumbnailOutcome::Missing
                }
            }
        };

        let converted = match config.convert_thumbnail {
            Some(format) if outcome.is_new() => {
                self.thumbnails
                    .convert_in_place(&destination, format)
                    .await?;
                true
            }
            _ => false,
        };

        Ok((outcome, converted))
    }
}
