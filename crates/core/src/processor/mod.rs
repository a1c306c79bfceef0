//! Processor module for the post-process pipeline.
//!
//! This module provides the `PostProcessor` which runs, per entry:
//! - Tagging: writing rendered tags into the downloaded media file
//! - Placement: copying the media file to its rendered destination
//! - Thumbnail: placing (and optionally re-encoding) the thumbnail
//! - Descriptor: writing the rendered `.nfo` document
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use subsync_core::converter::FfmpegConverter;
//! use subsync_core::processor::{PostProcessConfig, PostProcessor};
//! use subsync_core::tagging::LoftyTagWriter;
//! use subsync_core::thumbnail::{HttpFetcher, ThumbnailConfig};
//!
//! let processor = PostProcessor::new(
//!     Arc::new(FfmpegConverter::with_defaults()),
//!     Arc::new(LoftyTagWriter::new()),
//!     Arc::new(HttpFetcher::new(Duration::from_secs(30))?),
//!     ThumbnailConfig::default(),
//! );
//!
//! let config = PostProcessConfig::new("{sanitized_artist}/{sanitized_title}.{ext}");
//! let result = processor.run(&entry, &config, Path::new("/media")).await?;
//! println!("Placed {:?}", result.media_path);
//! ```

mod config;
mod pipeline;
mod types;

pub use config::PostProcessConfig;
pub use pipeline::{PostProcessError, PostProcessor};
pub use types::{PostProcessResult, ThumbnailOutcome};
