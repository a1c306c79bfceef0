//! Types for the processor module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What the thumbnail stage did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum ThumbnailOutcome {
    /// No `thumbnail_name` configured.
    NotRequested,
    /// The destination already existed and was left alone.
    AlreadyPresent(PathBuf),
    /// The downloaded thumbnail was copied.
    Copied(PathBuf),
    /// The thumbnail was fetched from the entry's URL.
    Fetched(PathBuf),
    /// No thumbnail could be placed; the entry was processed without one.
    Missing,
}

impl ThumbnailOutcome {
    /// Whether this run placed a new thumbnail file.
    pub fn is_new(&self) -> bool {
        matches!(self, Self::Copied(_) | Self::Fetched(_))
    }
}

/// Result of post-processing one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostProcessResult {
    /// Entry ID.
    pub entry_id: String,
    /// Final media path.
    pub media_path: PathBuf,
    /// Thumbnail stage outcome.
    pub thumbnail: ThumbnailOutcome,
    /// Whether the placed thumbnail was re-encoded.
    pub thumbnail_converted: bool,
    /// Descriptor path, when generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor_path: Option<PathBuf>,
    /// Number of tags written.
    pub tags_written: usize,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
}
