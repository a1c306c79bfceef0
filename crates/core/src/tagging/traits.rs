//! Trait definitions for the tagging module.

use async_trait::async_trait;
use std::path::Path;

use super::error::TaggingError;

/// Writes metadata tags into a media file.
///
/// All tags of one call are set in memory and saved once. A failing save
/// may leave the file partially written; callers get the error but no
/// rollback.
#[async_trait]
pub trait TagWriter: Send + Sync {
    /// Returns the name of this writer implementation.
    fn name(&self) -> &str;

    /// Sets every `(tag, value)` pair on `path` and saves.
    async fn write_tags(&self, path: &Path, tags: &[(String, String)]) -> Result<(), TaggingError>;
}
