//! Trait definitions for the subscription module.

use async_trait::async_trait;
use std::path::Path;

use crate::entry::EntryInfo;

use super::error::DownloadError;
use super::types::SubscriptionSource;

/// The external download operation.
///
/// Implementations write, for every entry, `{id}.{ext}`,
/// `{id}.info.json` and the thumbnail into `working_dir`. Sidecars may be
/// observed partially written while the download runs.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Returns the name of this downloader implementation.
    fn name(&self) -> &str;

    /// Downloads `source` and returns the entries now in `working_dir`.
    async fn download(
        &self,
        source: &SubscriptionSource,
        working_dir: &Path,
        extra_args: &[String],
    ) -> Result<Vec<EntryInfo>, DownloadError>;

    /// Validates that the downloader is properly configured and ready.
    async fn validate(&self) -> Result<(), DownloadError>;
}
