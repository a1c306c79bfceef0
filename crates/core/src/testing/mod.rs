//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every external seam
//! (conversion tool, tag library, network fetch, downloader), allowing the
//! pipeline and subscription runs to be tested without real tools.
//!
//! # Example
//!
//! ```rust,ignore
//! use subsync_core::testing::{MockConverter, MockFetcher, MockTagWriter};
//!
//! let converter = MockConverter::new();
//! let fetcher = MockFetcher::new();
//!
//! // Configure mock behavior
//! fetcher.fail_next(2).await;
//! converter.set_always_fail(false).await;
//!
//! // Use in a PostProcessor...
//! ```

mod mock_converter;
mod mock_downloader;
mod mock_fetcher;
mod mock_tag_writer;

pub use mock_converter::{MockConverter, RecordedConversion};
pub use mock_downloader::{MockDownloader, MockEntry, RecordedDownload};
pub use mock_fetcher::MockFetcher;
pub use mock_tag_writer::{MockTagWriter, RecordedTagWrite};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeMap;

    use crate::entry::EntryInfo;
    use crate::processor::PostProcessConfig;
    use crate::subscription::{SubscriptionConfig, SubscriptionSource};

    /// Create a test entry from a YouTube channel.
    pub fn youtube_entry(id: &str, title: &str, artist: &str) -> EntryInfo {
        EntryInfo::new(id, "mp4")
            .with_title(title)
            .with_artist(artist)
            .with_extractor("youtube")
    }

    /// Create a test entry from SoundCloud.
    pub fn soundcloud_entry(id: &str, title: &str, artist: &str) -> EntryInfo {
        EntryInfo::new(id, "mp3")
            .with_title(title)
            .with_artist(artist)
            .with_extractor("soundcloud")
    }

    /// Create a map from string pairs.
    pub fn string_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Create a YouTube subscription placing `{artist}/{title}.{ext}`.
    pub fn youtube_subscription(output_path: impl Into<std::path::PathBuf>) -> SubscriptionConfig {
        SubscriptionConfig {
            source: SubscriptionSource::Youtube {
                url: "https://www.youtube.com/@channel/videos".to_string(),
            },
            post_process: PostProcessConfig::new("{sanitized_artist}/{sanitized_title}.{ext}"),
            overrides: BTreeMap::new(),
            output_path: output_path.into(),
            download_args: Vec::new(),
        }
    }
}
