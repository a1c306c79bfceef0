//! Thumbnail processing.
//!
//! Converts the thumbnail the downloader wrote next to an entry, or
//! fetches one from a URL with bounded retries when none was written.

mod config;
mod error;
mod fetch;
mod processor;

pub use config::ThumbnailConfig;
pub use error::{FetchError, ThumbnailError};
pub use fetch::{HttpFetcher, ThumbnailFetcher};
pub use processor::{LocalThumbnail, ThumbnailProcessor, UrlThumbnail};
