//! Subscriptions.
//!
//! A subscription names a source, a download invocation and the
//! post-processing applied to every entry it downloads. The runner ties
//! one run together: watcher, download, then post-processing per entry.

mod config;
mod error;
mod runner;
mod traits;
mod types;
mod ytdlp;

pub use config::DownloaderConfig;
pub use error::{DownloadError, SubscriptionError};
pub use runner::SubscriptionRunner;
pub use traits::Downloader;
pub use types::{EntryOutcome, EntryReport, SubscriptionConfig, SubscriptionReport, SubscriptionSource};
pub use ytdlp::{read_entries, YtDlpDownloader};
