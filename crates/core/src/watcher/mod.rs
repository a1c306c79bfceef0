//! Sidecar watcher.
//!
//! Polls a job's working directory while the downloader runs and reports
//! the title of every entry whose sidecar names the watched extractor.
//! Sidecars caught mid-write fail to parse and are retried on the next
//! poll.

mod config;
mod error;
mod sidecar;
mod types;

pub use config::WatcherConfig;
pub use error::WatcherError;
pub use sidecar::{SidecarWatcher, WatcherHandle};
pub use types::WatcherEvent;
