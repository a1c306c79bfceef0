//! Types for the watcher module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Events emitted by a running watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WatcherEvent {
    /// An entry from the watched extractor started downloading.
    Downloading {
        title: String,
        /// Sidecar path relative to the working directory.
        sidecar: PathBuf,
    },
}
