//! Error types for the watcher module.

use thiserror::Error;

/// Errors surfaced by the watcher.
///
/// Unreadable sidecars are not errors; they are retried on the next poll.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// The watcher worker panicked.
    #[error("Watcher worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
