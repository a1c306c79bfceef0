//! Error types for the tagging module.

use std::path::PathBuf;
use thiserror::Error;

use crate::template::TemplateError;

/// Errors that can occur while tagging a media file.
#[derive(Debug, Error)]
pub enum TaggingError {
    /// A tag template could not be rendered.
    #[error("Failed to render tag: {0}")]
    Template(#[from] TemplateError),

    /// The tag name has no mapping in the tag format.
    #[error("Unknown tag name: {name}")]
    UnknownTag { name: String },

    /// The media file could not be read or has no taggable format.
    #[error("Failed to read tags from {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// The tags could not be written back.
    #[error("Failed to save tags to {path}: {reason}")]
    Save { path: PathBuf, reason: String },

    /// The blocking tag task panicked or was cancelled.
    #[error("Tagging task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl TaggingError {
    pub fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn save(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Save {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
