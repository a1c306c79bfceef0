//! Error types for the descriptor module.

use std::path::PathBuf;
use thiserror::Error;

use crate::template::TemplateError;

/// Errors that can occur while generating a descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// A field or destination template could not be rendered.
    #[error("Failed to render descriptor: {0}")]
    Template(#[from] TemplateError),

    /// A key or root name is not a valid XML element name.
    #[error("Invalid element name: {name:?}")]
    InvalidElementName { name: String },

    /// The XML writer failed.
    #[error("Failed to serialize descriptor: {reason}")]
    Serialize { reason: String },

    /// The document could not be written.
    #[error("Failed to write descriptor to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
