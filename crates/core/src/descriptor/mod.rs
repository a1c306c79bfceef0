//! Descriptor generator.
//!
//! Writes a flat, attribute-free XML document (an `.nfo` file for media
//! servers) rendered from entry fields.

mod error;
mod generator;

pub use error::DescriptorError;
pub use generator::{serialize, DescriptorGenerator, DEFAULT_ROOT};
