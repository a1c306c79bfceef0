//! Tagging processor.
//!
//! Renders tag templates against an entry and writes the values into the
//! downloaded media file through a [`TagWriter`].

mod error;
mod lofty_writer;
mod processor;
mod traits;

pub use lofty_writer::LoftyTagWriter;
pub use error::TaggingError;
pub use processor::TaggingProcessor;
pub use traits::TagWriter;
