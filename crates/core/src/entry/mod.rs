//! Downloaded entries.
//!
//! An [`EntryInfo`] is what the downloader wrote next to the media file. An
//! [`Entry`] is that record with the subscription's overrides merged on top
//! and `file_path` derived from the working directory; it is what templates
//! and post-processing stages read.

mod sanitize;
mod types;

pub use sanitize::sanitize_file_name;
pub use types::{Entry, EntryInfo, CONVERTED_THUMBNAIL_EXT};
