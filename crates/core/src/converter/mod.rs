//! Converter module for the external image conversion tool.
//!
//! This module provides the `Converter` trait and an FFmpeg implementation
//! used to turn downloaded thumbnails into their archived format.
//!
//! # Example
//!
//! ```ignore
//! use subsync_core::converter::{FfmpegConverter, Converter, ConversionJob, ImageFormat};
//!
//! let converter = FfmpegConverter::with_defaults();
//!
//! // Validate ffmpeg is available
//! converter.validate().await?;
//!
//! // Re-encode a webp thumbnail as jpeg
//! let job = ConversionJob::bitexact("/work/abc.webp", "/work/abc.jpg")
//!     .with_format(ImageFormat::Jpeg);
//! let result = converter.convert(job).await?;
//! println!("Converted in {} ms", result.duration_ms);
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use traits::Converter;
pub use types::{ConversionJob, ConversionResult, ImageFormat};
