//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::ConverterError;

/// Target image format for thumbnail conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// Canonical format identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// FFmpeg encoder for this format.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Jpeg => "mjpeg",
            Self::Png => "png",
            Self::Webp => "libwebp",
        }
    }

    /// Preferred file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// Infers the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl FromStr for ImageFormat {
    type Err = ConverterError;

    /// Parses a format identifier; `"jpg"` is accepted as `jpeg`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            other => Err(ConverterError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ImageFormat {
    type Error = ConverterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ImageFormat> for String {
    fn from(format: ImageFormat) -> Self {
        format.as_str().to_string()
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single conversion invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// Input file.
    pub input_path: PathBuf,
    /// Output file; overwritten if it exists.
    pub output_path: PathBuf,
    /// Explicit output format. When `None` the tool infers it from the
    /// output extension.
    pub format: Option<ImageFormat>,
    /// Request bit-exact output (no encoder version stamps).
    pub bitexact: bool,
}

impl ConversionJob {
    /// Creates a bit-exact job with the format inferred from the output path.
    pub fn bitexact(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            format: None,
            bitexact: true,
        }
    }

    /// Sets an explicit output format.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Output file.
    pub output_path: PathBuf,
    /// Output size in bytes.
    pub output_size_bytes: u64,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}
