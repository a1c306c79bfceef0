//! FFmpeg-based converter implementation.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionJob, ConversionResult};

/// Largest stderr excerpt kept on failure.
const MAX_STDERR_BYTES: usize = 4096;

/// FFmpeg-based converter implementation.
pub struct FfmpegConverter {
    config: ConverterConfig,
}

impl FfmpegConverter {
    /// Creates a new FFmpeg converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    /// Builds ffmpeg arguments for a job.
    fn build_args(&self, job: &ConversionJob) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-loglevel".to_string(),
            self.config.log_level.clone(),
        ];

        args.extend(self.config.extra_args.iter().cloned());

        // Input options
        if job.bitexact {
            args.push("-bitexact".to_string());
        }
        args.extend([
            "-i".to_string(),
            job.input_path.to_string_lossy().to_string(),
        ]);

        // A single still image, written regardless of the output name
        if let Some(format) = job.format {
            args.extend([
                "-frames:v".to_string(),
                "1".to_string(),
                "-update".to_string(),
                "1".to_string(),
                "-c:v".to_string(),
                format.ffmpeg_codec().to_string(),
                "-f".to_string(),
                "image2".to_string(),
            ]);
        }

        // Output options
        if job.bitexact {
            args.push("-bitexact".to_string());
        }
        args.push(job.output_path.to_string_lossy().to_string());

        args
    }

    fn spawn_error(&self, e: std::io::Error) -> ConverterError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConverterError::FfmpegNotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            ConverterError::Io(e)
        }
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
        let start = Instant::now();

        if !job.input_path.exists() {
            return Err(ConverterError::InputNotFound {
                path: job.input_path.clone(),
            });
        }

        // Ensure output directory exists
        if let Some(parent) = job.output_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConverterError::OutputDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let args = self.build_args(&job);
        debug!(ffmpeg = ?self.config.ffmpeg_path, ?args, "Running ffmpeg");

        let child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                // Dropping the future kills the child
                return Err(ConverterError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(ConverterError::conversion_failed(
                format!("FFmpeg exited with code: {:?}", output.status.code()),
                if stderr.is_empty() {
                    None
                } else {
                    Some(truncate(stderr, MAX_STDERR_BYTES).to_string())
                },
            ));
        }

        // Verify output exists and get size
        let output_meta = tokio::fs::metadata(&job.output_path)
            .await
            .map_err(|_| ConverterError::MissingOutput {
                path: job.output_path.clone(),
            })?;

        Ok(ConversionResult {
            output_path: job.output_path,
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ConverterError::conversion_failed(
                "ffmpeg -version failed",
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
            ));
        }

        Ok(())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ImageFormat;
    use std::path::PathBuf;

    #[test]
    fn test_build_args_bitexact() {
        let converter = FfmpegConverter::with_defaults();
        let job = ConversionJob::bitexact("/work/abc.webp", "/work/abc.jpg");

        let args = converter.build_args(&job);

        assert_eq!(args[0], "-y");
        let input_idx = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input_idx - 1], "-bitexact");
        assert_eq!(args[input_idx + 1], "/work/abc.webp");
        assert_eq!(args[args.len() - 2], "-bitexact");
        assert_eq!(args.last().unwrap(), "/work/abc.jpg");
        assert!(!args.contains(&"-c:v".to_string()));
    }

    #[test]
    fn test_build_args_with_format() {
        let converter = FfmpegConverter::with_defaults();
        let job = ConversionJob {
            input_path: PathBuf::from("/in.png"),
            output_path: PathBuf::from("/out.tmp"),
            format: Some(ImageFormat::Jpeg),
            bitexact: false,
        };

        let args = converter.build_args(&job);

        assert!(!args.contains(&"-bitexact".to_string()));
        let codec_idx = args.iter().position(|a| a == "-c:v").unwrap();
        assert_eq!(args[codec_idx + 1], "mjpeg");
        let format_idx = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[format_idx + 1], "image2");
        assert_eq!(args.last().unwrap(), "/out.tmp");
    }

    #[test]
    fn test_build_args_extra_and_log_level() {
        let mut config = ConverterConfig::default();
        config.log_level = "quiet".to_string();
        config.extra_args = vec!["-hide_banner".to_string()];
        let converter = FfmpegConverter::new(config);

        let args = converter.build_args(&ConversionJob::bitexact("/a.png", "/b.jpg"));

        assert_eq!(&args[1..4], &["-loglevel", "quiet", "-hide_banner"]);
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[tokio::test]
    async fn test_convert_missing_input() {
        let converter = FfmpegConverter::with_defaults();
        let job = ConversionJob::bitexact("/nonexistent/in.webp", "/tmp/out.jpg");
        let result = converter.convert(job).await;
        assert!(matches!(result, Err(ConverterError::InputNotFound { .. })));
    }

    #[tokio::test]
    async fn test_validate_missing_binary() {
        let converter = FfmpegConverter::new(ConverterConfig::with_path(PathBuf::from(
            "/nonexistent/bin/ffmpeg",
        )));
        let result = converter.validate().await;
        assert!(matches!(result, Err(ConverterError::FfmpegNotFound { .. })));
    }
}
