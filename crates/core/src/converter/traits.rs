//! Trait definitions for the converter module.

use async_trait::async_trait;

use super::error::ConverterError;
use super::types::{ConversionJob, ConversionResult};

/// An external tool that converts one image file into another.
///
/// Implementations are synchronous from the caller's point of view: the
/// returned future resolves once the output file is complete or the tool
/// has failed.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Runs a single conversion.
    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError>;

    /// Validates that the converter is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct EchoConverter;

    #[async_trait]
    impl Converter for EchoConverter {
        fn name(&self) -> &str {
            "echo"
        }

        async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
            Ok(ConversionResult {
                output_path: job.output_path,
                output_size_bytes: 0,
                duration_ms: 0,
            })
        }

        async fn validate(&self) -> Result<(), ConverterError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_converter_is_object_safe() {
        let converter: Box<dyn Converter> = Box::new(EchoConverter);
        let result = converter
            .convert(ConversionJob::bitexact("/in.webp", "/out.jpg"))
            .await
            .unwrap();
        assert_eq!(result.output_path, PathBuf::from("/out.jpg"));
        assert_eq!(converter.name(), "echo");
    }
}
