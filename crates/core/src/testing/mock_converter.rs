//! Mock converter for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::converter::{ConversionJob, ConversionResult, Converter, ConverterError};

/// A recorded conversion job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// The job that was submitted.
    pub job: ConversionJob,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// A successful conversion copies the input bytes to the output path, so
/// callers observe a real file where the tool would have written one.
///
/// # Example
///
/// ```rust,ignore
/// use subsync_core::testing::MockConverter;
///
/// let converter = MockConverter::new();
/// converter.set_always_fail(true).await;
///
/// assert!(converter.convert(job).await.is_err());
/// assert_eq!(converter.conversion_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockConverter {
    /// Recorded conversions.
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<ConverterError>>>,
    /// Fail every conversion.
    always_fail: Arc<RwLock<bool>>,
    /// Simulated conversion duration in milliseconds.
    conversion_duration_ms: Arc<RwLock<u64>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            always_fail: Arc::new(RwLock::new(false)),
            conversion_duration_ms: Arc::new(RwLock::new(0)),
        }
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the submitted jobs in order.
    pub async fn recorded_jobs(&self) -> Vec<ConversionJob> {
        self.conversions
            .read()
            .await
            .iter()
            .map(|c| c.job.clone())
            .collect()
    }

    /// Get the number of conversions attempted.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every conversion fail.
    pub async fn set_always_fail(&self, fail: bool) {
        *self.always_fail.write().await = fail;
    }

    /// Set the simulated conversion duration.
    pub async fn set_conversion_duration(&self, duration: Duration) {
        *self.conversion_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<ConverterError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Some(err);
        }
        if *self.always_fail.read().await {
            return Some(ConverterError::conversion_failed("mock failure", None));
        }
        None
    }

    async fn record(&self, job: ConversionJob, success: bool) {
        self.conversions
            .write()
            .await
            .push(RecordedConversion { job, success });
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
        if let Some(err) = self.take_error().await {
            self.record(job, false).await;
            return Err(err);
        }

        if !job.input_path.is_file() {
            self.record(job.clone(), false).await;
            return Err(ConverterError::InputNotFound {
                path: job.input_path,
            });
        }

        let duration_ms = *self.conversion_duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        if let Some(parent) = job.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let output_size_bytes = tokio::fs::copy(&job.input_path, &job.output_path).await?;

        self.record(job.clone(), true).await;
        Ok(ConversionResult {
            output_path: job.output_path,
            output_size_bytes,
            duration_ms,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        Ok(())
    }
}
