//! Mock thumbnail fetcher for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::thumbnail::{FetchError, ThumbnailFetcher};

/// Mock implementation of the ThumbnailFetcher trait.
///
/// Returns the configured body for every URL. Failures are simulated as
/// empty responses.
#[derive(Debug, Clone)]
pub struct MockFetcher {
    /// Body returned by successful fetches.
    response: Arc<RwLock<Vec<u8>>>,
    /// Requested URLs, in order.
    requests: Arc<RwLock<Vec<String>>>,
    /// Number of upcoming fetches that fail.
    failures_remaining: Arc<RwLock<u32>>,
    /// Fail every fetch.
    always_fail: Arc<RwLock<bool>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Create a new mock fetcher returning a small placeholder body.
    pub fn new() -> Self {
        Self {
            response: Arc::new(RwLock::new(b"thumbnail".to_vec())),
            requests: Arc::new(RwLock::new(Vec::new())),
            failures_remaining: Arc::new(RwLock::new(0)),
            always_fail: Arc::new(RwLock::new(false)),
        }
    }

    /// Set the body returned by successful fetches.
    pub async fn set_response(&self, body: Vec<u8>) {
        *self.response.write().await = body;
    }

    /// Fail the next `count` fetches.
    pub async fn fail_next(&self, count: u32) {
        *self.failures_remaining.write().await = count;
    }

    /// Make every fetch fail.
    pub async fn set_always_fail(&self, fail: bool) {
        *self.always_fail.write().await = fail;
    }

    /// Get the requested URLs.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Get the number of fetches attempted.
    pub async fn fetch_count(&self) -> usize {
        self.requests.read().await.len()
    }

    async fn should_fail(&self) -> bool {
        if *self.always_fail.read().await {
            return true;
        }
        let mut remaining = self.failures_remaining.write().await;
        if *remaining > 0 {
            *remaining -= 1;
            return true;
        }
        false
    }
}

#[async_trait]
impl ThumbnailFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.write().await.push(url.to_string());

        if self.should_fail().await {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(self.response.read().await.clone())
    }
}
