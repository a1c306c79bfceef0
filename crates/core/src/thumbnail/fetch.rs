//! Remote thumbnail fetching.

use async_trait::async_trait;
use std::time::Duration;

use super::error::FetchError;

/// Fetches thumbnail bytes from a URL.
#[async_trait]
pub trait ThumbnailFetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Downloads the full body at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// HTTP fetcher backed by reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a per-request timeout.
    pub fn new(request_timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("subsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Creates a fetcher around an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ThumbnailFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        if bytes.is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_fails() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1)).unwrap();
        let result = fetcher.fetch("not a url").await;
        assert!(matches!(result, Err(FetchError::Http(_))));
    }
}
