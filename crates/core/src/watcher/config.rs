//! Watcher configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the sidecar watcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Delay between polls (milliseconds). Also bounds cancellation latency.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval() -> u64 {
    100
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl WatcherConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval() {
        assert_eq!(WatcherConfig::default().poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_deserialize_empty() {
        let config: WatcherConfig = toml::from_str("").unwrap();
        assert_eq!(config.poll_interval_ms, 100);
    }
}
