use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::converter::ConverterConfig;
use crate::subscription::{DownloaderConfig, SubscriptionConfig};
use crate::thumbnail::ThumbnailConfig;
use crate::watcher::WatcherConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub downloader: DownloaderConfig,
    #[serde(default)]
    pub watcher: WatcherConfig,
    #[serde(default)]
    pub thumbnail: ThumbnailConfig,
    /// Subscriptions by name. The name is also the working directory name.
    #[serde(default)]
    pub subscriptions: BTreeMap<String, SubscriptionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Parent of every subscription's working directory.
    #[serde(default = "default_working_directory")]
    pub working_directory: PathBuf,
    /// Prometheus textfile written after every run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            working_directory: default_working_directory(),
            metrics_file: None,
        }
    }
}

fn default_working_directory() -> PathBuf {
    PathBuf::from(".subsync/working")
}
