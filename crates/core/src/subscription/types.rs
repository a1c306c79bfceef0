//! Types for the subscription module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

use crate::processor::{PostProcessConfig, PostProcessResult};

/// Where a subscription downloads from.
///
/// Written as a table keyed by the source kind, e.g.
/// `[subscriptions.name.youtube]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionSource {
    Youtube { url: String },
    Soundcloud { url: String },
}

impl SubscriptionSource {
    /// Extractor name the downloader writes into sidecars for this source.
    pub fn extractor(&self) -> &'static str {
        match self {
            Self::Youtube { .. } => "youtube",
            Self::Soundcloud { .. } => "soundcloud",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Youtube { url } | Self::Soundcloud { url } => url,
        }
    }
}

/// One configured subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    #[serde(flatten)]
    pub source: SubscriptionSource,

    /// Post-processing applied to every entry.
    pub post_process: PostProcessConfig,

    /// Fields merged on top of every entry.
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,

    /// Base directory for final artifacts.
    pub output_path: PathBuf,

    /// Extra downloader arguments for this subscription.
    #[serde(default)]
    pub download_args: Vec<String>,
}

/// Outcome of post-processing one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EntryOutcome {
    Processed(PostProcessResult),
    Failed { stage: String, error: String },
}

/// Per-entry line of a run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryReport {
    pub entry_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub outcome: EntryOutcome,
}

/// Report of one subscription run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionReport {
    pub run_id: Uuid,
    pub subscription: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Titles the watcher reported while downloading.
    pub titles_reported: Vec<String>,
    pub entries: Vec<EntryReport>,
}

impl SubscriptionReport {
    pub fn processed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, EntryOutcome::Processed(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.processed_count()
    }

    /// Whether every entry was processed.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_youtube_subscription() {
        let toml_str = r#"
            output_path = "/media/videos"
            download_args = ["--dateafter", "now-2weeks"]

            [youtube]
            url = "https://www.youtube.com/@channel/videos"

            [post_process]
            file_name = "{sanitized_title}.{ext}"

            [overrides]
            artist = "Channel"
        "#;

        let config: SubscriptionConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.source.extractor(), "youtube");
        assert_eq!(config.source.url(), "https://www.youtube.com/@channel/videos");
        assert_eq!(config.overrides.get("artist").map(String::as_str), Some("Channel"));
        assert_eq!(config.download_args.len(), 2);
    }

    #[test]
    fn test_deserialize_soundcloud_subscription() {
        let toml_str = r#"
            output_path = "/media/music"

            [soundcloud]
            url = "https://soundcloud.com/artist"

            [post_process]
            file_name = "{id}.{ext}"
        "#;

        let config: SubscriptionConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.source.extractor(), "soundcloud");
        assert!(config.overrides.is_empty());
    }

    #[test]
    fn test_missing_source_rejected() {
        let toml_str = r#"
            output_path = "/media"

            [post_process]
            file_name = "{id}.{ext}"
        "#;
        assert!(toml::from_str::<SubscriptionConfig>(toml_str).is_err());
    }

    #[test]
    fn test_report_counts() {
        let report = SubscriptionReport {
            run_id: Uuid::new_v4(),
            subscription: "chan".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            titles_reported: vec![],
            entries: vec![EntryReport {
                entry_id: "a".to_string(),
                title: None,
                outcome: EntryOutcome::Failed {
                    stage: "copy".to_string(),
                    error: "boom".to_string(),
                },
            }],
        };

        assert_eq!(report.processed_count(), 0);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.is_success());

        let json = serde_json::to_string(&report.entries[0]).unwrap();
        assert!(json.contains(r#""result":"failed""#));
    }
}
