//! Subscription runner implementation.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::converter::Converter;
use crate::entry::Entry;
use crate::metrics;
use crate::processor::PostProcessor;
use crate::tagging::TagWriter;
use crate::thumbnail::ThumbnailFetcher;
use crate::watcher::{SidecarWatcher, WatcherConfig, WatcherEvent};

use super::error::SubscriptionError;
use super::traits::Downloader;
use super::types::{EntryOutcome, EntryReport, SubscriptionConfig, SubscriptionReport};

/// Runs subscriptions: watch, download, post-process.
///
/// Each subscription owns `working_root/<name>` for the duration of its
/// run, so different subscriptions can run concurrently.
pub struct SubscriptionRunner<C, T, F>
where
    C: Converter + 'static,
    T: TagWriter + 'static,
    F: ThumbnailFetcher + 'static,
{
    downloader: Arc<dyn Downloader>,
    processor: Arc<PostProcessor<C, T, F>>,
    working_root: PathBuf,
    watcher_config: WatcherConfig,
}

impl<C, T, F> SubscriptionRunner<C, T, F>
where
    C: Converter + 'static,
    T: TagWriter + 'static,
    F: ThumbnailFetcher + 'static,
{
    /// Create a new runner.
    pub fn new(
        downloader: Arc<dyn Downloader>,
        processor: Arc<PostProcessor<C, T, F>>,
        working_root: impl Into<PathBuf>,
        watcher_config: WatcherConfig,
    ) -> Self {
        Self {
            downloader,
            processor,
            working_root: working_root.into(),
            watcher_config,
        }
    }

    /// Working directory of the subscription called `name`.
    pub fn working_dir(&self, name: &str) -> PathBuf {
        self.working_root.join(name)
    }

    /// Runs one subscription to completion.
    ///
    /// The working directory is emptied first, so only entries written by
    /// this run's download are reported and post-processed.
    ///
    /// A failing entry is recorded in the report and the remaining entries
    /// are still processed.
    pub async fn run(
        &self,
        name: &str,
        subscription: &SubscriptionConfig,
    ) -> Result<SubscriptionReport, SubscriptionError> {
        validate_name(name)?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let working_dir = self.working_dir(name);
        reset_working_dir(&working_dir).await?;

        info!(
            %run_id,
            subscription = name,
            url = subscription.source.url(),
            downloader = self.downloader.name(),
            "Starting subscription run"
        );

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let watcher = SidecarWatcher::new(
            &working_dir,
            subscription.source.extractor(),
            &self.watcher_config,
        )
        .with_events(events_tx)
        .spawn();

        let download_started = Instant::now();
        let downloaded = self
            .downloader
            .download(&subscription.source, &working_dir, &subscription.download_args)
            .await;

        // Stop the watcher whatever the download outcome
        watcher.stop().await?;

        let result = if downloaded.is_ok() { "success" } else { "failed" };
        metrics::DOWNLOADS_TOTAL.with_label_values(&[result]).inc();
        metrics::DOWNLOAD_DURATION
            .with_label_values(&[result])
            .observe(download_started.elapsed().as_secs_f64());

        let infos = downloaded.inspect_err(|e| {
            error!(%run_id, subscription = name, error = %e, "Download failed");
        })?;

        let mut titles_reported = Vec::new();
        while let Ok(WatcherEvent::Downloading { title, .. }) = events_rx.try_recv() {
            titles_reported.push(title);
        }

        let mut entries = Vec::with_capacity(infos.len());
        for info in infos {
            let entry = Entry::merge(info, &subscription.overrides, &working_dir);
            entries.push(self.process_entry(&entry, subscription).await);
        }

        let report = SubscriptionReport {
            run_id,
            subscription: name.to_string(),
            started_at,
            finished_at: Utc::now(),
            titles_reported,
            entries,
        };

        info!(
            %run_id,
            subscription = name,
            processed = report.processed_count(),
            failed = report.failed_count(),
            "Subscription run finished"
        );
        Ok(report)
    }

    async fn process_entry(&self, entry: &Entry, subscription: &SubscriptionConfig) -> EntryReport {
        let outcome = match self
            .processor
            .run(entry, &subscription.post_process, &subscription.output_path)
            .await
        {
            Ok(result) => EntryOutcome::Processed(result),
            Err(e) => {
                warn!(entry_id = entry.id(), stage = e.stage(), error = %e, "Entry failed");
                EntryOutcome::Failed {
                    stage: e.stage().to_string(),
                    error: e.to_string(),
                }
            }
        };

        EntryReport {
            entry_id: entry.id().to_string(),
            title: entry.title().map(str::to_string),
            outcome,
        }
    }
}

/// Empties `working_dir` so a run only sees what its own download writes.
async fn reset_working_dir(working_dir: &Path) -> Result<(), SubscriptionError> {
    let error = |source| SubscriptionError::WorkingDirectory {
        path: working_dir.to_path_buf(),
        source,
    };

    match tokio::fs::remove_dir_all(working_dir).await {
        Ok(()) => debug!(dir = ?working_dir, "Cleared previous working directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(error(e)),
    }
    tokio::fs::create_dir_all(working_dir).await.map_err(error)
}

/// A subscription name must be a single plain path component.
fn validate_name(name: &str) -> Result<(), SubscriptionError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(SubscriptionError::InvalidName {
            name: name.to_string(),
        }),
    }
}
