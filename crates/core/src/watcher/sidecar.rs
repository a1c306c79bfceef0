//! Sidecar watcher implementation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::metrics;

use super::config::WatcherConfig;
use super::error::WatcherError;
use super::types::WatcherEvent;

/// Extension of sidecar metadata files.
const SIDECAR_EXT: &str = "json";

/// Watches one working directory for sidecar files.
///
/// The seen-set is owned by the watcher and never shared; a running
/// watcher is moved onto its worker and handed back by
/// [`WatcherHandle::stop`].
#[derive(Debug)]
pub struct SidecarWatcher {
    working_dir: PathBuf,
    extractor: String,
    poll_interval: Duration,
    /// Sidecars parsed successfully, relative to `working_dir`.
    seen: HashSet<PathBuf>,
    events: Option<mpsc::UnboundedSender<WatcherEvent>>,
}

impl SidecarWatcher {
    /// Creates a watcher for `working_dir` reporting entries from `extractor`.
    pub fn new(
        working_dir: impl Into<PathBuf>,
        extractor: impl Into<String>,
        config: &WatcherConfig,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            extractor: extractor.into(),
            poll_interval: config.poll_interval(),
            seen: HashSet::new(),
            events: None,
        }
    }

    /// Sends a [`WatcherEvent`] for every reported title.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<WatcherEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn extractor(&self) -> &str {
        &self.extractor
    }

    /// Whether the sidecar at `relative` has been parsed.
    pub fn is_seen(&self, relative: &Path) -> bool {
        self.seen.contains(relative)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Scans the working directory once and returns the titles reported.
    pub fn poll(&mut self) -> Vec<String> {
        let mut reported = Vec::new();

        let sidecars: Vec<PathBuf> = WalkDir::new(&self.working_dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(SIDECAR_EXT))
            .collect();

        for path in sidecars {
            let relative = path
                .strip_prefix(&self.working_dir)
                .unwrap_or(&path)
                .to_path_buf();
            if self.seen.contains(&relative) {
                continue;
            }

            let document = match read_sidecar(&path) {
                Ok(document) => document,
                Err(reason) => {
                    metrics::SIDECAR_PARSE_FAILURES.inc();
                    debug!(path = ?relative, %reason, "Sidecar not readable yet, retrying next poll");
                    continue;
                }
            };
            self.seen.insert(relative.clone());

            let extractor = document.get("extractor").and_then(|v| v.as_str());
            if extractor != Some(self.extractor.as_str()) {
                continue;
            }
            let Some(title) = document.get("title").and_then(|v| v.as_str()) else {
                debug!(path = ?relative, "Sidecar has no title");
                continue;
            };

            info!("Downloading {}", title);
            metrics::TITLES_REPORTED.inc();
            if let Some(tx) = &self.events {
                let _ = tx.send(WatcherEvent::Downloading {
                    title: title.to_string(),
                    sidecar: relative,
                });
            }
            reported.push(title.to_string());
        }

        reported
    }

    /// Polls until `cancel` is set, checking it before every poll.
    pub fn run_blocking(&mut self, cancel: &AtomicBool) {
        debug!(dir = ?self.working_dir, extractor = %self.extractor, "Watcher started");
        while !cancel.load(Ordering::SeqCst) {
            self.poll();
            std::thread::sleep(self.poll_interval);
        }
        debug!(dir = ?self.working_dir, seen = self.seen.len(), "Watcher stopped");
    }

    /// Runs the watcher on a dedicated blocking worker.
    pub fn spawn(self) -> WatcherHandle {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let task = tokio::task::spawn_blocking(move || {
            let mut watcher = self;
            watcher.run_blocking(&flag);
            watcher
        });

        WatcherHandle { cancel, task }
    }
}

fn read_sidecar(path: &Path) -> Result<serde_json::Value, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    serde_json::from_slice(&bytes).map_err(|e| e.to_string())
}

/// Handle to a watcher running on its worker.
#[derive(Debug)]
pub struct WatcherHandle {
    cancel: Arc<AtomicBool>,
    task: JoinHandle<SidecarWatcher>,
}

impl WatcherHandle {
    /// Sets the cancellation flag without waiting.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the watcher and waits for its loop to exit.
    ///
    /// Returns within roughly one poll interval.
    pub async fn stop(self) -> Result<SidecarWatcher, WatcherError> {
        self.cancel();
        Ok(self.task.await?)
    }
}
