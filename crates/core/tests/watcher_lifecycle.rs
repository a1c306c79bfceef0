//! Sidecar watcher lifecycle integration tests.
//!
//! These tests run the watcher on its worker against a real directory:
//! - Titles reported once while running
//! - Partially written sidecars retried until complete
//! - Cancellation latency bounded by the poll interval

use std::path::Path;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tokio::sync::mpsc;

use subsync_core::watcher::{SidecarWatcher, WatcherConfig, WatcherEvent};

const POLL: Duration = Duration::from_millis(20);

fn config() -> WatcherConfig {
    WatcherConfig::default().with_poll_interval(POLL)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<WatcherEvent>) -> Vec<String> {
    let mut titles = Vec::new();
    while let Ok(WatcherEvent::Downloading { title, .. }) = rx.try_recv() {
        titles.push(title);
    }
    titles
}

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("Failed to write sidecar");
}

#[tokio::test]
async fn test_running_watcher_reports_title_once() {
    let dir = TempDir::new().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = SidecarWatcher::new(dir.path(), "youtube", &config())
        .with_events(tx)
        .spawn();

    write(
        dir.path(),
        "abc123.info.json",
        r#"{"extractor":"youtube","title":"My Video"}"#,
    );
    tokio::time::sleep(POLL * 5).await;

    let watcher = handle.stop().await.unwrap();
    assert_eq!(drain(&mut rx), vec!["My Video"]);
    assert!(watcher.is_seen(Path::new("abc123.info.json")));
}

#[tokio::test]
async fn test_partial_sidecar_reported_after_completion() {
    let dir = TempDir::new().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = SidecarWatcher::new(dir.path(), "youtube", &config())
        .with_events(tx)
        .spawn();

    write(dir.path(), "abc.info.json", r#"{"extractor":"youtube","ti"#);
    tokio::time::sleep(POLL * 3).await;
    assert!(drain(&mut rx).is_empty());

    write(
        dir.path(),
        "abc.info.json",
        r#"{"extractor":"youtube","title":"Finished"}"#,
    );
    tokio::time::sleep(POLL * 5).await;

    let watcher = handle.stop().await.unwrap();
    assert_eq!(drain(&mut rx), vec!["Finished"]);
    assert_eq!(watcher.seen_count(), 1);
}

#[tokio::test]
async fn test_other_extractors_and_nested_sidecars() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("playlist")).unwrap();
    write(
        dir.path(),
        "a.info.json",
        r#"{"extractor":"soundcloud","title":"Elsewhere"}"#,
    );
    write(
        &dir.path().join("playlist"),
        "b.info.json",
        r#"{"extractor":"youtube","title":"Nested"}"#,
    );

    let mut watcher = SidecarWatcher::new(dir.path(), "youtube", &config());
    assert_eq!(watcher.poll(), vec!["Nested"]);
    assert!(watcher.poll().is_empty());
    // Non-matching sidecars are still marked seen
    assert_eq!(watcher.seen_count(), 2);
}

#[tokio::test]
async fn test_stop_returns_within_poll_interval() {
    let dir = TempDir::new().unwrap();
    let handle = SidecarWatcher::new(dir.path(), "youtube", &config()).spawn();
    tokio::time::sleep(POLL).await;
    assert!(!handle.is_finished());

    let started = Instant::now();
    handle.stop().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}
