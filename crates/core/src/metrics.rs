//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Watcher (reported titles, unreadable sidecars)
//! - Thumbnails (fetch attempts, conversions)
//! - Post-processing (entries, stage failures, duration)
//! - Downloads (runs, duration)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Watcher Metrics
// =============================================================================

/// Titles reported by sidecar watchers.
pub static TITLES_REPORTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "subsync_titles_reported_total",
        "Total entry titles reported by sidecar watchers",
    )
    .unwrap()
});

/// Sidecar reads that failed and were deferred to the next poll.
pub static SIDECAR_PARSE_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "subsync_sidecar_parse_failures_total",
        "Total sidecar reads deferred because the file was incomplete",
    )
    .unwrap()
});

// =============================================================================
// Thumbnail Metrics
// =============================================================================

/// Fetch-and-convert attempts for remote thumbnails.
pub static THUMBNAIL_FETCH_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subsync_thumbnail_fetch_attempts_total",
            "Total remote thumbnail fetch-and-convert attempts",
        ),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

/// Thumbnail conversions of local files.
pub static THUMBNAIL_CONVERSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subsync_thumbnail_conversions_total",
            "Total local thumbnail conversions",
        ),
        &["kind", "result"], // kind: "local", "in_place"
    )
    .unwrap()
});

// =============================================================================
// Post-Processing Metrics
// =============================================================================

/// Entries post-processed by result.
pub static ENTRIES_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subsync_entries_processed_total",
            "Total entries run through post-processing",
        ),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Post-processing failures by stage.
pub static STAGE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subsync_stage_failures_total",
            "Total post-processing failures by stage",
        ),
        &["stage"], // "tagging", "copy", "thumbnail", "descriptor", "template"
    )
    .unwrap()
});

/// Post-processing duration in seconds.
pub static POST_PROCESS_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subsync_post_process_duration_seconds",
            "Duration of post-processing per entry",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Download Metrics
// =============================================================================

/// Downloader runs by result.
pub static DOWNLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subsync_downloads_total", "Total downloader runs"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Downloader run duration in seconds.
pub static DOWNLOAD_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subsync_download_duration_seconds",
            "Duration of downloader runs",
        )
        .buckets(vec![1.0, 10.0, 30.0, 60.0, 300.0, 900.0, 3600.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Watcher
        Box::new(TITLES_REPORTED.clone()),
        Box::new(SIDECAR_PARSE_FAILURES.clone()),
        // Thumbnails
        Box::new(THUMBNAIL_FETCH_ATTEMPTS.clone()),
        Box::new(THUMBNAIL_CONVERSIONS.clone()),
        // Post-processing
        Box::new(ENTRIES_PROCESSED.clone()),
        Box::new(STAGE_FAILURES.clone()),
        Box::new(POST_PROCESS_DURATION.clone()),
        // Downloads
        Box::new(DOWNLOADS_TOTAL.clone()),
        Box::new(DOWNLOAD_DURATION.clone()),
    ]
}
