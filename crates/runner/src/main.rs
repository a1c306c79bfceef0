use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures::future::join_all;
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subsync_core::{
    load_config, metrics, validate_config, Converter, Downloader, FfmpegConverter, HttpFetcher,
    LoftyTagWriter, PostProcessor, SubscriptionConfig, SubscriptionReport, SubscriptionRunner,
    YtDlpDownloader,
};

type Runner = SubscriptionRunner<FfmpegConverter, LoftyTagWriter, HttpFetcher>;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("SUBSYNC_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Working directory: {:?}", config.general.working_directory);
    info!("Subscriptions: {}", config.subscriptions.len());

    let subscriptions: Vec<(String, SubscriptionConfig)> = config
        .subscriptions
        .iter()
        .map(|(name, sub)| (name.clone(), sub.clone()))
        .collect();

    // Create converter
    let converter = Arc::new(FfmpegConverter::new(config.converter.clone()));
    converter
        .validate()
        .await
        .context("Converter validation failed")?;
    info!("Using converter: {}", converter.name());

    // Create downloader
    let downloader: Arc<dyn Downloader> =
        Arc::new(YtDlpDownloader::new(config.downloader.clone()));
    downloader
        .validate()
        .await
        .context("Downloader validation failed")?;
    info!("Using downloader: {}", downloader.name());

    let fetcher = Arc::new(
        HttpFetcher::new(Duration::from_secs(config.thumbnail.request_timeout_secs))
            .context("Failed to create thumbnail fetcher")?,
    );
    let processor = Arc::new(PostProcessor::new(
        converter,
        Arc::new(LoftyTagWriter::new()),
        fetcher,
        config.thumbnail.clone(),
    ));
    let runner: Arc<Runner> = Arc::new(SubscriptionRunner::new(
        downloader,
        processor,
        &config.general.working_directory,
        config.watcher.clone(),
    ));

    // One task per subscription; each owns its working directory
    let tasks = subscriptions.into_iter().map(|(name, subscription)| {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move {
            let result = runner.run(&name, &subscription).await;
            (name, result)
        })
    });

    let mut failed = 0;
    tokio::select! {
        results = join_all(tasks) => {
            for joined in results {
                match joined {
                    Ok((_, Ok(report))) => {
                        log_report(&report);
                        if !report.is_success() {
                            failed += 1;
                        }
                    }
                    Ok((name, Err(e))) => {
                        error!(subscription = %name, error = %e, "Subscription run failed");
                        failed += 1;
                    }
                    Err(e) => {
                        error!(error = %e, "Subscription task panicked");
                        failed += 1;
                    }
                }
            }
        }
        _ = shutdown_signal() => {
            warn!("Shutdown signal received, abandoning running subscriptions");
            failed += 1;
        }
    }

    if let Some(path) = &config.general.metrics_file {
        write_metrics(path).with_context(|| format!("Failed to write metrics to {:?}", path))?;
        info!("Metrics written to {:?}", path);
    }

    if failed > 0 {
        bail!("{} subscription(s) did not complete cleanly", failed);
    }
    Ok(())
}

fn log_report(report: &SubscriptionReport) {
    info!(
        run_id = %report.run_id,
        subscription = %report.subscription,
        processed = report.processed_count(),
        failed = report.failed_count(),
        titles = report.titles_reported.len(),
        "Subscription run complete"
    );
    match serde_json::to_string(report) {
        Ok(json) => info!(target: "subsync::report", "{}", json),
        Err(e) => warn!(error = %e, "Failed to serialize run report"),
    }
}

/// Writes every core metric in the Prometheus text format.
fn write_metrics(path: &Path) -> Result<()> {
    let registry = Registry::new();
    for metric in metrics::all_metrics() {
        registry.register(metric)?;
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // Write then rename so collectors never read a partial file
    let tmp = path.with_extension("prom.tmp");
    std::fs::write(&tmp, &buffer)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
