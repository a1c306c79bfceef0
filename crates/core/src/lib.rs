pub mod config;
pub mod converter;
pub mod descriptor;
pub mod entry;
pub mod metrics;
pub mod processor;
pub mod subscription;
pub mod tagging;
pub mod template;
pub mod testing;
pub mod thumbnail;
pub mod watcher;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, GeneralConfig,
};
pub use converter::{
    ConversionJob, ConversionResult, Converter, ConverterConfig, ConverterError, FfmpegConverter,
    ImageFormat,
};
pub use descriptor::{DescriptorError, DescriptorGenerator};
pub use entry::{sanitize_file_name, Entry, EntryInfo};
pub use processor::{
    PostProcessConfig, PostProcessError, PostProcessResult, PostProcessor, ThumbnailOutcome,
};
pub use subscription::{
    Downloader, DownloaderConfig, DownloadError, EntryOutcome, EntryReport, SubscriptionConfig,
    SubscriptionError, SubscriptionReport, SubscriptionRunner, SubscriptionSource,
    YtDlpDownloader,
};
pub use tagging::{LoftyTagWriter, TagWriter, TaggingError, TaggingProcessor};
pub use template::{render, render_path, TemplateError};
pub use thumbnail::{
    HttpFetcher, LocalThumbnail, ThumbnailConfig, ThumbnailError, ThumbnailFetcher,
    ThumbnailProcessor, UrlThumbnail,
};
pub use watcher::{SidecarWatcher, WatcherConfig, WatcherError, WatcherEvent, WatcherHandle};
