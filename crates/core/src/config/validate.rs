use std::path::{Component, Path};

use super::{types::Config, ConfigError};
use crate::descriptor;
use crate::template;

/// Validate configuration
/// Currently validates:
/// - Poll interval, attempt counts and timeouts are not 0
/// - Subscription names are plain directory names
/// - Every template is well formed; `nfo` comes with `nfo_name`
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.watcher.poll_interval_ms == 0 {
        return Err(invalid("watcher.poll_interval_ms cannot be 0"));
    }
    if config.thumbnail.fetch_attempts == 0 {
        return Err(invalid("thumbnail.fetch_attempts cannot be 0"));
    }
    if config.converter.timeout_secs == 0 {
        return Err(invalid("converter.timeout_secs cannot be 0"));
    }
    if config.downloader.timeout_secs == Some(0) {
        return Err(invalid("downloader.timeout_secs cannot be 0"));
    }

    for (name, subscription) in &config.subscriptions {
        let mut components = Path::new(name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(invalid(format!("subscription name {name:?} is not a directory name")));
        }

        let post_process = &subscription.post_process;
        if post_process.file_name.trim().is_empty() {
            return Err(invalid(format!(
                "subscriptions.{name}.post_process.file_name cannot be empty"
            )));
        }
        if post_process.nfo.is_some() && post_process.nfo_name.is_none() {
            return Err(invalid(format!(
                "subscriptions.{name}.post_process.nfo requires nfo_name"
            )));
        }
        if let Some(root) = &post_process.nfo_root {
            // An empty document still checks the root name
            descriptor::serialize(&Default::default(), Some(root)).map_err(|e| {
                invalid(format!("subscriptions.{name}.post_process.nfo_root: {e}"))
            })?;
        }

        for (key, tpl) in post_process.templates() {
            template::validate_syntax(tpl).map_err(|e| {
                invalid(format!("subscriptions.{name}.post_process.{key}: {e}"))
            })?;
        }
    }

    Ok(())
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(reason.into())
}
