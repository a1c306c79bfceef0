//! Template rendering against entry fields.
//!
//! Templates use `{field}` placeholders resolved against a merged
//! [`Entry`]. `{{` and `}}` produce literal braces. Rendering is
//! all-or-nothing: a single unknown field fails the whole call.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::entry::Entry;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}").expect("placeholder regex is valid"));

/// Errors produced while rendering templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template references a field the entry does not have.
    #[error("Template field not found: {field} (template: {template:?})")]
    MissingField { field: String, template: String },

    /// A rendered path would leave the base directory.
    #[error("Rendered path escapes the output directory: {rendered:?}")]
    EscapesBase { rendered: String },

    /// A path template rendered to nothing.
    #[error("Template rendered an empty path: {template:?}")]
    EmptyPath { template: String },

    /// The template is malformed.
    #[error("Invalid template {template:?}: {reason}")]
    Syntax { template: String, reason: String },

    /// Parent directories could not be created.
    #[error("Failed to create directory: {path}")]
    CreateDirs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TemplateError {
    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>, template: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            template: template.into(),
        }
    }
}

/// Renders `template` against `entry`.
pub fn render(template: &str, entry: &Entry) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);

        match caps.get(1) {
            Some(name) => {
                let value = entry
                    .get(name.as_str())
                    .ok_or_else(|| TemplateError::missing_field(name.as_str(), template))?;
                out.push_str(value);
            }
            None if whole.as_str() == "{{" => out.push('{'),
            None => out.push('}'),
        }
        last = whole.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}

/// Renders `template` and joins it under `base_path`.
///
/// With `create_dirs`, every missing parent directory of the result exists
/// when this returns.
pub async fn render_path(
    template: &str,
    entry: &Entry,
    base_path: &Path,
    create_dirs: bool,
) -> Result<PathBuf, TemplateError> {
    let rendered = render(template, entry)?;
    if rendered.trim().is_empty() {
        return Err(TemplateError::EmptyPath {
            template: template.to_string(),
        });
    }

    let relative = Path::new(&rendered);
    let escapes = relative.is_absolute()
        || relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(TemplateError::EscapesBase { rendered });
    }

    let path = base_path.join(relative);
    if create_dirs {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| TemplateError::CreateDirs {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
    }

    Ok(path)
}

/// Checks that every brace in `template` is part of a placeholder or an
/// escape, and that no placeholder is empty.
pub fn validate_syntax(template: &str) -> Result<(), TemplateError> {
    let syntax = |reason: &str| TemplateError::Syntax {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if template[last..whole.start()].contains(['{', '}']) {
            return Err(syntax("unbalanced brace"));
        }
        if caps.get(1).is_some_and(|name| name.as_str().trim().is_empty()) {
            return Err(syntax("empty placeholder"));
        }
        last = whole.end();
    }

    if template[last..].contains(['{', '}']) {
        return Err(syntax("unbalanced brace"));
    }
    Ok(())
}

/// Field names referenced by `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}
