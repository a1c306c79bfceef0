//! Configuration for the processor module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::converter::ImageFormat;

/// Post-processing configuration of one subscription.
///
/// Every stage except the media copy is selected by the presence of its
/// key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostProcessConfig {
    /// Media destination template, relative to the output path.
    pub file_name: String,

    /// Tag name to value template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagging: Option<BTreeMap<String, String>>,

    /// Descriptor element name to value template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nfo: Option<BTreeMap<String, String>>,

    /// Descriptor destination template. Required when `nfo` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nfo_name: Option<String>,

    /// Descriptor root element. Defaults to `root`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nfo_root: Option<String>,

    /// Thumbnail destination template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_name: Option<String>,

    /// Re-encode the placed thumbnail to this format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convert_thumbnail: Option<ImageFormat>,

    /// Fetch the entry's thumbnail URL when nothing was downloaded.
    #[serde(default = "default_thumbnail_from_url")]
    pub thumbnail_from_url: bool,
}

fn default_thumbnail_from_url() -> bool {
    true
}

impl PostProcessConfig {
    /// Creates a configuration that only places the media file.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            tagging: None,
            nfo: None,
            nfo_name: None,
            nfo_root: None,
            thumbnail_name: None,
            convert_thumbnail: None,
            thumbnail_from_url: default_thumbnail_from_url(),
        }
    }

    pub fn with_tagging(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tagging = Some(tags);
        self
    }

    /// Enables the descriptor stage.
    pub fn with_nfo(mut self, fields: BTreeMap<String, String>, name: impl Into<String>) -> Self {
        self.nfo = Some(fields);
        self.nfo_name = Some(name.into());
        self
    }

    pub fn with_nfo_root(mut self, root: impl Into<String>) -> Self {
        self.nfo_root = Some(root.into());
        self
    }

    pub fn with_thumbnail(mut self, name: impl Into<String>) -> Self {
        self.thumbnail_name = Some(name.into());
        self
    }

    pub fn with_convert_thumbnail(mut self, format: ImageFormat) -> Self {
        self.convert_thumbnail = Some(format);
        self
    }

    pub fn with_thumbnail_from_url(mut self, enabled: bool) -> Self {
        self.thumbnail_from_url = enabled;
        self
    }

    /// All templates with the key they were configured under.
    pub fn templates(&self) -> Vec<(String, &str)> {
        let mut templates = vec![("file_name".to_string(), self.file_name.as_str())];
        if let Some(name) = &self.thumbnail_name {
            templates.push(("thumbnail_name".to_string(), name.as_str()));
        }
        if let Some(name) = &self.nfo_name {
            templates.push(("nfo_name".to_string(), name.as_str()));
        }
        for (section, map) in [("tagging", &self.tagging), ("nfo", &self.nfo)] {
            if let Some(map) = map {
                for (key, tpl) in map {
                    templates.push((format!("{section}.{key}"), tpl.as_str()));
                }
            }
        }
        templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let config: PostProcessConfig = toml::from_str(r#"file_name = "{id}.{ext}""#).unwrap();
        assert_eq!(config, PostProcessConfig::new("{id}.{ext}"));
        assert!(config.thumbnail_from_url);
    }

    #[test]
    fn test_deserialize_full() {
        let toml_str = r#"
            file_name = "{sanitized_artist}/{sanitized_title}.{ext}"
            thumbnail_name = "{sanitized_artist}/{sanitized_title}.jpg"
            convert_thumbnail = "jpg"
            thumbnail_from_url = false
            nfo_name = "{sanitized_artist}/{sanitized_title}.nfo"
            nfo_root = "musicvideo"

            [tagging]
            title = "{title}"
            artist = "{artist}"

            [nfo]
            title = "{title}"
        "#;

        let config: PostProcessConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.convert_thumbnail, Some(ImageFormat::Jpeg));
        assert!(!config.thumbnail_from_url);
        assert_eq!(config.tagging.as_ref().unwrap().len(), 2);
        assert_eq!(config.nfo_root.as_deref(), Some("musicvideo"));
    }

    #[test]
    fn test_rejects_unknown_format() {
        let result = toml::from_str::<PostProcessConfig>(
            "file_name = \"x\"\nconvert_thumbnail = \"bmp\"",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_templates_lists_every_key() {
        let config = PostProcessConfig::new("{id}.{ext}")
            .with_thumbnail("{id}.jpg")
            .with_tagging(BTreeMap::from([("title".to_string(), "{title}".to_string())]));

        let keys: Vec<String> = config.templates().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["file_name", "thumbnail_name", "tagging.title"]);
    }
}
