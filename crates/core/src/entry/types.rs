//! Entry types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::sanitize::sanitize_file_name;

/// Extensions probed when an entry does not say which thumbnail it wrote.
const THUMBNAIL_EXTENSIONS: &[&str] = &["jpg", "jpeg", "webp", "png"];

/// Extension of the converted thumbnail kept in the working directory.
pub const CONVERTED_THUMBNAIL_EXT: &str = "jpg";

/// Raw entry metadata as written by the downloader into `{id}.info.json`.
///
/// Only the fields the pipeline relies on are typed; everything else the
/// provider writes is kept in `extra` and stays addressable by templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryInfo {
    /// Provider identifier, unique within one working directory.
    pub id: String,
    /// Media file extension.
    pub ext: String,
    /// Extension of the downloaded thumbnail, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_ext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Name of the extractor that produced the entry (e.g. "youtube").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor: Option<String>,
    /// Remote thumbnail URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Provider specific fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl EntryInfo {
    /// Creates an entry with only the required fields set.
    pub fn new(id: impl Into<String>, ext: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ext: ext.into(),
            thumbnail_ext: None,
            title: None,
            artist: None,
            extractor: None,
            thumbnail: None,
            extra: BTreeMap::new(),
        }
    }

    /// Parses an info document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_extractor(mut self, extractor: impl Into<String>) -> Self {
        self.extractor = Some(extractor.into());
        self
    }

    pub fn with_thumbnail_ext(mut self, ext: impl Into<String>) -> Self {
        self.thumbnail_ext = Some(ext.into());
        self
    }

    pub fn with_thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    /// Sets a provider specific field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// A downloaded entry with overrides merged and derived fields computed.
///
/// The field map is built once in [`Entry::merge`]; templates and pipeline
/// stages only read it afterwards. The single exception is
/// [`Entry::with_sanitized_fields`], which the pipeline applies before the
/// entry is first used.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    fields: BTreeMap<String, String>,
    working_dir: PathBuf,
    thumbnail_ext: Option<String>,
}

impl Entry {
    /// Merges `overrides` on top of `info` and derives `file_path`.
    ///
    /// Scalar JSON values become string fields; nulls, arrays and objects
    /// are not addressable by templates.
    pub fn merge(
        info: EntryInfo,
        overrides: &BTreeMap<String, String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        let working_dir = working_dir.into();
        let mut fields = BTreeMap::new();

        for (name, value) in &info.extra {
            if let Some(value) = scalar_to_string(value) {
                fields.insert(name.clone(), value);
            }
        }

        fields.insert("id".to_string(), info.id);
        fields.insert("ext".to_string(), info.ext);
        let optional = [
            ("thumbnail_ext", info.thumbnail_ext.clone()),
            ("title", info.title),
            ("artist", info.artist),
            ("extractor", info.extractor),
            ("thumbnail", info.thumbnail),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.insert(name.to_string(), value);
            }
        }

        for (name, value) in overrides {
            fields.insert(name.clone(), value.clone());
        }

        let mut entry = Self {
            thumbnail_ext: fields.get("thumbnail_ext").cloned(),
            fields,
            working_dir,
        };
        let file_path = entry.file_path();
        entry
            .fields
            .insert("file_path".to_string(), file_path.to_string_lossy().to_string());
        entry
    }

    /// Adds `sanitized_title` and `sanitized_artist` derived from the
    /// merged `title` and `artist`.
    pub fn with_sanitized_fields(mut self) -> Self {
        for (source, target) in [("title", "sanitized_title"), ("artist", "sanitized_artist")] {
            if let Some(value) = self.fields.get(source) {
                let sanitized = sanitize_file_name(value);
                self.fields.insert(target.to_string(), sanitized);
            }
        }
        self
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// All merged fields.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn id(&self) -> &str {
        self.get("id").unwrap_or_default()
    }

    pub fn ext(&self) -> &str {
        self.get("ext").unwrap_or_default()
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    /// Remote thumbnail URL, if the provider supplied one.
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.get("thumbnail")
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Path of the downloaded media file.
    pub fn file_path(&self) -> PathBuf {
        self.working_dir
            .join(format!("{}.{}", self.id(), self.ext()))
    }

    /// Path of the thumbnail the downloader wrote, if it exists.
    ///
    /// Uses `thumbnail_ext` when known, otherwise probes the usual image
    /// extensions.
    pub fn downloaded_thumbnail_path(&self) -> Option<PathBuf> {
        match &self.thumbnail_ext {
            Some(ext) => {
                let path = self.working_dir.join(format!("{}.{}", self.id(), ext));
                path.is_file().then_some(path)
            }
            None => THUMBNAIL_EXTENSIONS
                .iter()
                .map(|ext| self.working_dir.join(format!("{}.{}", self.id(), ext)))
                .find(|path| path.is_file()),
        }
    }

    /// Path of the converted thumbnail in the working directory.
    pub fn converted_thumbnail_path(&self) -> PathBuf {
        self.working_dir
            .join(format!("{}.{}", self.id(), CONVERTED_THUMBNAIL_EXT))
    }
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn overrides(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_derives_file_path() {
        let info = EntryInfo::new("abc", "mp4").with_title("T");
        let entry = Entry::merge(info, &BTreeMap::new(), "/work/sub");

        assert_eq!(entry.file_path(), PathBuf::from("/work/sub/abc.mp4"));
        assert_eq!(entry.get("file_path"), Some("/work/sub/abc.mp4"));
        assert_eq!(entry.title(), Some("T"));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let info = EntryInfo::new("abc", "mp4")
            .with_artist("Original")
            .with_field("genre", "rock");
        let entry = Entry::merge(
            info,
            &overrides(&[("artist", "Override"), ("album", "Singles")]),
            "/work",
        );

        assert_eq!(entry.get("artist"), Some("Override"));
        assert_eq!(entry.get("album"), Some("Singles"));
        assert_eq!(entry.get("genre"), Some("rock"));
    }

    #[test]
    fn test_file_path_uses_overridden_ext() {
        let info = EntryInfo::new("abc", "webm");
        let entry = Entry::merge(info, &overrides(&[("ext", "mkv")]), "/work");
        assert_eq!(entry.get("file_path"), Some("/work/abc.mkv"));
    }

    #[test]
    fn test_scalar_extra_fields_are_stringified() {
        let info = EntryInfo::new("abc", "mp4")
            .with_field("duration", 212)
            .with_field("is_live", false)
            .with_field("tags", serde_json::json!(["a", "b"]))
            .with_field("release", serde_json::Value::Null);
        let entry = Entry::merge(info, &BTreeMap::new(), "/work");

        assert_eq!(entry.get("duration"), Some("212"));
        assert_eq!(entry.get("is_live"), Some("false"));
        assert_eq!(entry.get("tags"), None);
        assert_eq!(entry.get("release"), None);
    }

    #[test]
    fn test_sanitized_fields_follow_overrides() {
        let info = EntryInfo::new("abc", "mp4")
            .with_title("What? / Why")
            .with_artist("AC/DC");
        let entry = Entry::merge(info, &overrides(&[("artist", "A:B")]), "/work")
            .with_sanitized_fields();

        assert_eq!(entry.get("sanitized_title"), Some("What  Why"));
        assert_eq!(entry.get("sanitized_artist"), Some("AB"));
    }

    #[test]
    fn test_sanitized_fields_skip_absent_sources() {
        let entry = Entry::merge(EntryInfo::new("abc", "mp4"), &BTreeMap::new(), "/work")
            .with_sanitized_fields();
        assert_eq!(entry.get("sanitized_title"), None);
        assert_eq!(entry.get("sanitized_artist"), None);
    }

    #[test]
    fn test_parse_info_json() {
        let json = br#"{
            "id": "abc123",
            "ext": "mp4",
            "title": "My Video",
            "extractor": "youtube",
            "thumbnail": "https://i.example.com/abc123.webp",
            "view_count": 42
        }"#;
        let info = EntryInfo::from_slice(json).unwrap();
        assert_eq!(info.id, "abc123");
        assert_eq!(info.extractor.as_deref(), Some("youtube"));
        assert_eq!(info.extra.get("view_count"), Some(&serde_json::json!(42)));
    }

    #[test]
    fn test_parse_rejects_playlist_info() {
        let json = br#"{"id": "PL1", "_type": "playlist", "title": "Uploads"}"#;
        assert!(EntryInfo::from_slice(json).is_err());
    }

    #[test]
    fn test_downloaded_thumbnail_probe() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("abc.webp"), b"img").unwrap();

        let entry = Entry::merge(EntryInfo::new("abc", "mp4"), &BTreeMap::new(), dir.path());
        assert_eq!(
            entry.downloaded_thumbnail_path(),
            Some(dir.path().join("abc.webp"))
        );
        assert_eq!(entry.converted_thumbnail_path(), dir.path().join("abc.jpg"));
    }

    #[test]
    fn test_downloaded_thumbnail_uses_declared_ext() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("abc.webp"), b"img").unwrap();

        let info = EntryInfo::new("abc", "mp4").with_thumbnail_ext("png");
        let entry = Entry::merge(info, &BTreeMap::new(), dir.path());
        assert_eq!(entry.downloaded_thumbnail_path(), None);
    }
}
