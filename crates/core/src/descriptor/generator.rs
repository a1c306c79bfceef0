//! Descriptor generation and XML serialization.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::entry::Entry;
use crate::template;

use super::error::DescriptorError;

/// Root element used when none is configured.
pub const DEFAULT_ROOT: &str = "root";

/// Serializes `document` as XML with one child element per key.
///
/// Keys are written in sorted order so identical inputs give identical
/// bytes.
pub fn serialize(
    document: &BTreeMap<String, String>,
    root: Option<&str>,
) -> Result<Vec<u8>, DescriptorError> {
    let root = root.unwrap_or(DEFAULT_ROOT);
    validate_name(root)?;
    for key in document.keys() {
        validate_name(key)?;
    }

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    write(&mut writer, Event::Start(BytesStart::new(root)))?;
    for (key, value) in document {
        write(&mut writer, Event::Start(BytesStart::new(key.as_str())))?;
        write(&mut writer, Event::Text(BytesText::new(value)))?;
        write(&mut writer, Event::End(BytesEnd::new(key.as_str())))?;
    }
    write(&mut writer, Event::End(BytesEnd::new(root)))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), DescriptorError> {
    writer
        .write_event(event)
        .map_err(|e| DescriptorError::Serialize {
            reason: e.to_string(),
        })
}

/// Accepts plain XML names: a letter or `_`, then letters, digits, `_`,
/// `-` or `.`.
fn validate_name(name: &str) -> Result<(), DescriptorError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(DescriptorError::InvalidElementName {
            name: name.to_string(),
        })
    }
}

/// Renders descriptor documents for entries.
#[derive(Debug, Default, Clone)]
pub struct DescriptorGenerator;

impl DescriptorGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Renders `field_templates` into a document and writes it to the
    /// destination rendered from `destination_template` under
    /// `output_path`, overwriting any existing file.
    pub async fn generate(
        &self,
        entry: &Entry,
        field_templates: &BTreeMap<String, String>,
        document_root: Option<&str>,
        destination_template: &str,
        output_path: &Path,
    ) -> Result<PathBuf, DescriptorError> {
        let document = field_templates
            .iter()
            .map(|(key, tpl)| -> Result<_, DescriptorError> {
                Ok((key.clone(), template::render(tpl, entry)?))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let bytes = serialize(&document, document_root)?;
        let destination =
            template::render_path(destination_template, entry, output_path, true).await?;

        tokio::fs::write(&destination, bytes)
            .await
            .map_err(|source| DescriptorError::Write {
                path: destination.clone(),
                source,
            })?;

        info!(entry_id = entry.id(), path = ?destination, fields = document.len(), "Wrote descriptor");
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryInfo;
    use tempfile::TempDir;

    fn doc(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn entry() -> Entry {
        let info = EntryInfo::new("abc", "mp4")
            .with_title("My Video")
            .with_artist("A")
            .with_field("upload_date", "20240101");
        Entry::merge(info, &BTreeMap::new(), "/work").with_sanitized_fields()
    }

    #[test]
    fn test_serialize_sorted_with_default_root() {
        let xml = String::from_utf8(serialize(&doc(&[("title", "T"), ("artist", "A")]), None).unwrap())
            .unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\""));
        assert!(xml.contains("<root>"));
        assert!(xml.trim_end().ends_with("</root>"));
        let artist = xml.find("<artist>A</artist>").unwrap();
        let title = xml.find("<title>T</title>").unwrap();
        assert!(artist < title);
    }

    #[test]
    fn test_serialize_custom_root() {
        let xml = String::from_utf8(serialize(&doc(&[("title", "T")]), Some("musicvideo")).unwrap())
            .unwrap();
        assert!(xml.contains("<musicvideo>"));
        assert!(xml.contains("</musicvideo>"));
        assert!(!xml.contains("<root>"));
    }

    #[test]
    fn test_serialize_escapes_text() {
        let xml = String::from_utf8(serialize(&doc(&[("title", "A & B <x")]), None).unwrap())
            .unwrap();
        assert!(xml.contains("A &amp; B &lt;x"));
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let a = serialize(&doc(&[("b", "2"), ("a", "1"), ("c", "3")]), None).unwrap();
        let b = serialize(&doc(&[("c", "3"), ("a", "1"), ("b", "2")]), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serialize_rejects_invalid_names() {
        let result = serialize(&doc(&[("has space", "x")]), None);
        assert!(matches!(result, Err(DescriptorError::InvalidElementName { name }) if name == "has space"));

        assert!(serialize(&doc(&[("1st", "x")]), None).is_err());
        assert!(serialize(&doc(&[]), Some("")).is_err());
    }

    #[tokio::test]
    async fn test_generate_writes_rendered_document() {
        let dir = TempDir::new().unwrap();
        let generator = DescriptorGenerator::new();

        let path = generator
            .generate(
                &entry(),
                &doc(&[("title", "{title}"), ("premiered", "{upload_date}")]),
                Some("musicvideo"),
                "{sanitized_artist}/{sanitized_title}.nfo",
                dir.path(),
            )
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("A/My Video.nfo"));
        let xml = std::fs::read_to_string(&path).unwrap();
        assert!(xml.contains("<title>My Video</title>"));
        assert!(xml.contains("<premiered>20240101</premiered>"));
    }

    #[tokio::test]
    async fn test_generate_overwrites_with_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let generator = DescriptorGenerator::new();
        let fields = doc(&[("title", "{title}")]);

        let path = generator
            .generate(&entry(), &fields, None, "{id}.nfo", dir.path())
            .await
            .unwrap();
        let first = std::fs::read(&path).unwrap();

        std::fs::write(&path, b"stale").unwrap();
        generator
            .generate(&entry(), &fields, None, "{id}.nfo", dir.path())
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);
    }

    #[tokio::test]
    async fn test_generate_missing_field_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let result = DescriptorGenerator::new()
            .generate(&entry(), &doc(&[("album", "{album}")]), None, "out/{id}.nfo", dir.path())
            .await;

        assert!(matches!(result, Err(DescriptorError::Template(_))));
        assert!(!dir.path().join("out").exists());
    }
}
