//! Tagging processor implementation.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::entry::Entry;
use crate::template;

use super::error::TaggingError;
use super::traits::TagWriter;

/// Renders tag templates and writes them into the entry's media file.
pub struct TaggingProcessor<W: TagWriter> {
    writer: Arc<W>,
}

impl<W: TagWriter> TaggingProcessor<W> {
    pub fn new(writer: Arc<W>) -> Self {
        Self { writer }
    }

    /// Tags the entry's media file and returns the number of tags written.
    ///
    /// Every template is rendered before the file is touched, so a missing
    /// field leaves the file unchanged.
    pub async fn apply_tags(
        &self,
        entry: &Entry,
        tag_templates: &BTreeMap<String, String>,
    ) -> Result<usize, TaggingError> {
        let tags = tag_templates
            .iter()
            .map(|(name, tpl)| -> Result<_, TaggingError> {
                Ok((name.clone(), template::render(tpl, entry)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if tags.is_empty() {
            debug!(entry_id = entry.id(), "No tags configured");
            return Ok(0);
        }

        let path = entry.file_path();
        self.writer.write_tags(&path, &tags).await?;

        info!(entry_id = entry.id(), ?path, count = tags.len(), "Tagged media file");
        Ok(tags.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryInfo;
    use crate::template::TemplateError;
    use crate::testing::MockTagWriter;

    fn entry() -> Entry {
        let info = EntryInfo::new("abc", "mp3").with_title("T").with_artist("A");
        Entry::merge(info, &BTreeMap::new(), "/work")
    }

    fn templates(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_apply_tags_renders_and_writes_once() {
        let writer = Arc::new(MockTagWriter::new());
        let processor = TaggingProcessor::new(Arc::clone(&writer));

        let count = processor
            .apply_tags(&entry(), &templates(&[("title", "{title}"), ("artist", "{artist} ({id})")]))
            .await
            .unwrap();

        assert_eq!(count, 2);
        let writes = writer.recorded_writes().await;
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].path, std::path::PathBuf::from("/work/abc.mp3"));
        assert_eq!(
            writes[0].tags,
            vec![
                ("artist".to_string(), "A (abc)".to_string()),
                ("title".to_string(), "T".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_render_failure_leaves_file_untouched() {
        let writer = Arc::new(MockTagWriter::new());
        let processor = TaggingProcessor::new(Arc::clone(&writer));

        let result = processor
            .apply_tags(&entry(), &templates(&[("album", "{album}"), ("title", "{title}")]))
            .await;

        assert!(matches!(
            result,
            Err(TaggingError::Template(TemplateError::MissingField { .. }))
        ));
        assert!(writer.recorded_writes().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_templates_skip_write() {
        let writer = Arc::new(MockTagWriter::new());
        let processor = TaggingProcessor::new(Arc::clone(&writer));

        assert_eq!(processor.apply_tags(&entry(), &BTreeMap::new()).await.unwrap(), 0);
        assert!(writer.recorded_writes().await.is_empty());
    }
}
