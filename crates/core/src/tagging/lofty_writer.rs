//! Tag writer backed by lofty.

use async_trait::async_trait;
use lofty::config::WriteOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::TaggingError;
use super::traits::TagWriter;

/// Writes tags with lofty, using the file's primary tag format.
#[derive(Debug, Default, Clone)]
pub struct LoftyTagWriter;

impl LoftyTagWriter {
    pub fn new() -> Self {
        Self
    }

    /// Maps a configuration tag name to a lofty item key.
    pub fn item_key(name: &str) -> Option<ItemKey> {
        let key = match name.to_ascii_lowercase().as_str() {
            "title" => ItemKey::TrackTitle,
            "artist" => ItemKey::TrackArtist,
            "album" => ItemKey::AlbumTitle,
            "albumartist" | "album_artist" => ItemKey::AlbumArtist,
            "genre" => ItemKey::Genre,
            "date" | "year" => ItemKey::RecordingDate,
            "tracknumber" | "track" => ItemKey::TrackNumber,
            "totaltracks" => ItemKey::TrackTotal,
            "discnumber" | "disc" => ItemKey::DiscNumber,
            "totaldiscs" => ItemKey::DiscTotal,
            "comment" => ItemKey::Comment,
            "composer" => ItemKey::Composer,
            "lyrics" => ItemKey::Lyrics,
            "compilation" => ItemKey::FlagCompilation,
            _ => return None,
        };
        Some(key)
    }

    fn write_blocking(path: PathBuf, tags: Vec<(ItemKey, String)>) -> Result<(), TaggingError> {
        let mut tagged_file = Probe::open(&path)
            .and_then(|probe| probe.read())
            .map_err(|e| TaggingError::read(&path, e))?;

        if tagged_file.primary_tag().is_none() {
            let tag_type = tagged_file.primary_tag_type();
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged_file
            .primary_tag_mut()
            .ok_or_else(|| TaggingError::read(&path, "file format has no writable tag"))?;

        for (key, value) in tags {
            tag.insert_text(key, value);
        }

        tagged_file
            .save_to_path(&path, WriteOptions::default())
            .map_err(|e| TaggingError::save(&path, e))
    }
}

#[async_trait]
impl TagWriter for LoftyTagWriter {
    fn name(&self) -> &str {
        "lofty"
    }

    async fn write_tags(&self, path: &Path, tags: &[(String, String)]) -> Result<(), TaggingError> {
        let mapped = tags
            .iter()
            .map(|(name, value)| {
                Self::item_key(name)
                    .map(|key| (key, value.clone()))
                    .ok_or_else(|| TaggingError::UnknownTag { name: name.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(?path, count = mapped.len(), "Writing tags");
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::write_blocking(path, mapped)).await?
    }
}
