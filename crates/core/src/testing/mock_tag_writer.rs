//! Mock tag writer for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::tagging::{TagWriter, TaggingError};

/// A recorded tag write for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTagWrite {
    /// File that was tagged.
    pub path: PathBuf,
    /// Tags in the order they were passed.
    pub tags: Vec<(String, String)>,
}

/// Mock implementation of the TagWriter trait.
///
/// Records writes without touching the filesystem.
#[derive(Debug, Clone, Default)]
pub struct MockTagWriter {
    /// Recorded writes.
    writes: Arc<RwLock<Vec<RecordedTagWrite>>>,
    /// If set, the next write will fail with this error.
    next_error: Arc<RwLock<Option<TaggingError>>>,
}

impl MockTagWriter {
    /// Create a new mock tag writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded writes.
    pub async fn recorded_writes(&self) -> Vec<RecordedTagWrite> {
        self.writes.read().await.clone()
    }

    /// Configure the next write to fail with the given error.
    pub async fn set_next_error(&self, error: TaggingError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl TagWriter for MockTagWriter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn write_tags(&self, path: &Path, tags: &[(String, String)]) -> Result<(), TaggingError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.writes.write().await.push(RecordedTagWrite {
            path: path.to_path_buf(),
            tags: tags.to_vec(),
        });
        Ok(())
    }
}
