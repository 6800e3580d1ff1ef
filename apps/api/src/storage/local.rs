use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use super::{ObjectStore, StorageError, StoredObject};

/// Stores uploads as plain files under a single directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Keys are generated server-side, but never let one escape the root.
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StorageError::Backend(format!("invalid object key '{key}'")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, &bytes).await?;

        info!("Stored {} bytes at {}", bytes.len(), path.display());

        Ok(StoredObject {
            key: key.to_string(),
            reference: path.to_string_lossy().into_owned(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        tokio::fs::remove_file(&path).await?;
        Ok(())
    }

    async fn processing_reference(
        &self,
        object: &StoredObject,
        _ttl: Duration,
    ) -> Result<String, StorageError> {
        let path = self.path_for(&object.key)?;
        // The AI service runs alongside us and reads the file directly.
        let absolute = tokio::fs::canonicalize(&path).await?;
        Ok(absolute.to_string_lossy().into_owned())
    }
}
