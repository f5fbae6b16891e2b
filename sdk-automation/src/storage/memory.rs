//! In-memory blob storage for tests and dry runs.

use super::{validate_path, BlobStorage, StorageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Blob storage kept in a map.
pub struct InMemoryBlobStorage {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
    base_url: String,
}

impl Default for InMemoryBlobStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBlobStorage {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(BTreeMap::new()),
            base_url: "https://storage.example.com".to_string(),
        }
    }

    /// Returns a blob as UTF-8 text.
    pub async fn text(&self, path: &str) -> Option<String> {
        self.blobs
            .read()
            .await
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Returns every stored path in order.
    pub async fn paths(&self) -> Vec<String> {
        self.blobs.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_path(path)?;
        Ok(self.blobs.read().await.get(path).cloned())
    }

    async fn write(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        validate_path(path)?;
        self.blobs
            .write()
            .await
            .insert(path.to_string(), content.to_vec());
        Ok(())
    }

    async fn append(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        validate_path(path)?;
        self.blobs
            .write()
            .await
            .entry(path.to_string())
            .or_default()
            .extend_from_slice(content);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        validate_path(path)?;
        Ok(self.blobs.read().await.contains_key(path))
    }

    async fn create_if_absent(&self, path: &str, content: &[u8]) -> Result<bool, StorageError> {
        validate_path(path)?;
        let mut blobs = self.blobs.write().await;
        if blobs.contains_key(path) {
            return Ok(false);
        }
        blobs.insert(path.to_string(), content.to_vec());
        Ok(true)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}
