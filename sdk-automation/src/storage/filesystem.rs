//! Filesystem-backed blob storage.

use super::{validate_path, BlobStorage, StorageError};
use async_trait::async_trait;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Stores blobs as files below a root folder.
pub struct FilesystemBlobStorage {
    root: PathBuf,
    base_url: Option<String>,
}

impl FilesystemBlobStorage {
    /// Creates storage rooted at `root`. Blob URLs are `file://` URLs unless a
    /// public base URL is configured with [`Self::with_base_url`].
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            base_url: None,
        }
    }

    /// Serves blob URLs from `base_url` instead of the local filesystem.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        validate_path(path)?;
        Ok(self.root.join(path))
    }

    async fn ensure_parent(&self, file: &Path, path: &str) -> Result<(), StorageError> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await.map_err(|e| io_error(path, e))?;
        }
        Ok(())
    }
}

fn io_error(path: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_string(),
        source,
    }
}

/// Replaces `file` through a temporary sibling so readers never see a
/// partial blob.
fn write_atomically(file: &Path, content: &[u8]) -> std::io::Result<()> {
    let folder = file.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(folder)?;
    temp.write_all(content)?;
    temp.persist(file).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl BlobStorage for FilesystemBlobStorage {
    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let file = self.resolve(path)?;
        match fs::read(&file).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(path, e)),
        }
    }

    async fn write(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let file = self.resolve(path)?;
        self.ensure_parent(&file, path).await?;

        let content = content.to_vec();
        tokio::task::spawn_blocking(move || write_atomically(&file, &content))
            .await
            .map_err(|e| io_error(path, std::io::Error::other(e)))?
            .map_err(|e| io_error(path, e))
    }

    async fn append(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let file = self.resolve(path)?;
        self.ensure_parent(&file, path).await?;

        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file)
            .await
            .map_err(|e| io_error(path, e))?;
        handle.write_all(content).await.map_err(|e| io_error(path, e))?;
        handle.flush().await.map_err(|e| io_error(path, e))
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let file = self.resolve(path)?;
        fs::try_exists(&file).await.map_err(|e| io_error(path, e))
    }

    async fn create_if_absent(&self, path: &str, content: &[u8]) -> Result<bool, StorageError> {
        let file = self.resolve(path)?;
        self.ensure_parent(&file, path).await?;

        let mut handle = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file)
            .await
        {
            Ok(handle) => handle,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(io_error(path, e)),
        };
        handle.write_all(content).await.map_err(|e| io_error(path, e))?;
        handle.flush().await.map_err(|e| io_error(path, e))?;
        Ok(true)
    }

    fn url(&self, path: &str) -> String {
        match &self.base_url {
            Some(base_url) => format!("{base_url}/{path}"),
            None => format!("file://{}", self.root.join(path).display()),
        }
    }
}
