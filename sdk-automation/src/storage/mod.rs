//! Blob storage for logs, generation records and artifacts.
//!
//! Blobs are addressed by `/`-separated paths below a storage root. Each
//! backend can also report the public URL of a blob, which ends up in pull
//! request comments and installation instructions.

mod error;
mod filesystem;
mod layout;
mod memory;

pub use error::StorageError;
pub use filesystem::FilesystemBlobStorage;
pub use layout::BlobLayout;
pub use memory::InMemoryBlobStorage;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Path-addressed blob storage.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Reads a blob, returning `None` when it does not exist.
    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Creates or replaces a blob.
    async fn write(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// Appends to a blob, creating it when missing.
    async fn append(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// Returns whether a blob exists.
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Creates a blob only if it does not exist yet.
    ///
    /// Returns `true` when this call created the blob. Two concurrent callers
    /// never both receive `true` for the same path.
    async fn create_if_absent(&self, path: &str, content: &[u8]) -> Result<bool, StorageError>;

    /// Returns the URL at which the blob can be read.
    fn url(&self, path: &str) -> String;
}

/// Reads and deserializes a JSON blob.
///
/// # Errors
///
/// Returns [`StorageError::Json`] if the blob is not valid JSON for `T`.
pub async fn read_json<T: DeserializeOwned>(
    storage: &dyn BlobStorage,
    path: &str,
) -> Result<Option<T>, StorageError> {
    match storage.read(path).await? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StorageError::Json {
                path: path.to_string(),
                source: e,
            }),
        None => Ok(None),
    }
}

/// Serializes a value as pretty JSON and writes it.
///
/// # Errors
///
/// Returns [`StorageError`] if serialization or the write fails.
pub async fn write_json<T: Serialize + Sync>(
    storage: &dyn BlobStorage,
    path: &str,
    value: &T,
) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Json {
        path: path.to_string(),
        source: e,
    })?;
    storage.write(path, &bytes).await
}

/// Rejects absolute paths and paths that leave the storage root.
pub(crate) fn validate_path(path: &str) -> Result<(), StorageError> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        return Err(StorageError::InvalidPath {
            path: path.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        iteration: u32,
    }

    #[test]
    fn validates_paths() {
        assert!(validate_path("abc/1/data.json").is_ok());
        assert!(validate_path("/abc").is_err());
        assert!(validate_path("abc/../x").is_err());
        assert!(validate_path("abc//x").is_err());
        assert!(validate_path("").is_err());
    }

    #[tokio::test]
    async fn json_helpers_round_trip_through_storage() {
        let storage = InMemoryBlobStorage::new();
        write_json(&storage, "pr/1/data.json", &Record { iteration: 1 })
            .await
            .unwrap();

        let record: Option<Record> = read_json(&storage, "pr/1/data.json").await.unwrap();
        assert_eq!(record, Some(Record { iteration: 1 }));

        let missing: Option<Record> = read_json(&storage, "pr/2/data.json").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn read_json_reports_malformed_blobs() {
        let storage = InMemoryBlobStorage::new();
        storage.write("broken.json", b"{").await.unwrap();
        let result: Result<Option<Record>, _> = read_json(&storage, "broken.json").await;
        assert!(matches!(result, Err(StorageError::Json { .. })));
    }
}
