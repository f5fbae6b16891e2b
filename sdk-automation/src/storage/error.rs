//! Storage error types.

use thiserror::Error;

/// Errors that can occur while reading or writing blobs.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("Blob I/O error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Blob content was not valid JSON.
    #[error("Invalid JSON blob '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Path is absolute or escapes the storage root.
    #[error("Invalid blob path '{path}'")]
    InvalidPath { path: String },
}
