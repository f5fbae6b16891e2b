//! Runner error types.

use crate::config::ConfigError;
use crate::generation::GenerationError;
use crate::host::HostError;
use crate::http::HttpError;
use crate::storage::StorageError;

/// Errors that end a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration or event loading errors.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The generation could not be started, loaded or persisted.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The activity log could not be stored.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// GitHub client initialization errors.
    #[error(transparent)]
    Host(#[from] HostError),

    /// HTTP client initialization errors.
    #[error(transparent)]
    Http(#[from] HttpError),
}
