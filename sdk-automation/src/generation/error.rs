//! Generation error types.

use crate::config::ConfigError;
use crate::storage::StorageError;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that can occur while recording a generation iteration.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A mapping could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading or writing a record failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The comment could not be rendered.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The stored record belongs to a different pull request.
    #[error("Record at {path} describes pull request {found}, expected {expected}")]
    RecordMismatch {
        path: String,
        expected: u64,
        found: u64,
    },
}
