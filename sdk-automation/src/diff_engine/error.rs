//! Diff engine error types.

use crate::generator::GeneratorError;
use crate::git::GitError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors that end processing of an SDK repository before any package is touched.
#[derive(Debug, Error)]
pub enum DiffError {
    /// Cloning, fetching or diffing failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// The generator failed for one of the readmes.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// The diff could not be stored.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
