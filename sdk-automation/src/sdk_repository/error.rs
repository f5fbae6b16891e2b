//! SDK repository error types.

use crate::diff_engine::DiffError;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that fail a whole SDK repository.
#[derive(Debug, Error)]
pub enum SdkRepositoryError {
    /// Clone, generation or diff failed.
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// A package name does not form valid branch names.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The record names a language that is not configured.
    #[error("Unknown programming language '{name}'")]
    UnknownLanguage { name: String },
}
