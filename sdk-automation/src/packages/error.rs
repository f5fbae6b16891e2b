//! Package error types.

use crate::commands::CommandError;
use crate::git::GitError;
use crate::pull_requests::PrError;
use crate::storage::StorageError;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that can occur while driving a package through its lifecycle.
#[derive(Debug, Error)]
pub enum PackageError {
    /// A git command failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// An after-script failed.
    #[error("After script failed: {0}")]
    AfterScript(#[source] CommandError),

    /// The package build failed.
    #[error("Build failed: {0}")]
    Build(#[source] CommandError),

    /// Artifact or instructions upload failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Reading build output failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Rendering failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Pull request reconciliation failed.
    #[error(transparent)]
    PullRequest(#[from] PrError),
}

impl PackageError {
    /// Returns true when the remaining packages of the SDK repository must be skipped.
    #[must_use]
    pub fn stops_repository(&self) -> bool {
        matches!(self, Self::Build(_))
    }
}
