//! Host error types.

use thiserror::Error;

/// Errors raised by source control hosts.
#[derive(Debug, Error)]
pub enum HostError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// A pull request, comment or branch does not exist.
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// The host refused the operation.
    #[error("{operation} was rejected: {message}")]
    Rejected { operation: String, message: String },
}
