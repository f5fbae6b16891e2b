//! Git error types.

use thiserror::Error;

/// Errors that can occur while running git.
#[derive(Debug, Error)]
pub enum GitError {
    /// git could not be started.
    #[error("Failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// git exited with a non-zero code.
    #[error("{command} failed in {folder} with exit code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        folder: String,
        exit_code: i32,
        stderr: String,
    },
}
