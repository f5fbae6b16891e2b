//! Generator error types.

use crate::commands::CommandError;
use thiserror::Error;

/// Errors that can occur while generating code.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The generator command failed.
    #[error("Generation of {readme_url} failed: {source}")]
    Failed {
        readme_url: String,
        #[source]
        source: CommandError,
    },

    /// The generator rejected the request.
    #[error("Generation of {readme_url} failed: {message}")]
    Rejected { readme_url: String, message: String },
}
