//! Command error types.

use thiserror::Error;

/// Errors that can occur while running external commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not be started.
    #[error("Failed to execute '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exited with a non-zero code.
    #[error("'{command}' exited with code {exit_code}")]
    Failed { command: String, exit_code: i32 },
}
