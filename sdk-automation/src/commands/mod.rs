//! External command execution for generators, after-scripts and builds.

mod error;
mod process;
mod variables;

pub use error::CommandError;
pub use process::ProcessCommandRunner;
pub use variables::{
    normalize_property_name, replace_string_variables, resolve_environment_variables,
    CommandProperties,
};

use crate::activity_log::ActivityLog;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A shell command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// Full command line.
    pub command: String,
    /// Working directory.
    pub working_dir: PathBuf,
    /// Variables added on top of the inherited environment.
    pub environment: BTreeMap<String, String>,
}

/// Captured result of a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs shell commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs a command. A non-zero exit code is reported in the output, not as an error.
    async fn run(&self, request: &CommandRequest) -> Result<CommandOutput, CommandError>;
}

/// Runs a command, logging `{dir}: {command}` and failing on non-zero exit.
///
/// # Errors
///
/// Returns [`CommandError::Failed`] for a non-zero exit code, or the runner's
/// error if the command could not start.
pub async fn run_logged(
    runner: &dyn CommandRunner,
    request: &CommandRequest,
    log: &ActivityLog,
) -> Result<CommandOutput, CommandError> {
    log.info(format!(
        "{}: {}",
        request.working_dir.display(),
        request.command
    ));

    let output = runner.run(request).await?;
    if output.exit_code != 0 {
        let stderr = output.stderr.trim();
        if !stderr.is_empty() {
            log.error(stderr);
        }
        return Err(CommandError::Failed {
            command: request.command.clone(),
            exit_code: output.exit_code,
        });
    }
    Ok(output)
}
