//! Git executor backed by the `git` binary.

use super::{GitError, GitExecutor, GitOutput};
use crate::repository::redact_credentials;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs the system `git`.
#[derive(Debug, Clone, Default)]
pub struct ProcessGit;

impl ProcessGit {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GitExecutor for ProcessGit {
    async fn run(&self, dir: &Path, args: &[String]) -> Result<GitOutput, GitError> {
        debug!(dir = %dir.display(), "Running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| GitError::Spawn {
                command: redact_credentials(&format!("git {}", args.join(" "))),
                source: e,
            })?;

        Ok(GitOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
