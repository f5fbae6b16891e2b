//! Recording git executor.

use crate::git::{GitError, GitExecutor, GitOutput};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    invocations: Vec<(PathBuf, String)>,
    responses: HashMap<String, VecDeque<String>>,
    failures: HashSet<String>,
}

/// Git executor that records invocations instead of running git.
///
/// Commands are matched by their space-joined arguments. Unscripted commands
/// succeed with empty output.
#[derive(Default)]
pub struct RecordingGitExecutor {
    state: RwLock<State>,
}

impl RecordingGitExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues stdout for `args`. Queued outputs are returned in order and the
    /// last one repeats.
    #[must_use]
    pub fn with_response(mut self, args: &str, stdout: impl Into<String>) -> Self {
        self.state
            .get_mut()
            .responses
            .entry(args.to_string())
            .or_default()
            .push_back(stdout.into());
        self
    }

    /// Makes `args` exit with code 1.
    #[must_use]
    pub fn with_failure(mut self, args: &str) -> Self {
        self.state.get_mut().failures.insert(args.to_string());
        self
    }

    /// Returns the arguments of every invocation.
    pub async fn commands(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .invocations
            .iter()
            .map(|(_, args)| args.clone())
            .collect()
    }

    /// Returns every invocation with its working directory.
    pub async fn invocations(&self) -> Vec<(PathBuf, String)> {
        self.state.read().await.invocations.clone()
    }
}

#[async_trait]
impl GitExecutor for RecordingGitExecutor {
    async fn run(&self, dir: &Path, args: &[String]) -> Result<GitOutput, GitError> {
        let joined = args.join(" ");
        let mut state = self.state.write().await;
        state.invocations.push((dir.to_path_buf(), joined.clone()));

        if state.failures.contains(&joined) {
            return Ok(GitOutput {
                exit_code: 1,
                stdout: String::new(),
                stderr: format!("fatal: {joined} failed"),
            });
        }

        let stdout = match state.responses.get_mut(&joined) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => String::new(),
        };
        Ok(GitOutput::success(stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_scripted_response_repeats() {
        let executor = RecordingGitExecutor::new()
            .with_response("status", "first")
            .with_response("status", "second");
        let args = vec!["status".to_string()];

        let dir = Path::new("/work");
        assert_eq!(executor.run(dir, &args).await.unwrap().stdout, "first");
        assert_eq!(executor.run(dir, &args).await.unwrap().stdout, "second");
        assert_eq!(executor.run(dir, &args).await.unwrap().stdout, "second");
    }
}
