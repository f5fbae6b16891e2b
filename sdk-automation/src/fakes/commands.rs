//! Recording command runner and scripted generator.

use crate::activity_log::ActivityLog;
use crate::commands::{CommandError, CommandOutput, CommandRequest, CommandRunner};
use crate::generator::{Generator, GeneratorError, GeneratorRequest};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Writes `contents` to `relative` below `root`, creating parent folders.
async fn write_relative(root: &Path, relative: &str, contents: &str) -> std::io::Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await
}

struct FileOutput {
    prefix: String,
    relative_path: String,
    contents: String,
}

/// Command runner that records commands instead of executing them.
///
/// Behaviour is keyed by command prefix: the first registered prefix that
/// matches decides the exit code, and matching file outputs are written below
/// the request's working directory.
#[derive(Default)]
pub struct RecordingCommandRunner {
    exit_codes: Vec<(String, i32)>,
    files: Vec<FileOutput>,
    requests: RwLock<Vec<CommandRequest>>,
}

impl RecordingCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_exit_code(mut self, prefix: &str, exit_code: i32) -> Self {
        self.exit_codes.push((prefix.to_string(), exit_code));
        self
    }

    /// Makes commands starting with `prefix` write a file.
    #[must_use]
    pub fn with_file_output(mut self, prefix: &str, relative_path: &str, contents: &str) -> Self {
        self.files.push(FileOutput {
            prefix: prefix.to_string(),
            relative_path: relative_path.to_string(),
            contents: contents.to_string(),
        });
        self
    }

    /// Command lines run so far.
    pub async fn commands(&self) -> Vec<String> {
        self.requests
            .read()
            .await
            .iter()
            .map(|r| r.command.clone())
            .collect()
    }

    /// Full requests run so far.
    pub async fn requests(&self) -> Vec<CommandRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingCommandRunner {
    async fn run(&self, request: &CommandRequest) -> Result<CommandOutput, CommandError> {
        self.requests.write().await.push(request.clone());

        for file in self.files.iter().filter(|f| request.command.starts_with(&f.prefix)) {
            write_relative(&request.working_dir, &file.relative_path, &file.contents)
                .await
                .map_err(|e| CommandError::Spawn {
                    command: request.command.clone(),
                    source: e,
                })?;
        }

        let exit_code = self
            .exit_codes
            .iter()
            .find(|(prefix, _)| request.command.starts_with(prefix.as_str()))
            .map_or(0, |(_, code)| *code);

        Ok(CommandOutput {
            exit_code,
            stdout: String::new(),
            stderr: if exit_code == 0 {
                String::new()
            } else {
                format!("{} failed", request.command)
            },
        })
    }
}

/// Generator that writes fixed files into the clone folder.
#[derive(Default)]
pub struct ScriptedGenerator {
    files: Vec<(String, String)>,
    failure: Option<String>,
    requests: RwLock<Vec<GeneratorRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `contents` to `relative_path` on every run.
    #[must_use]
    pub fn with_file(mut self, relative_path: &str, contents: &str) -> Self {
        self.files
            .push((relative_path.to_string(), contents.to_string()));
        self
    }

    /// Makes every run fail with `message`.
    #[must_use]
    pub fn with_failure(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<GeneratorRequest> {
        self.requests.read().await.clone()
    }

    /// Clone folders generated into so far.
    pub async fn folders(&self) -> Vec<PathBuf> {
        self.requests
            .read()
            .await
            .iter()
            .map(|r| r.repository_folder.clone())
            .collect()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        request: &GeneratorRequest,
        log: &ActivityLog,
    ) -> Result<(), GeneratorError> {
        self.requests.write().await.push(request.clone());
        log.info(format!(
            "{}: generate {}",
            request.repository_folder.display(),
            request.readme_url
        ));

        if let Some(message) = &self.failure {
            return Err(GeneratorError::Rejected {
                readme_url: request.readme_url.clone(),
                message: message.clone(),
            });
        }

        for (relative, contents) in &self.files {
            write_relative(&request.repository_folder, relative, contents)
                .await
                .map_err(|e| GeneratorError::Rejected {
                    readme_url: request.readme_url.clone(),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }
}
