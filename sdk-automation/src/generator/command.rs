//! Generator driven by the language's command line.

use super::{Generator, GeneratorError, GeneratorRequest};
use crate::activity_log::ActivityLog;
use crate::commands::{
    replace_string_variables, run_logged, CommandProperties, CommandRequest, CommandRunner,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Option naming the generator package.
const USE_OPTION: &str = "use";

/// Renders generator options as command-line flags.
///
/// `true` becomes `--key`, `false` and `null` are dropped, arrays repeat the
/// flag and everything else becomes `--key=value`.
#[must_use]
pub fn render_generator_options(options: &BTreeMap<String, Value>) -> String {
    let mut flags = Vec::new();
    for (key, value) in options {
        push_flag(&mut flags, key, value);
    }
    flags.join(" ")
}

fn push_flag(flags: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Bool(true) => flags.push(format!("--{key}")),
        Value::Bool(false) | Value::Null => {}
        Value::String(text) => flags.push(format!("--{key}={text}")),
        Value::Array(items) => {
            for item in items {
                push_flag(flags, key, item);
            }
        }
        other => flags.push(format!("--{key}={other}")),
    }
}

/// Runs the language's generation command through a [`CommandRunner`].
pub struct CommandGenerator {
    runner: Arc<dyn CommandRunner>,
}

impl CommandGenerator {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Builds the command line for a request.
    #[must_use]
    pub fn command_line(&self, request: &GeneratorRequest, log: &ActivityLog) -> String {
        let mut options = request.options.clone();
        if !options.contains_key(USE_OPTION) {
            if let Some(package) = &request.language.generator_package_name {
                log.info(format!(
                    "No generator was specified to use for this {} SDK repository. Defaulting to {package}.",
                    request.language.name
                ));
                options.insert(USE_OPTION.to_string(), Value::String(package.clone()));
            }
        }

        let mut properties = CommandProperties::new()
            .with("options", render_generator_options(&options))
            .with(
                "repository_folder",
                request.repository_folder.display().to_string(),
            )
            .with("readme", request.readme_url.clone());
        for (key, value) in &options {
            if let Value::String(text) = value {
                properties.insert(key, text.clone());
            }
        }

        replace_string_variables(&request.language.generation_command, &properties, log)
    }
}

#[async_trait]
impl Generator for CommandGenerator {
    async fn generate(
        &self,
        request: &GeneratorRequest,
        log: &ActivityLog,
    ) -> Result<(), GeneratorError> {
        let command = CommandRequest {
            command: self.command_line(request, log),
            working_dir: request.repository_folder.clone(),
            environment: request.environment.clone(),
        };

        run_logged(self.runner.as_ref(), &command, log)
            .await
            .map(drop)
            .map_err(|e| GeneratorError::Failed {
                readme_url: request.readme_url.clone(),
                source: e,
            })
    }
}
