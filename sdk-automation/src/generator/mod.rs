//! Code generator invocation.

mod command;
mod error;

pub use command::{render_generator_options, CommandGenerator};
pub use error::GeneratorError;

use crate::activity_log::ActivityLog;
use crate::config::LanguageConfiguration;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One generator run against a clone.
#[derive(Debug, Clone)]
pub struct GeneratorRequest {
    /// Readme or configuration URL describing what to generate.
    pub readme_url: String,
    /// Clone folder receiving the generated code.
    pub repository_folder: PathBuf,
    /// Language being generated.
    pub language: LanguageConfiguration,
    /// Generator options from the SDK repository's configuration.
    pub options: BTreeMap<String, Value>,
    /// Extra environment variables.
    pub environment: BTreeMap<String, String>,
}

/// Produces generated code in a clone folder.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Runs generation; the output is whatever the generator wrote to disk.
    async fn generate(&self, request: &GeneratorRequest, log: &ActivityLog)
        -> Result<(), GeneratorError>;
}
