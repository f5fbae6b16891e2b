//! Orchestrates the handling of one specification pull request event.

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::activity_log::ActivityLog;
use crate::config::{ConfigError, LanguageRegistry, SpecificationRepositoryConfiguration};
use crate::generation::{Generation, SpecificationPullRequestEvent, SpecificationPullRequestRecord};
use crate::labels::SpecPhase;
use crate::reconciler::Reconciler;
use crate::sdk_repository::{
    process_sdk_repository, RepositoryContext, SdkRepositoryOutcome, Services,
};
use crate::storage::{read_json, BlobLayout};
use crate::summary::{ProcessingResult, RunSummary};
use crate::templates::TemplateRenderer;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

/// Loads a specification pull request event from a JSON file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file is missing or not a valid event.
pub fn load_event(path: &Path) -> Result<SpecificationPullRequestEvent, ConfigError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(ConfigError::MissingFile { path: display });
    }
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: display.clone(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| ConfigError::JsonError {
        path: display,
        source: e,
    })
}

/// Handles specification pull request events.
pub struct Runner {
    config: RunnerConfig,
    services: Services,
    specification_config: SpecificationRepositoryConfiguration,
    languages: LanguageRegistry,
    renderer: TemplateRenderer,
}

impl Runner {
    /// Builds a runner from its configuration and capabilities.
    pub fn new(
        config: RunnerConfig,
        services: Services,
        specification_config: SpecificationRepositoryConfiguration,
        languages: LanguageRegistry,
    ) -> Self {
        Self {
            config,
            services,
            specification_config,
            languages,
            renderer: TemplateRenderer::new(),
        }
    }

    /// Generates for opened or updated pull requests and reconciles the
    /// generation pull requests of closed ones.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] for configuration errors and for failures to
    /// read or write the generation records. Failures of individual SDK
    /// repositories and pull requests are counted in the summary instead.
    pub async fn run(
        &self,
        event: &SpecificationPullRequestEvent,
    ) -> Result<RunSummary, RunnerError> {
        let specification = &event.pull_request;
        let layout = BlobLayout::new(
            self.config.blob_prefix(),
            &specification.repository,
            specification.number,
        );
        let phase = event.phase();
        let span = info_span!(
            "specification_pull_request",
            number = specification.number,
            phase = ?phase
        );

        match phase {
            SpecPhase::InProgress => self.generate(event, layout).instrument(span).await,
            SpecPhase::Closed | SpecPhase::Merged => {
                self.reconcile(event, &layout, phase).instrument(span).await
            }
        }
    }

    async fn generate(
        &self,
        event: &SpecificationPullRequestEvent,
        layout: BlobLayout,
    ) -> Result<RunSummary, RunnerError> {
        let log = ActivityLog::new();
        let generation = Generation::start(
            event.pull_request.clone(),
            layout,
            Arc::clone(&self.services.storage),
            log,
        )
        .await?;

        for target in &event.targets {
            generation
                .add_readme_to_generate(
                    target,
                    &self.specification_config,
                    &self.languages,
                    self.services.http.as_ref(),
                )
                .await?;
        }

        let records = generation.sdk_repositories().await;
        info!(
            iteration = generation.iteration(),
            count = records.len(),
            "Processing SDK repositories"
        );

        let ctx = RepositoryContext {
            services: &self.services,
            languages: &self.languages,
            renderer: &self.renderer,
            specification: generation.specification(),
            layout: generation.layout(),
            iteration: generation.iteration(),
            token: self.config.token(),
            identity: self.config.identity(),
            keep_clones: self.config.keep_clones(),
        };
        let ctx = &ctx;
        let generation_ref = &generation;
        let working_folder = self.config.working_folder();

        let outcomes: Vec<SdkRepositoryOutcome> = stream::iter(records.into_iter().enumerate())
            .map(|(index, record)| {
                let work_folder = working_folder.join((index + 1).to_string());
                async move {
                    let outcome =
                        process_sdk_repository(ctx, record, &work_folder, generation_ref.log())
                            .await;
                    generation_ref
                        .update_sdk_repository(outcome.record.clone())
                        .await;
                    outcome
                }
            })
            .buffer_unordered(self.config.concurrency())
            .collect()
            .await;

        let persisted = generation.persist(&self.renderer).await?;
        info!(comment = %persisted.comment_url, logs = %persisted.logs_url, "Generation persisted");

        let mut summary = RunSummary::new(Some(generation.iteration()));
        for outcome in &outcomes {
            summary.record_result(&ProcessingResult::from(outcome));
        }
        Ok(summary)
    }

    async fn reconcile(
        &self,
        event: &SpecificationPullRequestEvent,
        layout: &BlobLayout,
        phase: SpecPhase,
    ) -> Result<RunSummary, RunnerError> {
        let log = ActivityLog::new();
        let storage = self.services.storage.as_ref();
        let statuses = Reconciler::new(
            self.services.host.as_ref(),
            &self.renderer,
            storage,
            layout,
            &event.pull_request,
            log.clone(),
        )
        .reconcile(phase)
        .await?;

        let record: Option<SpecificationPullRequestRecord> =
            read_json(storage, &layout.pull_request_data()).await?;
        match &record {
            Some(record) => {
                log.flush_to(storage, &layout.logs(record.current_iteration))
                    .await?;
            }
            None => warn!("No generation record; reconciliation log is not stored"),
        }

        let mut summary = RunSummary::new(record.map(|r| r.current_iteration));
        for status in &statuses {
            summary.record_pull_request(status);
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_event_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("event.json");
        fs::write(
            &path,
            r#"{
                "action": "synchronize",
                "pull_request": {
                    "number": 4994,
                    "title": "Update MySQL API",
                    "html_url": "https://github.com/Azure/azure-rest-api-specs/pull/4994",
                    "repository": "Azure/azure-rest-api-specs",
                    "head": { "repository": "Azure/azure-rest-api-specs", "branch": "mysql", "commit": "d82d149" },
                    "base": { "repository": "Azure/azure-rest-api-specs", "branch": "master", "commit": "5d20445" }
                },
                "targets": [
                    { "readme_url": "specification/mysql/resource-manager/readme.md", "sdk_repository": "azure-sdk-for-python" }
                ]
            }"#,
        )
        .unwrap();

        let event = load_event(&path).unwrap();
        assert_eq!(event.phase(), SpecPhase::InProgress);
        assert_eq!(event.targets.len(), 1);
    }

    #[test]
    fn missing_event_file() {
        let temp = TempDir::new().unwrap();
        let result = load_event(&temp.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }
}
