//! Generation iterations of a specification pull request.
//!
//! Each time a specification pull request is opened or updated the engine
//! claims the next iteration number and records every SDK repository it
//! generates for below `{pr}/{iteration}/`. Earlier iterations are never
//! rewritten.

mod comment;
mod error;
mod record;
mod specification;

pub use comment::{CommentView, PackageView, SdkRepositoryView};
pub use error::GenerationError;
pub use record::{GenerationRecord, SdkRepositoryRecord};
pub use specification::{
    EventAction, GenerationTarget, PullRequestBranch, SpecificationPullRequest,
    SpecificationPullRequestEvent, SpecificationPullRequestRecord,
};

use crate::activity_log::ActivityLog;
use crate::config::{
    parse_generator_configuration, ConfigError, GeneratorConfiguration, LanguageRegistry,
    SpecificationRepositoryConfiguration,
};
use crate::http::HttpClient;
use crate::repository::RepositoryName;
use crate::storage::{read_json, write_json, BlobLayout, BlobStorage};
use crate::templates::TemplateRenderer;
use crate::topology::{
    apply_existence_fallback, resolve_mapping, RepositoryTopology, ResolvedMapping,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Base URL raw repository files are fetched from.
const RAW_CONTENT_BASE_URL: &str = "https://raw.githubusercontent.com";

/// One claimed iteration of a specification pull request.
pub struct Generation {
    specification: SpecificationPullRequest,
    iteration: u32,
    layout: BlobLayout,
    storage: Arc<dyn BlobStorage>,
    sdk_repositories: Mutex<Vec<SdkRepositoryRecord>>,
    log: ActivityLog,
}

impl Generation {
    /// Claims the next iteration for `specification` and records it as current.
    ///
    /// The iteration is claimed by atomically creating its `logs.txt`; a
    /// concurrent caller that loses the race moves on to the next number.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the stored record cannot be read or
    /// written, or belongs to another pull request.
    pub async fn start(
        specification: SpecificationPullRequest,
        layout: BlobLayout,
        storage: Arc<dyn BlobStorage>,
        log: ActivityLog,
    ) -> Result<Self, GenerationError> {
        let record_path = layout.pull_request_data();
        let previous = read_record(storage.as_ref(), &record_path, specification.number).await?;

        let mut iteration = previous.map_or(1, |record| record.current_iteration + 1);
        while !storage
            .create_if_absent(&layout.logs(iteration), b"")
            .await?
        {
            iteration += 1;
        }

        write_json(
            storage.as_ref(),
            &record_path,
            &SpecificationPullRequestRecord {
                pull_request: specification.clone(),
                current_iteration: iteration,
            },
        )
        .await?;

        log.info(format!(
            "Starting generation iteration {iteration} for {}.",
            specification.html_url
        ));

        Ok(Self {
            specification,
            iteration,
            layout,
            storage,
            sdk_repositories: Mutex::new(Vec::new()),
            log,
        })
    }

    #[must_use]
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    #[must_use]
    pub fn specification(&self) -> &SpecificationPullRequest {
        &self.specification
    }

    #[must_use]
    pub fn layout(&self) -> &BlobLayout {
        &self.layout
    }

    #[must_use]
    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    /// URL of this iteration's log.
    #[must_use]
    pub fn logs_url(&self) -> String {
        self.storage.url(&self.layout.logs(self.iteration))
    }

    /// URL of this iteration's rendered comment.
    #[must_use]
    pub fn comment_url(&self) -> String {
        self.storage.url(&self.layout.comment(self.iteration))
    }

    /// Queues a readme for generation in the SDK repository it targets.
    ///
    /// The SDK repository record is created the first time a readme targets
    /// its main repository. Creating it selects the language, fetches the
    /// generator configuration and applies the repository existence fallback;
    /// problems with the latter two leave a failed record behind.
    ///
    /// Returns the main repository the readme was queued for, or `None` when no
    /// language matches the repository.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Config`] if the mapping names an invalid repository.
    pub async fn add_readme_to_generate(
        &self,
        target: &GenerationTarget,
        config: &SpecificationRepositoryConfiguration,
        languages: &LanguageRegistry,
        http: &dyn HttpClient,
    ) -> Result<Option<RepositoryName>, GenerationError> {
        let mapping = resolve_mapping(&target.sdk_repository, config, &self.log)?;
        let main = mapping.main_repository.clone();

        if self.queue_readme(&main, target).await {
            return Ok(Some(main));
        }

        let Some(language) = languages.find_for_repository(&main) else {
            self.log.warn(format!(
                "No supported programming language matches the repository {main}."
            ));
            return Ok(None);
        };
        self.log.info(format!(
            "SDK repository {main} matches programming language {}.",
            language.name
        ));

        let record = self.new_record(&mapping, &language.name, http).await;
        {
            let mut records = self.sdk_repositories.lock().await;
            if !records
                .iter()
                .any(|existing| existing.topology.main_repository == main)
            {
                records.push(record);
            }
        }

        self.queue_readme(&main, target).await;
        Ok(Some(main))
    }

    /// Snapshot of the SDK repository records.
    pub async fn sdk_repositories(&self) -> Vec<SdkRepositoryRecord> {
        self.sdk_repositories.lock().await.clone()
    }

    /// Replaces the record with the same main repository.
    pub async fn update_sdk_repository(&self, record: SdkRepositoryRecord) {
        let mut records = self.sdk_repositories.lock().await;
        match records
            .iter_mut()
            .find(|existing| existing.topology.main_repository == record.topology.main_repository)
        {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    /// Writes `data.json` and `comment.html` and flushes the activity log.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if rendering or a write fails.
    pub async fn persist(
        &self,
        renderer: &TemplateRenderer,
    ) -> Result<GenerationRecord, GenerationError> {
        let sdk_repositories = self.sdk_repositories().await;

        let view = CommentView::new(
            &self.specification.html_url,
            self.specification.number,
            self.iteration,
            &sdk_repositories,
        );
        let comment = renderer.render_comment(&view)?;
        self.storage
            .write(&self.layout.comment(self.iteration), comment.as_bytes())
            .await?;

        let record = GenerationRecord {
            iteration: self.iteration,
            specification_pull_request_number: self.specification.number,
            specification_pull_request_url: self.specification.html_url.clone(),
            sdk_repositories,
            logs_url: self.logs_url(),
            comment_url: self.comment_url(),
        };
        write_json(
            self.storage.as_ref(),
            &self.layout.generation_data(self.iteration),
            &record,
        )
        .await?;

        self.log
            .flush_to(self.storage.as_ref(), &self.layout.logs(self.iteration))
            .await?;
        Ok(record)
    }

    /// Adds the readme to an existing record. Returns false when no record exists.
    async fn queue_readme(&self, main: &RepositoryName, target: &GenerationTarget) -> bool {
        let mut records = self.sdk_repositories.lock().await;
        let Some(record) = records
            .iter_mut()
            .find(|record| &record.topology.main_repository == main)
        else {
            return false;
        };

        if !record.readme_urls.contains(&target.readme_url) {
            self.log.info(format!(
                "Adding readme.md to generate to {main}: {}",
                target.readme_url
            ));
            record.readme_urls.push(target.readme_url.clone());
        }
        if !target.after_scripts.is_empty() {
            record
                .readme_after_scripts
                .entry(target.readme_url.clone())
                .or_default()
                .extend(target.after_scripts.iter().cloned());
        }
        true
    }

    async fn new_record(
        &self,
        mapping: &ResolvedMapping,
        language_name: &str,
        http: &dyn HttpClient,
    ) -> SdkRepositoryRecord {
        let (generator_configuration, configuration_error) =
            match fetch_generator_configuration(mapping, http, &self.log).await {
                Ok(configuration) => (configuration, None),
                Err(message) => (GeneratorConfiguration::default(), Some(message)),
            };

        let policy = generator_configuration
            .advanced_options()
            .sdk_generation_pull_request_base;
        let mut topology = RepositoryTopology::from_mapping(mapping, policy);
        let fallback = apply_existence_fallback(&mut topology, http, &self.log).await;

        let mut record = SdkRepositoryRecord::new(
            &mapping.requested_name,
            language_name,
            topology,
            generator_configuration,
        );
        if let Some(message) = configuration_error {
            self.log.error(&message);
            record.fail(message);
        } else if let Err(e) = fallback {
            self.log.error(e.to_string());
            record.fail(e.to_string());
        }
        record
    }
}

async fn read_record(
    storage: &dyn BlobStorage,
    path: &str,
    expected: u64,
) -> Result<Option<SpecificationPullRequestRecord>, GenerationError> {
    let record: Option<SpecificationPullRequestRecord> = read_json(storage, path).await?;
    match record {
        Some(record) if record.pull_request.number != expected => {
            Err(GenerationError::RecordMismatch {
                path: path.to_string(),
                expected,
                found: record.pull_request.number,
            })
        }
        other => Ok(other),
    }
}

async fn fetch_generator_configuration(
    mapping: &ResolvedMapping,
    http: &dyn HttpClient,
    log: &ActivityLog,
) -> Result<GeneratorConfiguration, String> {
    let url = format!(
        "{RAW_CONTENT_BASE_URL}/{}/{}/{}",
        mapping.main_repository.full_name(),
        mapping.main_branch,
        mapping.config_file_path
    );
    log.info(format!("Getting generator configuration from {url}..."));

    let response = http.get(&url).await.map_err(|e| e.to_string())?;
    if !response.is_success() {
        return Err(format!(
            "Failed to get generator configuration from {url}: status {}",
            response.status
        ));
    }
    parse_generator_configuration(&response.body, &url).map_err(|e: ConfigError| e.to_string())
}

/// Loads the newest persisted iteration record of a specification pull
/// request.
///
/// An iteration that was claimed but never wrote its record (a run that
/// failed early) is skipped in favour of the one before it. Returns `None`
/// when no iteration of the pull request has a record.
///
/// # Errors
///
/// Returns [`GenerationError`] if a record cannot be read or belongs to
/// another pull request.
pub async fn load_latest_generation(
    storage: &dyn BlobStorage,
    layout: &BlobLayout,
    specification_pull_request_number: u64,
) -> Result<Option<GenerationRecord>, GenerationError> {
    let Some(record) = read_record(
        storage,
        &layout.pull_request_data(),
        specification_pull_request_number,
    )
    .await?
    else {
        return Ok(None);
    };

    for iteration in (1..=record.current_iteration).rev() {
        if let Some(generation) = read_json(storage, &layout.generation_data(iteration)).await? {
            return Ok(Some(generation));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_specification_configuration;
    use crate::fakes::StaticHttpClient;
    use crate::status::AutomationStatus;
    use crate::storage::InMemoryBlobStorage;

    const PYTHON_CONFIG_URL: &str =
        "https://raw.githubusercontent.com/Azure/azure-sdk-for-python/master/swagger_to_sdk_config.json";

    fn specification() -> SpecificationPullRequest {
        serde_json::from_str(
            r#"{
                "number": 4994,
                "title": "Update MySQL API",
                "html_url": "https://github.com/Azure/azure-rest-api-specs/pull/4994",
                "repository": "Azure/azure-rest-api-specs",
                "head": { "repository": "Azure/azure-rest-api-specs", "branch": "mysql", "commit": "d82d149" },
                "base": { "repository": "Azure/azure-rest-api-specs", "branch": "master", "commit": "5d20445" }
            }"#,
        )
        .unwrap()
    }

    fn layout() -> BlobLayout {
        BlobLayout::new("", &"Azure/azure-rest-api-specs".parse().unwrap(), 4994)
    }

    fn target(readme: &str, repository: &str) -> GenerationTarget {
        GenerationTarget {
            readme_url: readme.to_string(),
            sdk_repository: repository.to_string(),
            after_scripts: Vec::new(),
        }
    }

    #[tokio::test]
    async fn claims_consecutive_iterations() {
        let storage = Arc::new(InMemoryBlobStorage::new());

        let first =
            Generation::start(specification(), layout(), storage.clone(), ActivityLog::new())
                .await
                .unwrap();
        let second =
            Generation::start(specification(), layout(), storage.clone(), ActivityLog::new())
                .await
                .unwrap();

        assert_eq!(first.iteration(), 1);
        assert_eq!(second.iteration(), 2);
        assert_eq!(
            first.logs_url(),
            "https://storage.example.com/Azure/azure-rest-api-specs/4994/1/logs.txt"
        );
        assert_eq!(
            second.comment_url(),
            "https://storage.example.com/Azure/azure-rest-api-specs/4994/2/comment.html"
        );

        let record: SpecificationPullRequestRecord =
            read_json(storage.as_ref(), &layout().pull_request_data())
                .await
                .unwrap()
                .unwrap();
        assert_eq!(record.current_iteration, 2);
    }

    #[tokio::test]
    async fn skips_iterations_already_claimed() {
        let storage = Arc::new(InMemoryBlobStorage::new());
        storage.write(&layout().logs(1), b"").await.unwrap();

        let generation = Generation::start(specification(), layout(), storage, ActivityLog::new())
            .await
            .unwrap();
        assert_eq!(generation.iteration(), 2);
    }

    #[tokio::test]
    async fn creates_sdk_repository_once_per_main_repository() {
        let storage = Arc::new(InMemoryBlobStorage::new());
        let log = ActivityLog::new();
        let generation = Generation::start(specification(), layout(), storage, log.clone())
            .await
            .unwrap();
        let http = StaticHttpClient::new()
            .with_existing("https://github.com/Azure/azure-sdk-for-python")
            .with_body(PYTHON_CONFIG_URL, r#"{ "meta": { "after_scripts": ["black ."] } }"#);
        let config = SpecificationRepositoryConfiguration::default();
        let languages = LanguageRegistry::builtin();

        for readme in ["mysql/readme.md", "mysql/readme.md", "postgres/readme.md"] {
            let added = generation
                .add_readme_to_generate(
                    &target(readme, "azure-sdk-for-python"),
                    &config,
                    &languages,
                    &http,
                )
                .await
                .unwrap();
            assert_eq!(added.unwrap().full_name(), "Azure/azure-sdk-for-python");
        }

        let records = generation.sdk_repositories().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].language_name, "Python");
        assert_eq!(records[0].readme_urls, vec!["mysql/readme.md", "postgres/readme.md"]);
        assert_eq!(records[0].after_scripts(), vec!["black .".to_string()]);
        assert_eq!(records[0].status, AutomationStatus::Pending);
        assert_eq!(
            http.requests()
                .await
                .iter()
                .filter(|r| r.starts_with("GET"))
                .count(),
            1
        );
        assert!(log.contains(
            "SDK repository Azure/azure-sdk-for-python matches programming language Python."
        ));
        assert!(log.contains(
            "Adding readme.md to generate to Azure/azure-sdk-for-python: postgres/readme.md"
        ));
    }

    #[tokio::test]
    async fn unknown_language_adds_nothing() {
        let storage = Arc::new(InMemoryBlobStorage::new());
        let log = ActivityLog::new();
        let generation = Generation::start(specification(), layout(), storage, log.clone())
            .await
            .unwrap();

        let added = generation
            .add_readme_to_generate(
                &target("mysql/readme.md", "azure-cli-extensions"),
                &SpecificationRepositoryConfiguration::default(),
                &LanguageRegistry::builtin(),
                &StaticHttpClient::new(),
            )
            .await
            .unwrap();

        assert!(added.is_none());
        assert!(generation.sdk_repositories().await.is_empty());
        assert!(log.contains(
            "No supported programming language matches the repository Azure/azure-cli-extensions."
        ));
    }

    #[tokio::test]
    async fn missing_generator_configuration_fails_the_repository() {
        let storage = Arc::new(InMemoryBlobStorage::new());
        let generation = Generation::start(specification(), layout(), storage, ActivityLog::new())
            .await
            .unwrap();
        let http =
            StaticHttpClient::new().with_existing("https://github.com/Azure/azure-sdk-for-python");

        generation
            .add_readme_to_generate(
                &target("mysql/readme.md", "azure-sdk-for-python"),
                &SpecificationRepositoryConfiguration::default(),
                &LanguageRegistry::builtin(),
                &http,
            )
            .await
            .unwrap();

        let record = &generation.sdk_repositories().await[0];
        assert_eq!(record.status, AutomationStatus::Failed);
        assert!(record.error.as_deref().unwrap().contains("status 404"));
    }

    #[tokio::test]
    async fn main_branch_policy_is_read_from_generator_configuration() {
        let storage = Arc::new(InMemoryBlobStorage::new());
        let generation = Generation::start(specification(), layout(), storage, ActivityLog::new())
            .await
            .unwrap();
        let config = parse_specification_configuration(
            r#"{ "sdkRepositoryMappings": { "azure-sdk-for-python": {
                "mainRepository": "Azure/azure-sdk-for-python",
                "integrationRepository": "integration/azure-sdk-for-python"
            } } }"#,
            "inline",
        )
        .unwrap();
        let http = StaticHttpClient::new()
            .with_existing("https://github.com/Azure/azure-sdk-for-python")
            .with_body(
                PYTHON_CONFIG_URL,
                r#"{ "meta": { "advanced_options": { "sdk_generation_pull_request_base": "main_branch" } } }"#,
            );

        generation
            .add_readme_to_generate(
                &target("mysql/readme.md", "azure-sdk-for-python"),
                &config,
                &LanguageRegistry::builtin(),
                &http,
            )
            .await
            .unwrap();

        let record = &generation.sdk_repositories().await[0];
        assert_eq!(
            record.topology.integration_repository.full_name(),
            "Azure/azure-sdk-for-python"
        );
        assert_eq!(
            record.integration_repository_url,
            "https://github.com/Azure/azure-sdk-for-python"
        );
    }

    #[tokio::test]
    async fn persists_record_comment_and_log() {
        let storage = Arc::new(InMemoryBlobStorage::new());
        let log = ActivityLog::new();
        let generation = Generation::start(specification(), layout(), storage.clone(), log.clone())
            .await
            .unwrap();
        let http = StaticHttpClient::new()
            .with_existing("https://github.com/Azure/azure-sdk-for-python")
            .with_body(PYTHON_CONFIG_URL, "{}");
        generation
            .add_readme_to_generate(
                &target("mysql/readme.md", "azure-sdk-for-python"),
                &SpecificationRepositoryConfiguration::default(),
                &LanguageRegistry::builtin(),
                &http,
            )
            .await
            .unwrap();

        let mut record = generation.sdk_repositories().await.remove(0);
        record.refresh_status();
        generation.update_sdk_repository(record).await;
        generation.persist(&TemplateRenderer::new()).await.unwrap();

        let data = storage.text("Azure/azure-rest-api-specs/4994/1/data.json").await.unwrap();
        assert!(data.contains("\"sdkRepositories\""));
        let comment = storage.text("Azure/azure-rest-api-specs/4994/1/comment.html").await.unwrap();
        assert!(comment.contains("<b>Azure/azure-sdk-for-python</b> (Python): succeeded"));
        let logs = storage.text("Azure/azure-rest-api-specs/4994/1/logs.txt").await.unwrap();
        assert!(logs.starts_with("Starting generation iteration 1"));

        let latest = load_latest_generation(storage.as_ref(), &layout(), 4994)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.iteration, 1);
        assert_eq!(latest.sdk_repositories.len(), 1);
    }

    #[tokio::test]
    async fn unpersisted_iteration_falls_back_to_previous_record() {
        let storage = Arc::new(InMemoryBlobStorage::new());
        let first =
            Generation::start(specification(), layout(), storage.clone(), ActivityLog::new())
                .await
                .unwrap();
        first.persist(&TemplateRenderer::new()).await.unwrap();

        let second =
            Generation::start(specification(), layout(), storage.clone(), ActivityLog::new())
                .await
                .unwrap();
        assert_eq!(second.iteration(), 2);

        let latest = load_latest_generation(storage.as_ref(), &layout(), 4994)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.iteration, 1);
    }

    #[tokio::test]
    async fn no_persisted_iteration_loads_nothing() {
        let storage = Arc::new(InMemoryBlobStorage::new());
        Generation::start(specification(), layout(), storage.clone(), ActivityLog::new())
            .await
            .unwrap();

        let latest = load_latest_generation(storage.as_ref(), &layout(), 4994)
            .await
            .unwrap();
        assert!(latest.is_none());
    }
}
