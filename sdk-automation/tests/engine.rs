//! End-to-end runs of the engine against in-memory capabilities.

use sdk_automation::fakes::{
    InMemoryHost, RecordingCommandRunner, RecordingGitExecutor, ScriptedGenerator, StaticHttpClient,
};
use sdk_automation::{
    load_event, load_language_registry, load_specification_configuration, InMemoryBlobStorage,
    RepositoryName, RunSummary, Runner, RunnerConfig, Services,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const FULL_DIFF: &str = "--no-pager diff main/master --staged --ignore-all-space";
const STAGED_VS_MAIN: &str = "--no-pager diff main/master --staged --ignore-all-space --name-only";
const PYTHON_CONFIG_URL: &str =
    "https://raw.githubusercontent.com/Azure/azure-sdk-for-python/master/swagger_to_sdk_config.json";
const WHEEL: &str = "azure-mgmt-rdbms/dist/azure_mgmt_rdbms-1.0.0-py3-none-any.whl";
const MAIN_URL: &str = "https://github.com/Azure/azure-sdk-for-python";
const FORK_URL: &str = "https://github.com/azure-sdk/azure-sdk-for-python";

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(relative)
}

fn generation_repository() -> RepositoryName {
    RepositoryName::new("azure-sdk", "azure-sdk-for-python")
}

struct Engine {
    work: TempDir,
    git: Arc<RecordingGitExecutor>,
    host: Arc<InMemoryHost>,
    storage: Arc<InMemoryBlobStorage>,
    commands: Arc<RecordingCommandRunner>,
    runner: Runner,
}

impl Engine {
    fn new() -> Self {
        Self::with_existing_repositories(&[MAIN_URL, FORK_URL])
    }

    fn with_existing_repositories(urls: &[&str]) -> Self {
        let work = TempDir::new().unwrap();
        let host = Arc::new(InMemoryHost::new());
        let storage = Arc::new(InMemoryBlobStorage::new());
        let commands = Arc::new(
            RecordingCommandRunner::new().with_file_output("make azure-mgmt-rdbms", WHEEL, "wheel"),
        );
        let git = Arc::new(
            RecordingGitExecutor::new()
                .with_response(
                    FULL_DIFF,
                    "diff --git a/azure-mgmt-rdbms/setup.py b/azure-mgmt-rdbms/setup.py\n",
                )
                .with_response(STAGED_VS_MAIN, "azure-mgmt-rdbms/setup.py\n"),
        );
        let config_body = std::fs::read_to_string(fixture("swagger_to_sdk_config.json")).unwrap();
        let http = urls
            .iter()
            .fold(StaticHttpClient::new(), |http, url| http.with_existing(url))
            .with_body(PYTHON_CONFIG_URL, config_body);

        let services = Services {
            git: git.clone(),
            generator: Arc::new(
                ScriptedGenerator::new().with_file("azure-mgmt-rdbms/setup.py", "setup()"),
            ),
            commands: commands.clone(),
            host: host.clone(),
            storage: storage.clone(),
            http: Arc::new(http),
        };
        let specification_config =
            load_specification_configuration(&fixture("specificationRepositoryConfiguration.json"))
                .unwrap();
        let languages = load_language_registry(Some(&fixture("languages.toml"))).unwrap();
        let config = RunnerConfig::new(work.path().to_path_buf(), None, 2);

        Self {
            runner: Runner::new(config, services, specification_config, languages),
            work,
            git,
            host,
            storage,
            commands,
        }
    }

    async fn handle(&self, event: &str) -> RunSummary {
        let event = load_event(&fixture(event)).unwrap();
        self.runner.run(&event).await.unwrap()
    }

    async fn json(&self, path: &str) -> serde_json::Value {
        let text = self.storage.text(path).await.unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

#[tokio::test]
async fn opened_event_generates_python_and_fails_go_in_isolation() {
    let engine = Engine::new();

    let summary = engine.handle("events/opened.json").await;

    assert_eq!(summary.iteration, Some(1));
    assert_eq!(summary.repositories_succeeded, 1);
    assert_eq!(summary.repositories_failed, 1);
    assert_eq!(summary.prs_created, 1);
    assert!(summary.has_failures());

    let record = engine.json("Azure/azure-rest-api-specs/4994/1/data.json").await;
    let repositories = record["sdkRepositories"].as_array().unwrap();
    assert_eq!(repositories.len(), 2);
    let python = &repositories[0];
    assert_eq!(python["mainRepository"], "Azure/azure-sdk-for-python");
    assert_eq!(python["status"], "succeeded");
    assert_eq!(
        python["packages"][0]["generationBranch"],
        "sdkAutomation/azure-mgmt-rdbms@4994"
    );
    let go = &repositories[1];
    assert_eq!(go["status"], "failed");
    assert!(go["error"].as_str().unwrap().contains("status 404"));

    let comment = engine
        .storage
        .text("Azure/azure-rest-api-specs/4994/1/comment.html")
        .await
        .unwrap();
    assert!(comment.contains("azure-mgmt-rdbms"));
    let logs = engine
        .storage
        .text("Azure/azure-rest-api-specs/4994/1/logs.txt")
        .await
        .unwrap();
    assert!(logs.contains("azure-mgmt-rdbms\" is \"azure-mgmt-rdbms\"."));

    let pull_requests = engine.host.pull_requests(&generation_repository()).await;
    assert_eq!(pull_requests.len(), 1);
    assert_eq!(pull_requests[0].head.ref_name, "sdkAutomation/azure-mgmt-rdbms@4994");
    assert_eq!(pull_requests[0].base.ref_name, "sdkAutomation/azure-mgmt-rdbms");

    let requests = engine.commands.requests().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].environment["VIRTUAL_ENV"].ends_with("venv"));
    assert!(engine
        .storage
        .paths()
        .await
        .iter()
        .any(|path| path.ends_with("azure_mgmt_rdbms-1.0.0-py3-none-any.whl")));
    assert!(!engine.work.path().join("1/azure-sdk-for-python").exists());
}

#[tokio::test]
async fn second_iteration_updates_the_open_pull_request() {
    let engine = Engine::new();
    engine.handle("events/opened.json").await;

    let summary = engine.handle("events/opened.json").await;

    assert_eq!(summary.iteration, Some(2));
    assert_eq!(summary.prs_created, 0);
    assert_eq!(summary.prs_updated, 1);
    assert_eq!(engine.host.pull_requests(&generation_repository()).await.len(), 1);

    let record = engine.json("Azure/azure-rest-api-specs/4994/data.json").await;
    assert_eq!(record["currentIteration"], 2);
}

#[tokio::test]
async fn merged_event_merges_and_opens_integration_pull_request() {
    let engine = Engine::new();
    engine.handle("events/opened.json").await;

    let summary = engine.handle("events/merged.json").await;

    assert_eq!(summary.iteration, Some(1));
    assert_eq!(summary.prs_merged, 1);
    assert_eq!(summary.prs_created, 1);
    assert!(!summary.has_failures());

    let generation_pr = engine
        .host
        .pull_request(&generation_repository(), 1)
        .await
        .unwrap();
    assert!(generation_pr.merged);
    assert!(generation_pr.labels.iter().any(|l| l == "SpecPRMerged"));

    let main = RepositoryName::new("Azure", "azure-sdk-for-python");
    let integration = engine.host.pull_request(&main, 1).await.unwrap();
    assert_eq!(integration.base.ref_name, "master");
    assert_eq!(integration.head.ref_name, "sdkAutomation/azure-mgmt-rdbms");
    assert!(integration.labels.iter().any(|l| l == "IntegrationPR"));

    let calls = engine.host.calls().await;
    assert!(calls.contains(
        &"delete_branch azure-sdk/azure-sdk-for-python sdkAutomation/azure-mgmt-rdbms@4994"
            .to_string()
    ));

    let logs = engine
        .storage
        .text("Azure/azure-rest-api-specs/4994/1/logs.txt")
        .await
        .unwrap();
    assert!(logs.contains("Merging pull request"));
}

#[tokio::test]
async fn missing_sdk_fork_moves_branches_and_pull_requests_to_main_repository() {
    let engine = Engine::with_existing_repositories(&[MAIN_URL]);

    let summary = engine.handle("events/opened.json").await;

    assert_eq!(summary.repositories_succeeded, 1);
    assert_eq!(summary.prs_created, 1);

    let record = engine.json("Azure/azure-rest-api-specs/4994/1/data.json").await;
    let python = &record["sdkRepositories"][0];
    assert_eq!(python["integrationRepository"], "Azure/azure-sdk-for-python");
    assert_eq!(python["generationRepository"], "Azure/azure-sdk-for-python");

    let main = RepositoryName::new("Azure", "azure-sdk-for-python");
    let pull_requests = engine.host.pull_requests(&main).await;
    assert_eq!(pull_requests.len(), 1);
    assert_eq!(pull_requests[0].head.repository, main);
    assert_eq!(pull_requests[0].head.ref_name, "sdkAutomation/azure-mgmt-rdbms@4994");
    assert_eq!(pull_requests[0].base.ref_name, "sdkAutomation/azure-mgmt-rdbms");
    assert!(engine.host.pull_requests(&generation_repository()).await.is_empty());

    let commands = engine.git.commands().await;
    assert!(commands.contains(&format!("remote add integration {MAIN_URL}")));
    assert!(!commands.iter().any(|c| c.contains(FORK_URL)));

    let logs = engine
        .storage
        .text("Azure/azure-rest-api-specs/4994/1/logs.txt")
        .await
        .unwrap();
    assert!(logs.contains(&format!(
        "Integration repository {FORK_URL} doesn't exist. Using fallback {MAIN_URL}"
    )));
}

#[test]
fn language_overrides_replace_only_named_languages() {
    let languages = load_language_registry(Some(&fixture("languages.toml"))).unwrap();

    let python = languages.get("python").unwrap();
    assert_eq!(python.build_command.as_deref(), Some("make $(package_name)"));
    assert_eq!(python.artifact_extensions, vec![".whl".to_string()]);
    assert!(languages.get("Go").is_some());
    assert_eq!(
        languages
            .find_for_repository(&RepositoryName::new("Azure", "azure-sdk-for-python"))
            .map(|l| l.name.as_str()),
        Some("Python")
    );
}
