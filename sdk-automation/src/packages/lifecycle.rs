//! Per-package branch lifecycle.
//!
//! ```text
//! Discovered -> BranchPrepared -> Committed -> ScriptsRun -> Built
//!            -> ArtifactsUploaded -> Pushed -> PullRequestReconciled
//! ```
//!
//! A package whose staged diff against the main branch is empty, before or
//! after the after-scripts ran, stops early as unchanged.

use super::{collect_artifacts, upload_artifacts, Package, PackageError, PackageStage};
use crate::activity_log::ActivityLog;
use crate::commands::{
    replace_string_variables, run_logged, CommandProperties, CommandRequest, CommandRunner,
};
use crate::config::{AdvancedOptions, LanguageConfiguration};
use crate::generation::SpecificationPullRequest;
use crate::git::{parse_name_only, DiffOptions, Git, REMOTE_GENERATION, REMOTE_INTEGRATION};
use crate::host::SourceControlHost;
use crate::pull_requests::{reconcile_generation_pull_request, PrStatus, PullRequestTarget};
use crate::status::AutomationStatus;
use crate::storage::{BlobLayout, BlobStorage};
use crate::templates::{generation_commit_title, TemplateRenderer, AFTER_SCRIPTS_COMMIT_TITLE};
use crate::topology::RepositoryTopology;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info_span, Instrument};

/// File name of uploaded installation instructions.
const INSTRUCTIONS_FILE: &str = "instructions.md";

/// Everything a package needs from its SDK repository.
pub struct PackageContext<'a> {
    pub git: &'a Git,
    pub topology: &'a RepositoryTopology,
    pub language: &'a LanguageConfiguration,
    pub advanced_options: &'a AdvancedOptions,
    pub after_scripts: &'a [String],
    pub specification: &'a SpecificationPullRequest,
    pub commands: &'a dyn CommandRunner,
    pub storage: &'a dyn BlobStorage,
    pub host: &'a dyn SourceControlHost,
    pub renderer: &'a TemplateRenderer,
    pub layout: &'a BlobLayout,
    pub iteration: u32,
    /// Extra environment for after-scripts and the build.
    pub environment: &'a BTreeMap<String, String>,
}

/// How far a package got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    /// No net change against the main branch; nothing was pushed.
    Unchanged,
    /// Pushed without touching pull requests.
    Pushed,
    /// Pushed and the generation pull request was reconciled.
    PullRequest(PrStatus),
}

/// Drives one package through its lifecycle.
///
/// The package's `status`, `stage` and result fields are updated in place,
/// including on failure.
///
/// # Errors
///
/// Returns [`PackageError`] for the first step that fails. A
/// [`PackageError::Build`] means the SDK repository's remaining packages must
/// be skipped.
pub async fn process_package(
    ctx: &PackageContext<'_>,
    package: &mut Package,
    log: &ActivityLog,
) -> Result<PackageOutcome, PackageError> {
    let span = info_span!("package", name = %package.name, branch = %package.generation_branch);

    async {
        package.status = AutomationStatus::InProgress;
        let git = ctx.git.with_log(log.clone());
        let lifecycle = Lifecycle { ctx, git, log };

        match lifecycle.run(package).await {
            Ok(outcome) => {
                package.status = AutomationStatus::Succeeded;
                Ok(outcome)
            }
            Err(e) => {
                log.error(format!(
                    "Package {} failed at stage \"{}\": {e}",
                    package.name,
                    package.stage.as_str()
                ));
                package.status = AutomationStatus::Failed;
                package.error = Some(e.to_string());
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

struct Lifecycle<'c, 'a> {
    ctx: &'c PackageContext<'a>,
    git: Git,
    log: &'c ActivityLog,
}

impl Lifecycle<'_, '_> {
    async fn run(&self, package: &mut Package) -> Result<PackageOutcome, PackageError> {
        self.prepare_branch(package).await?;
        package.stage = PackageStage::BranchPrepared;

        if !self.commit_package(package).await? {
            return Ok(PackageOutcome::Unchanged);
        }
        package.stage = PackageStage::Committed;

        if !self.run_after_scripts(package).await? {
            return Ok(PackageOutcome::Unchanged);
        }
        package.stage = PackageStage::ScriptsRun;

        self.build(package).await?;
        package.stage = PackageStage::Built;

        let instructions = self.upload(package).await?;
        package.stage = PackageStage::ArtifactsUploaded;

        self.push(package).await?;
        package.stage = PackageStage::Pushed;

        if !self.ctx.advanced_options.create_sdk_pull_requests {
            self.log.info("Creating pull request is disabled.");
            return Ok(PackageOutcome::Pushed);
        }

        let target = PullRequestTarget::resolve(
            self.ctx.topology,
            &package.integration_branch,
            &package.generation_branch,
        );
        let status = reconcile_generation_pull_request(
            self.ctx.host,
            self.ctx.renderer,
            &target,
            &package.name,
            self.ctx.specification,
            instructions.as_deref(),
            self.log,
        )
        .await?;
        package.generation_pull_request_url = status.url().map(str::to_string);
        package.stage = PackageStage::PullRequestReconciled;
        Ok(PackageOutcome::PullRequest(status))
    }

    async fn prepare_branch(&self, package: &Package) -> Result<(), PackageError> {
        let topology = self.ctx.topology;
        self.log.info(format!(
            "Creating SDK generation branch \"{}\" based off of \"{}\" in \"{}\"...",
            package.generation_branch, topology.main_branch, topology.generation_repository
        ));
        self.git.checkout(&topology.local_main_branch()).await?;
        self.git
            .create_or_reset_branch(&package.generation_branch)
            .await?;
        Ok(())
    }

    /// Commits the package folder. Returns false when nothing differs from main.
    async fn commit_package(&self, package: &mut Package) -> Result<bool, PackageError> {
        self.git.stage_path(&package.relative_folder).await?;
        let files = self.staged_against_main().await?;
        self.log
            .info(format!("{} files staged for commit:", files.len()));
        for file in &files {
            self.log.info(format!("  {file}"));
        }

        if files.is_empty() {
            self.log.info(
                "No differences were detected between the generation branch and its parent branch.",
            );
            self.git.unstage_all().await?;
            return Ok(false);
        }

        let specification = self.ctx.specification;
        self.git
            .commit(
                &generation_commit_title(specification.source_commit()),
                Some(&specification.title),
            )
            .await?;
        self.git.checkout(&package.generation_branch).await?;
        package.changed_files = files;
        Ok(true)
    }

    /// Runs after-scripts and commits what they changed in the package folder.
    /// Returns false when the package no longer differs from main.
    async fn run_after_scripts(&self, package: &mut Package) -> Result<bool, PackageError> {
        if self.ctx.after_scripts.is_empty() {
            self.log.info("No after_scripts to run.");
            return Ok(true);
        }

        let properties = self.properties(package);
        for script in self.ctx.after_scripts {
            let request = CommandRequest {
                command: replace_string_variables(script, &properties, self.log),
                working_dir: self.ctx.git.folder().to_path_buf(),
                environment: self.ctx.environment.clone(),
            };
            run_logged(self.ctx.commands, &request, self.log)
                .await
                .map_err(PackageError::AfterScript)?;
        }

        self.git.stage_path(&package.relative_folder).await?;
        let files = self.staged_against_main().await?;
        if files.is_empty() {
            self.log.info(
                "No differences were detected between the generation branch and its parent branch after the after_scripts were run.",
            );
            self.git.unstage_all().await?;
            return Ok(false);
        }

        let pending = self
            .git
            .diff(&DiffOptions {
                commit: "HEAD",
                staged: true,
                name_only: true,
                ignore_all_space: false,
            })
            .await?;
        if !parse_name_only(&pending).is_empty() {
            self.git.commit(AFTER_SCRIPTS_COMMIT_TITLE, None).await?;
        }
        package.changed_files = files;
        Ok(true)
    }

    async fn build(&self, package: &Package) -> Result<(), PackageError> {
        let Some(command) = &self.ctx.language.build_command else {
            self.log.info(format!(
                "No build command is configured for {}.",
                self.ctx.language.name
            ));
            return Ok(());
        };

        let request = CommandRequest {
            command: replace_string_variables(command, &self.properties(package), self.log),
            working_dir: self.ctx.git.folder().to_path_buf(),
            environment: self.ctx.environment.clone(),
        };
        run_logged(self.ctx.commands, &request, self.log)
            .await
            .map(drop)
            .map_err(PackageError::Build)
    }

    /// Uploads artifacts and installation instructions. Returns the
    /// instructions when any artifact was produced.
    async fn upload(&self, package: &mut Package) -> Result<Option<String>, PackageError> {
        let artifacts = collect_artifacts(
            &self.package_folder(package),
            &self.ctx.language.artifact_extensions,
        )
        .await?;
        if artifacts.is_empty() {
            self.log.info("No artifacts were produced. Skipping upload.");
            return Ok(None);
        }

        let main_repository = &self.ctx.topology.main_repository;
        let prefix = self
            .ctx
            .layout
            .package_prefix(self.ctx.iteration, main_repository, &package.name);
        package.artifacts =
            upload_artifacts(self.ctx.storage, &artifacts, &prefix, self.log).await?;

        self.log.info("Creating package installation instructions...");
        let instructions = self.ctx.renderer.render_instructions(
            self.ctx.language.instructions_template.as_deref(),
            &self.ctx.language.name,
            &package.name,
            &package.artifacts,
        )?;

        let latest = self
            .ctx
            .layout
            .latest_package_prefix(main_repository, &package.name);
        for prefix in [prefix, latest] {
            let path = format!("{prefix}/{INSTRUCTIONS_FILE}");
            self.log.info(format!(
                "Uploading package installation instructions to {}...",
                self.ctx.storage.url(&path)
            ));
            self.ctx.storage.write(&path, instructions.as_bytes()).await?;
            if package.instructions_url.is_none() {
                package.instructions_url = Some(self.ctx.storage.url(&path));
            }
        }

        Ok(Some(instructions))
    }

    async fn push(&self, package: &Package) -> Result<(), PackageError> {
        let topology = self.ctx.topology;
        if topology.pull_request_base.uses_integration_branch() {
            self.sync_integration_branch(package).await?;
        }

        self.log.info(format!(
            "Pushing generation branch \"{}\" to \"{}\"...",
            package.generation_branch, topology.generation_repository
        ));
        self.git
            .force_push_upstream(REMOTE_GENERATION, &package.generation_branch)
            .await?;
        Ok(())
    }

    /// Brings the integration branch up to date with main and rebases the
    /// generation branch onto it, or creates the integration branch from main.
    async fn sync_integration_branch(&self, package: &Package) -> Result<(), PackageError> {
        let topology = self.ctx.topology;
        let integration = &package.integration_branch;
        let remote_integration = format!("{REMOTE_INTEGRATION}/{integration}");

        self.log.info(format!(
            "Checking if the SDK integration branch \"{integration}\" already exists in \"{}\"...",
            topology.integration_repository
        ));
        let exists = self
            .git
            .remote_branches()
            .await?
            .contains(&remote_integration);
        self.log
            .info(format!("SDK integration branch exists: {exists}"));

        if !exists {
            self.log.info(format!(
                "Creating SDK integration branch \"{integration}\" in \"{}\" from main branch \"{}\"...",
                topology.integration_repository, topology.main_branch
            ));
            self.git.checkout(&topology.local_main_branch()).await?;
            self.git.create_or_reset_branch(integration).await?;
            self.git
                .force_push_upstream(REMOTE_INTEGRATION, integration)
                .await?;
            self.git.checkout(&package.generation_branch).await?;
            return Ok(());
        }

        self.log.info(format!(
            "Rebasing existing SDK integration branch \"{integration}\" onto main branch \"{}\"...",
            topology.main_branch
        ));
        self.git
            .checkout_tracking(&remote_integration, integration)
            .await?;
        self.rebase(&topology.remote_main_branch()).await?;
        self.git.pull().await?;
        self.git.push().await?;

        self.log.info(format!(
            "Rebasing SDK generation branch \"{}\" onto SDK integration branch \"{integration}\" from \"{}\"...",
            package.generation_branch, topology.integration_repository
        ));
        self.git.checkout(&package.generation_branch).await?;
        self.rebase(integration).await?;
        let different = self
            .git
            .diff(&DiffOptions {
                commit: &remote_integration,
                staged: true,
                name_only: true,
                ignore_all_space: true,
            })
            .await?;
        self.log.info(format!(
            "Found {} files that are different in the generation branch than its parent branch.",
            parse_name_only(&different).len()
        ));
        Ok(())
    }

    /// Rebases the current branch onto `onto`. A failed rebase is aborted
    /// before the error is returned so the clone is left on a clean branch.
    async fn rebase(&self, onto: &str) -> Result<(), PackageError> {
        if let Err(e) = self.git.rebase_theirs(onto).await {
            self.log.error(format!("Rebase onto \"{onto}\" failed: {e}"));
            self.git.rebase_abort().await?;
            return Err(e.into());
        }
        Ok(())
    }

    async fn staged_against_main(&self) -> Result<Vec<String>, PackageError> {
        let remote_main = self.ctx.topology.remote_main_branch();
        let output = self
            .git
            .diff(&DiffOptions {
                commit: &remote_main,
                staged: true,
                name_only: true,
                ignore_all_space: true,
            })
            .await?;
        Ok(parse_name_only(&output))
    }

    fn package_folder(&self, package: &Package) -> PathBuf {
        self.ctx.git.folder().join(&package.relative_folder)
    }

    fn properties(&self, package: &Package) -> CommandProperties {
        CommandProperties::new()
            .with(
                "repository_folder",
                self.ctx.git.folder().display().to_string(),
            )
            .with(
                "package_folder",
                self.package_folder(package).display().to_string(),
            )
            .with("package_name", package.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneratorConfiguration, LanguageRegistry, PullRequestBase};
    use crate::fakes::{InMemoryHost, RecordingCommandRunner, RecordingGitExecutor};
    use crate::packages::PackageFolder;
    use crate::repository::RepositoryName;
    use crate::storage::InMemoryBlobStorage;
    use std::sync::Arc;
    use tempfile::TempDir;

    const GEN: &str = "sdkAutomation/azure-mgmt-rdbms@4994";
    const INT: &str = "sdkAutomation/azure-mgmt-rdbms";
    const STAGED_VS_MAIN: &str =
        "--no-pager diff main/master --staged --ignore-all-space --name-only";

    struct Fixture {
        dir: TempDir,
        executor: Arc<RecordingGitExecutor>,
        commands: RecordingCommandRunner,
        storage: InMemoryBlobStorage,
        host: InMemoryHost,
        topology: RepositoryTopology,
        language: LanguageConfiguration,
        options: AdvancedOptions,
        after_scripts: Vec<String>,
        specification: SpecificationPullRequest,
        renderer: TemplateRenderer,
        layout: BlobLayout,
        environment: BTreeMap<String, String>,
    }

    impl Fixture {
        fn new(executor: RecordingGitExecutor, commands: RecordingCommandRunner) -> Self {
            let main = RepositoryName::new("Azure", "azure-sdk-for-python");
            let mut language = LanguageRegistry::builtin().get("Python").unwrap().clone();
            language.build_command = Some("make $(package_name)".to_string());
            Self {
                dir: TempDir::new().unwrap(),
                executor: Arc::new(executor),
                commands,
                storage: InMemoryBlobStorage::new(),
                host: InMemoryHost::new(),
                topology: RepositoryTopology {
                    main_repository: main.clone(),
                    integration_repository: main.clone(),
                    generation_repository: main,
                    integration_branch_prefix: "sdkAutomation".to_string(),
                    main_branch: "master".to_string(),
                    pull_request_base: PullRequestBase::Unset,
                },
                language,
                options: GeneratorConfiguration::default().advanced_options().clone(),
                after_scripts: Vec::new(),
                specification: serde_json::from_str(
                    r#"{
                        "number": 4994,
                        "title": "Update MySQL API",
                        "html_url": "https://github.com/Azure/azure-rest-api-specs/pull/4994",
                        "repository": "Azure/azure-rest-api-specs",
                        "head": { "repository": "Azure/azure-rest-api-specs", "branch": "mysql", "commit": "d82d149" },
                        "base": { "repository": "Azure/azure-rest-api-specs", "branch": "master", "commit": "5d20445" }
                    }"#,
                )
                .unwrap(),
                renderer: TemplateRenderer::new(),
                layout: BlobLayout::new("", &"Azure/azure-rest-api-specs".parse().unwrap(), 4994),
                environment: BTreeMap::new(),
            }
        }

        async fn run(
            &self,
            git: &Git,
            package: &mut Package,
            log: &ActivityLog,
        ) -> Result<PackageOutcome, PackageError> {
            let ctx = PackageContext {
                git,
                topology: &self.topology,
                language: &self.language,
                advanced_options: &self.options,
                after_scripts: &self.after_scripts,
                specification: &self.specification,
                commands: &self.commands,
                storage: &self.storage,
                host: &self.host,
                renderer: &self.renderer,
                layout: &self.layout,
                iteration: 1,
                environment: &self.environment,
            };
            process_package(&ctx, package, log).await
        }

        fn git(&self, log: &ActivityLog) -> Git {
            Git::new(self.executor.clone(), self.dir.path(), log.clone())
        }
    }

    fn package() -> Package {
        Package::new(
            "azure-mgmt-rdbms".to_string(),
            PackageFolder {
                relative_folder: "azure-mgmt-rdbms".to_string(),
                files: vec!["azure-mgmt-rdbms/setup.py".to_string()],
            },
            "sdkAutomation",
            4994,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn unchanged_package_is_not_pushed() {
        let fixture = Fixture::new(RecordingGitExecutor::new(), RecordingCommandRunner::new());
        let log = ActivityLog::new();
        let mut package = package();

        let outcome = fixture.run(&fixture.git(&log), &mut package, &log).await.unwrap();

        assert_eq!(outcome, PackageOutcome::Unchanged);
        assert_eq!(package.status, AutomationStatus::Succeeded);
        assert_eq!(package.stage, PackageStage::BranchPrepared);
        let commands = fixture.executor.commands().await;
        assert!(commands.iter().all(|c| !c.starts_with("push") && !c.starts_with("commit")));
        assert!(fixture.commands.commands().await.is_empty());
        assert!(fixture.storage.paths().await.is_empty());
    }

    #[tokio::test]
    async fn after_scripts_reverting_changes_leave_package_unchanged() {
        let executor = RecordingGitExecutor::new()
            .with_response(STAGED_VS_MAIN, "azure-mgmt-rdbms/setup.py\n")
            .with_response(STAGED_VS_MAIN, "");
        let mut fixture = Fixture::new(executor, RecordingCommandRunner::new());
        fixture.after_scripts = vec!["black $(package_folder)".to_string()];
        let log = ActivityLog::new();
        let mut package = package();

        let outcome = fixture.run(&fixture.git(&log), &mut package, &log).await.unwrap();

        assert_eq!(outcome, PackageOutcome::Unchanged);
        assert_eq!(package.stage, PackageStage::Committed);
        let scripts = fixture.commands.commands().await;
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].starts_with("black "));
        assert!(scripts[0].ends_with("azure-mgmt-rdbms"));
        assert!(!fixture.executor.commands().await.iter().any(|c| c.starts_with("push")));
        assert!(log.contains("after the after_scripts were run"));
    }

    #[tokio::test]
    async fn after_script_changes_get_their_own_commit() {
        let executor = RecordingGitExecutor::new()
            .with_response(STAGED_VS_MAIN, "azure-mgmt-rdbms/setup.py\n")
            .with_response(
                "--no-pager diff HEAD --staged --name-only",
                "azure-mgmt-rdbms/setup.py\n",
            );
        let mut fixture = Fixture::new(executor, RecordingCommandRunner::new());
        fixture.after_scripts = vec!["black $(package_folder)".to_string()];
        fixture.options.create_sdk_pull_requests = false;
        let log = ActivityLog::new();
        let mut package = package();

        fixture.run(&fixture.git(&log), &mut package, &log).await.unwrap();

        let commits: Vec<String> = fixture
            .executor
            .commands()
            .await
            .into_iter()
            .filter(|c| c.starts_with("commit"))
            .collect();
        assert_eq!(commits.len(), 2);
        assert!(commits[0].starts_with("commit -m Generated from"), "{commits:?}");
        assert_eq!(commits[1], "commit -m Modifications after running after_scripts");
    }

    #[tokio::test]
    async fn changed_package_creates_integration_branch_and_pull_request() {
        let executor = RecordingGitExecutor::new()
            .with_response(
                STAGED_VS_MAIN,
                "azure-mgmt-rdbms/setup.py\nazure-mgmt-rdbms/models.py\n",
            );
        let fixture = Fixture::new(
            executor,
            RecordingCommandRunner::new().with_file_output(
                "make",
                "azure-mgmt-rdbms/dist/azure_mgmt_rdbms-1.0.0-py3-none-any.whl",
                "wheel",
            ),
        );
        let log = ActivityLog::new();
        let mut package = package();

        let outcome = fixture.run(&fixture.git(&log), &mut package, &log).await.unwrap();

        assert!(matches!(
            outcome,
            PackageOutcome::PullRequest(PrStatus::Created { number: 1, .. })
        ));
        assert_eq!(package.status, AutomationStatus::Succeeded);
        assert_eq!(package.stage, PackageStage::PullRequestReconciled);
        assert_eq!(package.changed_files.len(), 2);
        assert_eq!(
            package.generation_pull_request_url.as_deref(),
            Some("https://github.com/Azure/azure-sdk-for-python/pull/1")
        );

        let commands = fixture.executor.commands().await;
        let expected = [
            "checkout main-master".to_string(),
            format!("checkout -B {GEN}"),
            "add --all -- azure-mgmt-rdbms".to_string(),
            STAGED_VS_MAIN.to_string(),
            "commit -m Generated from d82d149 -m Update MySQL API".to_string(),
            format!("checkout {GEN}"),
            "--no-pager branch --remotes".to_string(),
            "checkout main-master".to_string(),
            format!("checkout -B {INT}"),
            format!("push --set-upstream integration {INT} --force"),
            format!("checkout {GEN}"),
            format!("push --set-upstream generation {GEN} --force"),
        ];
        assert_eq!(commands, expected);

        assert_eq!(
            fixture.commands.commands().await,
            vec!["make azure-mgmt-rdbms".to_string()]
        );
        let paths = fixture.storage.paths().await;
        let iteration =
            "Azure/azure-rest-api-specs/4994/1/Azure/azure-sdk-for-python/azure-mgmt-rdbms";
        let latest = "Azure/azure-rest-api-specs/4994/Azure/azure-sdk-for-python/azure-mgmt-rdbms";
        assert!(paths.contains(&format!(
            "{iteration}/azure_mgmt_rdbms-1.0.0-py3-none-any.whl"
        )));
        assert!(paths.contains(&format!("{iteration}/instructions.md")));
        assert!(paths.contains(&format!("{latest}/instructions.md")));

        let pr = fixture
            .host
            .pull_request(&fixture.topology.integration_repository, 1)
            .await
            .unwrap();
        assert_eq!(pr.base.ref_name, INT);
        assert_eq!(pr.labels, vec!["GenerationPR", "SpecPRInProgress"]);
        let comments = fixture
            .host
            .comments(&fixture.topology.integration_repository, 1)
            .await;
        assert_eq!(comments.len(), 1);
        assert!(log.contains("SDK integration branch exists: false"));
    }

    #[tokio::test]
    async fn existing_integration_branch_is_rebased() {
        let executor = RecordingGitExecutor::new()
            .with_response(STAGED_VS_MAIN, "azure-mgmt-rdbms/setup.py\n")
            .with_response(
                "--no-pager branch --remotes",
                format!("  integration/{INT}\n  main/master\n  main/HEAD -> main/master\n"),
            );
        let mut fixture = Fixture::new(executor, RecordingCommandRunner::new());
        fixture.options.create_sdk_pull_requests = false;
        let log = ActivityLog::new();
        let mut package = package();

        let outcome = fixture.run(&fixture.git(&log), &mut package, &log).await.unwrap();

        assert_eq!(outcome, PackageOutcome::Pushed);
        let commands = fixture.executor.commands().await;
        let tail: Vec<&str> = commands[7..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "checkout --track integration/sdkAutomation/azure-mgmt-rdbms -b sdkAutomation/azure-mgmt-rdbms",
                "rebase --strategy-option=theirs main/master",
                "pull --no-rebase --strategy-option=ours",
                "push",
                "checkout sdkAutomation/azure-mgmt-rdbms@4994",
                "rebase --strategy-option=theirs sdkAutomation/azure-mgmt-rdbms",
                "--no-pager diff integration/sdkAutomation/azure-mgmt-rdbms --staged --ignore-all-space --name-only",
                "push --set-upstream generation sdkAutomation/azure-mgmt-rdbms@4994 --force",
            ]
        );
        assert!(log.contains("Creating pull request is disabled."));
        assert!(log.contains("No artifacts were produced. Skipping upload."));
    }

    #[tokio::test]
    async fn failed_rebase_is_aborted_and_fails_the_package() {
        let executor = RecordingGitExecutor::new()
            .with_response(STAGED_VS_MAIN, "azure-mgmt-rdbms/setup.py\n")
            .with_response("--no-pager branch --remotes", format!("  integration/{INT}\n"))
            .with_failure("rebase --strategy-option=theirs main/master");
        let mut fixture = Fixture::new(executor, RecordingCommandRunner::new());
        fixture.options.create_sdk_pull_requests = false;
        let log = ActivityLog::new();
        let mut package = package();

        let error = fixture
            .run(&fixture.git(&log), &mut package, &log)
            .await
            .unwrap_err();

        assert!(matches!(error, PackageError::Git(_)));
        assert!(!error.stops_repository());
        assert_eq!(package.status, AutomationStatus::Failed);
        let commands = fixture.executor.commands().await;
        assert!(commands.contains(&"rebase --abort".to_string()));
        assert!(!commands.iter().any(|c| c.starts_with("pull")));
        assert!(!commands.iter().any(|c| c.starts_with("push")));
    }

    #[tokio::test]
    async fn main_branch_policy_skips_integration_branch() {
        let executor = RecordingGitExecutor::new()
            .with_response(STAGED_VS_MAIN, "azure-mgmt-rdbms/setup.py\n");
        let mut fixture = Fixture::new(executor, RecordingCommandRunner::new());
        fixture.topology.pull_request_base = PullRequestBase::MainBranch;
        let log = ActivityLog::new();
        let mut package = package();

        fixture.run(&fixture.git(&log), &mut package, &log).await.unwrap();

        let commands = fixture.executor.commands().await;
        assert!(!commands.iter().any(|c| c.contains("branch --remotes")));
        let pr = fixture
            .host
            .pull_request(&fixture.topology.main_repository, 1)
            .await
            .unwrap();
        assert_eq!(pr.base.ref_name, "master");
    }

    #[tokio::test]
    async fn build_failure_stops_repository() {
        let executor = RecordingGitExecutor::new()
            .with_response(STAGED_VS_MAIN, "azure-mgmt-rdbms/setup.py\n");
        let fixture = Fixture::new(
            executor,
            RecordingCommandRunner::new().with_exit_code("make", 2),
        );
        let log = ActivityLog::new();
        let mut package = package();

        let error = fixture
            .run(&fixture.git(&log), &mut package, &log)
            .await
            .unwrap_err();

        assert!(error.stops_repository());
        assert_eq!(package.status, AutomationStatus::Failed);
        assert_eq!(package.stage, PackageStage::ScriptsRun);
        assert!(package.error.as_deref().unwrap().starts_with("Build failed"));
        assert!(!fixture.executor.commands().await.iter().any(|c| c.starts_with("push")));
    }
}
