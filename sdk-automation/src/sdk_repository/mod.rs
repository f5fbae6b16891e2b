//! Processing of one SDK repository within a generation iteration.
//!
//! Clone, generate, diff, then run every changed package through its
//! lifecycle in discovery order. Failures end up in the record's status and
//! never escape to sibling SDK repositories.

mod error;

pub use error::SdkRepositoryError;

use crate::activity_log::ActivityLog;
use crate::commands::{resolve_environment_variables, CommandRunner};
use crate::config::LanguageRegistry;
use crate::diff_engine::{diff_changes, generate, prepare_clone, CommitIdentity};
use crate::generation::{SdkRepositoryRecord, SpecificationPullRequest};
use crate::generator::Generator;
use crate::git::{Git, GitExecutor};
use crate::host::SourceControlHost;
use crate::http::HttpClient;
use crate::packages::{
    package_name, process_package, Package, PackageContext, PackageError, PackageOutcome,
};
use crate::pull_requests::PrStatus;
use crate::status::AutomationStatus;
use crate::storage::{BlobLayout, BlobStorage};
use crate::templates::TemplateRenderer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info_span, Instrument};

/// Capabilities shared by every SDK repository of a run.
#[derive(Clone)]
pub struct Services {
    pub git: Arc<dyn GitExecutor>,
    pub generator: Arc<dyn Generator>,
    pub commands: Arc<dyn CommandRunner>,
    pub host: Arc<dyn SourceControlHost>,
    pub storage: Arc<dyn BlobStorage>,
    pub http: Arc<dyn HttpClient>,
}

/// Iteration-wide inputs for processing SDK repositories.
pub struct RepositoryContext<'a> {
    pub services: &'a Services,
    pub languages: &'a LanguageRegistry,
    pub renderer: &'a TemplateRenderer,
    pub specification: &'a SpecificationPullRequest,
    pub layout: &'a BlobLayout,
    pub iteration: u32,
    /// Token embedded in clone and remote URLs.
    pub token: Option<&'a str>,
    pub identity: &'a CommitIdentity,
    /// Leave clone folders on disk after processing.
    pub keep_clones: bool,
}

/// A processed SDK repository and the pull requests its packages touched.
#[derive(Debug, Clone)]
pub struct SdkRepositoryOutcome {
    pub record: SdkRepositoryRecord,
    pub pull_requests: Vec<PrStatus>,
}

/// Processes one SDK repository in `work_folder`.
///
/// Records that already failed (for example because their generator
/// configuration could not be fetched) are returned untouched.
pub async fn process_sdk_repository(
    ctx: &RepositoryContext<'_>,
    mut record: SdkRepositoryRecord,
    work_folder: &Path,
    log: &ActivityLog,
) -> SdkRepositoryOutcome {
    let main = record.topology.main_repository.clone();
    let log = log.scoped(main.full_name());
    let mut pull_requests = Vec::new();

    if record.status == AutomationStatus::Failed {
        log.warn(format!("Skipping {main} because it already failed."));
        return SdkRepositoryOutcome {
            record,
            pull_requests,
        };
    }

    let clone_folder = clone_folder(&record, work_folder);
    let git = Git::new(Arc::clone(&ctx.services.git), &clone_folder, log.clone());
    let span = info_span!("sdk_repository", repo = %main, language = %record.language_name);

    record.status = AutomationStatus::InProgress;
    let result = run(ctx, &mut record, &git, &log, &mut pull_requests)
        .instrument(span)
        .await;
    match result {
        Ok(()) => record.refresh_status(),
        Err(e) => {
            log.error(format!("Failed to process {main}: {e}"));
            record.fail(e.to_string());
        }
    }

    if !ctx.keep_clones {
        delete_clone(&main.full_name(), &clone_folder, &log).await;
    }

    SdkRepositoryOutcome {
        record,
        pull_requests,
    }
}

fn clone_folder(record: &SdkRepositoryRecord, work_folder: &Path) -> PathBuf {
    let name = record
        .generator_configuration
        .advanced_options()
        .clone_dir
        .clone()
        .filter(|dir| !dir.is_empty())
        .unwrap_or_else(|| record.topology.main_repository.name.clone());
    work_folder.join(name)
}

async fn run(
    ctx: &RepositoryContext<'_>,
    record: &mut SdkRepositoryRecord,
    git: &Git,
    log: &ActivityLog,
    pull_requests: &mut Vec<PrStatus>,
) -> Result<(), SdkRepositoryError> {
    let language = ctx
        .languages
        .get(&record.language_name)
        .ok_or_else(|| SdkRepositoryError::UnknownLanguage {
            name: record.language_name.clone(),
        })?;
    let services = ctx.services;

    prepare_clone(git, &record.topology, ctx.token, ctx.identity, log).await?;

    let environment =
        resolve_environment_variables(&record.generator_configuration.meta.envs, git.folder());
    generate(
        services.generator.as_ref(),
        git,
        language,
        &record.readme_urls,
        &record.generator_configuration.meta.generator_options,
        &environment,
        log,
    )
    .await?;

    let diff = diff_changes(
        git,
        &record.topology,
        language,
        services.storage.as_ref(),
        ctx.layout,
        ctx.iteration,
        log,
    )
    .await?;
    record.diff_url = diff.diff_url;

    let mut packages = Vec::with_capacity(diff.packages.len());
    for folder in diff.packages {
        let name = package_name(language, &folder.relative_folder);
        log.info(format!(
            "Package name for \"{}\" is \"{name}\".",
            git.folder().join(&folder.relative_folder).display()
        ));
        packages.push(Package::new(
            name,
            folder,
            &record.topology.integration_branch_prefix,
            ctx.specification.number,
        )?);
    }
    record.packages = packages;

    let after_scripts = record.after_scripts();
    let package_ctx = PackageContext {
        git,
        topology: &record.topology,
        language,
        advanced_options: record.generator_configuration.advanced_options(),
        after_scripts: &after_scripts,
        specification: ctx.specification,
        commands: services.commands.as_ref(),
        storage: services.storage.as_ref(),
        host: services.host.as_ref(),
        renderer: ctx.renderer,
        layout: ctx.layout,
        iteration: ctx.iteration,
        environment: &environment,
    };

    for package in &mut record.packages {
        let package_log = log.scoped(&package.name);
        match process_package(&package_ctx, package, &package_log).await {
            Ok(PackageOutcome::PullRequest(status)) => pull_requests.push(status),
            Ok(PackageOutcome::Unchanged | PackageOutcome::Pushed) => {}
            Err(PackageError::PullRequest(e)) => pull_requests.push(PrStatus::Failed {
                error: e.to_string(),
            }),
            Err(e) if e.stops_repository() => {
                log.error("Skipping the remaining packages of this repository.");
                break;
            }
            Err(_) => {}
        }
    }

    Ok(())
}

async fn delete_clone(repository: &str, folder: &Path, log: &ActivityLog) {
    log.info(format!(
        "Deleting clone of {repository} at folder {}...",
        folder.display()
    ));
    match tokio::fs::remove_dir_all(folder).await {
        Ok(()) => log.info(format!(
            "Finished deleting clone of {repository} at folder {}.",
            folder.display()
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log.warn(format!(
            "Failed to delete clone of {repository} at folder {}: {e}",
            folder.display()
        )),
    }
}
