//! Clone setup, code generation and the changed-package diff.

mod error;

pub use error::DiffError;

use crate::activity_log::ActivityLog;
use crate::config::LanguageConfiguration;
use crate::generator::{Generator, GeneratorRequest};
use crate::git::{
    parse_diff_files, DiffOptions, Git, REMOTE_GENERATION, REMOTE_INTEGRATION, REMOTE_MAIN,
};
use crate::packages::{find_package_folders, PackageFolder};
use crate::storage::{BlobLayout, BlobStorage};
use crate::topology::RepositoryTopology;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info_span, Instrument};

/// Committer identity configured in every clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

impl Default for CommitIdentity {
    fn default() -> Self {
        Self {
            name: "SDK Automation".to_string(),
            email: "sdkautomation@noreply.github.com".to_string(),
        }
    }
}

/// Result of generating into a clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationDiff {
    /// Every changed file, relative to the clone root.
    pub changed_files: Vec<String>,
    /// Changed package folders in order of discovery.
    pub packages: Vec<PackageFolder>,
    /// URL of the stored full diff, when anything changed.
    pub diff_url: Option<String>,
}

impl GenerationDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_files.is_empty()
    }
}

/// Clones the generation repository, registers the three remotes and checks
/// out a local branch tracking the main branch.
///
/// # Errors
///
/// Returns [`DiffError::Git`] if any git step fails.
pub async fn prepare_clone(
    git: &Git,
    topology: &RepositoryTopology,
    token: Option<&str>,
    identity: &CommitIdentity,
    log: &ActivityLog,
) -> Result<(), DiffError> {
    log.info(format!(
        "Cloning {} into {}...",
        topology.generation_repository,
        git.folder().display()
    ));
    git.clone_from(&topology.generation_repository.clone_url(token))
        .await?;
    git.configure_identity(&identity.name, &identity.email)
        .await?;

    for (remote, repository) in [
        (REMOTE_GENERATION, &topology.generation_repository),
        (REMOTE_INTEGRATION, &topology.integration_repository),
        (REMOTE_MAIN, &topology.main_repository),
    ] {
        git.add_remote(remote, &repository.clone_url(token)).await?;
    }
    git.fetch_all().await?;

    git.checkout_tracking(&topology.remote_main_branch(), &topology.local_main_branch())
        .await?;
    Ok(())
}

/// Runs the generator once per readme, in order.
///
/// # Errors
///
/// Returns [`DiffError::Generator`] for the first readme that fails.
pub async fn generate(
    generator: &dyn Generator,
    git: &Git,
    language: &LanguageConfiguration,
    readme_urls: &[String],
    options: &BTreeMap<String, Value>,
    environment: &BTreeMap<String, String>,
    log: &ActivityLog,
) -> Result<(), DiffError> {
    for readme_url in readme_urls {
        let request = GeneratorRequest {
            readme_url: readme_url.clone(),
            repository_folder: git.folder().to_path_buf(),
            language: language.clone(),
            options: options.clone(),
            environment: environment.clone(),
        };
        let span = info_span!("generate", readme = %readme_url);
        generator.generate(&request, log).instrument(span).await?;
    }
    Ok(())
}

/// Diffs the generated working tree against the main branch and partitions
/// the changed files into package folders.
///
/// The full diff is stored as `diff.txt` below the SDK repository's prefix.
/// The index is left clean afterwards.
///
/// # Errors
///
/// Returns [`DiffError`] if git or the diff upload fails.
pub async fn diff_changes(
    git: &Git,
    topology: &RepositoryTopology,
    language: &LanguageConfiguration,
    storage: &dyn BlobStorage,
    layout: &BlobLayout,
    iteration: u32,
    log: &ActivityLog,
) -> Result<GenerationDiff, DiffError> {
    let remote_main = topology.remote_main_branch();
    git.stage_all().await?;
    let diff = git
        .diff(&DiffOptions {
            commit: &remote_main,
            staged: true,
            name_only: false,
            ignore_all_space: true,
        })
        .await?;
    git.unstage_all().await?;

    let changed_files = parse_diff_files(&diff);
    if changed_files.is_empty() {
        log.info("No changes were detected after generation.");
        return Ok(GenerationDiff {
            changed_files,
            packages: Vec::new(),
            diff_url: None,
        });
    }

    let diff_path = layout.diff(iteration, &topology.main_repository);
    storage.write(&diff_path, diff.as_bytes()).await?;

    log.info("The following files were changed:");
    for file in &changed_files {
        log.info(format!("  {file}"));
    }

    let packages = find_package_folders(&changed_files, git.folder(), &language.partition).await;
    log.info(format!(
        "Found {} package folder(s) that changed:",
        packages.len()
    ));
    for package in &packages {
        log.info(format!("  {}", package.relative_folder));
    }

    Ok(GenerationDiff {
        changed_files,
        packages,
        diff_url: Some(storage.url(&diff_path)),
    })
}
