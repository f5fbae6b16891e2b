//! Close/merge reconciliation of generation pull requests.
//!
//! When a specification pull request is closed, the generation pull requests
//! of its latest iteration are closed (or merged, when the specification pull
//! request merged) and relabeled. A merged generation pull request that
//! targeted an integration branch gets an integration pull request into the
//! main branch.

mod integration;

use crate::activity_log::ActivityLog;
use crate::generation::{
    load_latest_generation, GenerationError, SdkRepositoryRecord, SpecificationPullRequest,
};
use crate::host::{HostError, PullRequest, SourceControlHost};
use crate::labels::{apply_labels, PullRequestRole, SpecPhase};
use crate::pull_requests::{PrError, PrStatus};
use crate::repository::RepositoryName;
use crate::storage::{BlobLayout, BlobStorage};
use crate::templates::{generation_branch_suffix, TemplateRenderer};
use crate::topology::RepositoryTopology;
use tracing::{info_span, Instrument};

/// What happens to matching generation pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Close,
    Merge,
}

impl Action {
    fn phase(self) -> SpecPhase {
        match self {
            Self::Close => SpecPhase::Closed,
            Self::Merge => SpecPhase::Merged,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Merge => "merge",
        }
    }
}

/// Reconciles the generation pull requests of one specification pull request.
pub struct Reconciler<'a> {
    host: &'a dyn SourceControlHost,
    renderer: &'a TemplateRenderer,
    storage: &'a dyn BlobStorage,
    layout: &'a BlobLayout,
    specification: &'a SpecificationPullRequest,
    log: ActivityLog,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub fn new(
        host: &'a dyn SourceControlHost,
        renderer: &'a TemplateRenderer,
        storage: &'a dyn BlobStorage,
        layout: &'a BlobLayout,
        specification: &'a SpecificationPullRequest,
        log: ActivityLog,
    ) -> Self {
        Self {
            host,
            renderer,
            storage,
            layout,
            specification,
            log,
        }
    }

    /// Reconciles for `phase`. In-progress specification pull requests need
    /// no reconciliation.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the latest generation cannot be loaded.
    pub async fn reconcile(&self, phase: SpecPhase) -> Result<Vec<PrStatus>, GenerationError> {
        match phase {
            SpecPhase::InProgress => Ok(Vec::new()),
            SpecPhase::Closed => self.close_generation_pull_requests().await,
            SpecPhase::Merged => self.merge_generation_pull_requests().await,
        }
    }

    /// Closes the open generation pull requests and deletes their branches.
    ///
    /// Repositories with `disable_generation_pr_automation` are only relabeled.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the latest generation cannot be loaded.
    pub async fn close_generation_pull_requests(&self) -> Result<Vec<PrStatus>, GenerationError> {
        self.run(Action::Close).await
    }

    /// Merges the open generation pull requests, deletes their branches and
    /// opens integration pull requests where needed.
    ///
    /// Repositories with `disable_generation_pr_automation` are only relabeled.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the latest generation cannot be loaded.
    pub async fn merge_generation_pull_requests(&self) -> Result<Vec<PrStatus>, GenerationError> {
        self.run(Action::Merge).await
    }

    async fn run(&self, action: Action) -> Result<Vec<PrStatus>, GenerationError> {
        let Some(generation) =
            load_latest_generation(self.storage, self.layout, self.specification.number).await?
        else {
            self.log.info(format!(
                "No generation found for {}. Nothing to {}.",
                self.specification.html_url,
                action.verb()
            ));
            return Ok(Vec::new());
        };

        let mut statuses = Vec::new();
        for record in &generation.sdk_repositories {
            let log = self.log.scoped(record.topology.main_repository.full_name());
            let span = info_span!(
                "reconcile",
                repo = %record.topology.main_repository,
                action = action.verb()
            );
            statuses.extend(self.reconcile_repository(record, action, &log).instrument(span).await);
        }
        Ok(statuses)
    }

    async fn reconcile_repository(
        &self,
        record: &SdkRepositoryRecord,
        action: Action,
        log: &ActivityLog,
    ) -> Vec<PrStatus> {
        let mut statuses = Vec::new();
        let mut pull_requests: Vec<PullRequest> = Vec::new();
        for repository in searched_repositories(&record.topology) {
            match self.open_generation_pull_requests(record, repository).await {
                Ok(found) => {
                    for pull_request in found {
                        if !pull_requests
                            .iter()
                            .any(|seen| seen.html_url == pull_request.html_url)
                        {
                            pull_requests.push(pull_request);
                        }
                    }
                }
                Err(e) => {
                    log.error(format!(
                        "Failed to list generation pull requests in {repository}: {e}"
                    ));
                    statuses.push(PrStatus::Failed {
                        error: e.to_string(),
                    });
                }
            }
        }

        for pull_request in &pull_requests {
            statuses.extend(
                self.reconcile_pull_request(record, pull_request, action, log)
                    .await,
            );
        }
        statuses
    }

    /// Open pull requests from `{prefix}/*@{number}` in `repository`.
    async fn open_generation_pull_requests(
        &self,
        record: &SdkRepositoryRecord,
        repository: &RepositoryName,
    ) -> Result<Vec<PullRequest>, PrError> {
        let topology = &record.topology;
        let prefix = format!("{}/", topology.integration_branch_prefix);
        let suffix = generation_branch_suffix(self.specification.number);

        Ok(self
            .host
            .list_open_pull_requests(repository)
            .await?
            .into_iter()
            .filter(|pr| {
                pr.head.repository == topology.generation_repository
                    && pr.head.ref_name.starts_with(&prefix)
                    && pr.head.ref_name.ends_with(&suffix)
            })
            .collect())
    }

    /// Closes or merges one pull request and relabels it. Host failures are
    /// logged and reported as failed statuses; relabeling runs regardless.
    async fn reconcile_pull_request(
        &self,
        record: &SdkRepositoryRecord,
        pull_request: &PullRequest,
        action: Action,
        log: &ActivityLog,
    ) -> Vec<PrStatus> {
        let repository = &pull_request.base.repository;
        let disabled = record
            .generator_configuration
            .advanced_options()
            .disable_generation_pr_automation;
        let url = &pull_request.html_url;

        let status = if disabled {
            log.info(format!(
                "Skip to {} generation pull request at {url} as it's disabled in config.",
                action.verb()
            ));
            PrStatus::Skipped {
                reason: format!("{} disabled in config", action.verb()),
            }
        } else {
            match self.close_or_merge(pull_request, action, log).await {
                Ok(status) => status,
                Err(e) => {
                    log.error(format!(
                        "Failed to {} the generation pull request at {url}: {e}",
                        action.verb()
                    ));
                    PrStatus::Failed {
                        error: e.to_string(),
                    }
                }
            }
        };
        let merged = matches!(status, PrStatus::Merged { .. });
        let mut statuses = vec![status];

        if let Err(e) = apply_labels(
            self.host,
            repository,
            pull_request,
            PullRequestRole::Generation,
            action.phase(),
            log,
        )
        .await
        {
            log.error(format!("Failed to label the generation pull request at {url}: {e}"));
            statuses.push(PrStatus::Failed {
                error: e.to_string(),
            });
        }

        if merged {
            match integration::ensure_integration_pull_request(
                self.host,
                self.renderer,
                &record.topology,
                self.specification,
                pull_request,
                log,
            )
            .await
            {
                Ok(Some(created)) => statuses.push(created),
                Ok(None) => {}
                Err(e) => {
                    log.error(format!(
                        "Failed to create the integration pull request for {url}: {e}"
                    ));
                    statuses.push(PrStatus::Failed {
                        error: e.to_string(),
                    });
                }
            }
        }
        statuses
    }

    async fn close_or_merge(
        &self,
        pull_request: &PullRequest,
        action: Action,
        log: &ActivityLog,
    ) -> Result<PrStatus, HostError> {
        let repository = &pull_request.base.repository;
        let url = &pull_request.html_url;
        match action {
            Action::Close => {
                log.info(format!("Closing pull request {url}..."));
                self.host
                    .close_pull_request(repository, pull_request.number)
                    .await?;
            }
            Action::Merge => {
                log.info(format!("Merging pull request {url}..."));
                self.host
                    .merge_pull_request(repository, pull_request.number)
                    .await?;
            }
        }

        let head = &pull_request.head;
        log.info(format!(
            "Deleting branch \"{}\" in {}...",
            head.ref_name, head.repository
        ));
        self.host
            .delete_branch(&head.repository, &head.ref_name)
            .await?;

        Ok(match action {
            Action::Close => PrStatus::Closed {
                number: pull_request.number,
                url: url.clone(),
            },
            Action::Merge => PrStatus::Merged {
                number: pull_request.number,
                url: url.clone(),
            },
        })
    }
}

/// Repositories generation pull requests may live in: the integration
/// repository, and the main repository when it differs. Earlier iterations
/// may have used another pull request base or an existence fallback.
fn searched_repositories(topology: &RepositoryTopology) -> Vec<&RepositoryName> {
    let mut repositories = vec![&topology.integration_repository];
    if topology.main_repository != topology.integration_repository {
        repositories.push(&topology.main_repository);
    }
    repositories
}
