//! Generation pull request management.
//!
//! A package's generation branch is proposed as a pull request whose base is
//! chosen by [`PullRequestTarget::resolve`]. Existing open pull requests with
//! the same head are updated rather than duplicated.

mod base;
mod comment;
mod error;
mod status;

pub use base::PullRequestTarget;
pub use comment::{append_integration_link, upsert_instructions_comment};
pub use error::PrError;
pub use status::PrStatus;

use crate::activity_log::ActivityLog;
use crate::generation::SpecificationPullRequest;
use crate::host::{NewPullRequest, PullRequest, PullRequestUpdate, SourceControlHost};
use crate::labels::{apply_labels, PullRequestRole, SpecPhase};
use crate::templates::{generation_pr_title, TemplateRenderer};
use tracing::{info_span, Instrument};

/// Finds the open pull request whose head is `target`'s head.
///
/// # Errors
///
/// Returns [`PrError`] if listing pull requests fails.
pub async fn find_open_pull_request(
    host: &dyn SourceControlHost,
    target: &PullRequestTarget,
) -> Result<Option<PullRequest>, PrError> {
    Ok(host
        .list_open_pull_requests(&target.repository)
        .await?
        .into_iter()
        .find(|pr| {
            pr.head.ref_name == target.head_branch && pr.head.repository == target.head_repository
        }))
}

/// Creates or updates the generation pull request of a package, refreshes its
/// installation-instructions comment and labels it as in progress.
///
/// # Arguments
///
/// * `host` - Source control host
/// * `renderer` - Template renderer for the body and comment
/// * `target` - Resolved base and head
/// * `package_name` - Package the pull request is for
/// * `specification` - Specification pull request that triggered generation
/// * `instructions` - Rendered installation instructions, if any artifacts exist
/// * `log` - Package-scoped activity log
///
/// # Errors
///
/// Returns [`PrError`] if rendering or a host call fails.
pub async fn reconcile_generation_pull_request(
    host: &dyn SourceControlHost,
    renderer: &TemplateRenderer,
    target: &PullRequestTarget,
    package_name: &str,
    specification: &SpecificationPullRequest,
    instructions: Option<&str>,
    log: &ActivityLog,
) -> Result<PrStatus, PrError> {
    let span = info_span!(
        "reconcile_generation_pull_request",
        repo = %target.repository,
        head = %target.head_branch
    );

    async {
        let title = generation_pr_title(package_name, &specification.title);
        let body = renderer.render_generation_pr_body(&specification.html_url, instructions)?;

        log.info("Checking if generation pull request exists...");
        let (pull_request, status) = match find_open_pull_request(host, target).await? {
            Some(existing) => {
                log.info(format!(
                    "Generation pull request already exists at {}. Updating it.",
                    existing.html_url
                ));
                let update = PullRequestUpdate {
                    title: Some(title),
                    body: Some(body),
                    base: (existing.base.ref_name != target.base_branch)
                        .then(|| target.base_branch.clone()),
                };
                let updated = host
                    .update_pull_request(&target.repository, existing.number, &update)
                    .await?;
                let status = PrStatus::Updated {
                    number: updated.number,
                    url: updated.html_url.clone(),
                };
                (updated, status)
            }
            None => {
                log.info(format!(
                    "Creating SDK generation pull request in \"{}\" from \"{}\" to \"{}\"...",
                    target.repository, target.head_branch, target.base_branch
                ));
                let maintainer_can_modify = target.maintainer_can_modify();
                log.info(format!("maintainerCanModify: {maintainer_can_modify}"));

                let request = NewPullRequest {
                    title,
                    head: target.head_reference(),
                    base: target.base_branch.clone(),
                    body,
                    maintainer_can_modify,
                };
                let created = host
                    .create_pull_request(&target.repository, &request)
                    .await?;
                log.info(format!(
                    "Created generation pull request at {}.",
                    created.html_url
                ));
                let status = PrStatus::Created {
                    number: created.number,
                    url: created.html_url.clone(),
                };
                (created, status)
            }
        };

        if let Some(instructions) = instructions {
            log.info("Adding installation instructions comment to generation pull request...");
            upsert_instructions_comment(
                host,
                renderer,
                &target.repository,
                pull_request.number,
                instructions,
            )
            .await?;
        }

        apply_labels(
            host,
            &target.repository,
            &pull_request,
            PullRequestRole::Generation,
            SpecPhase::InProgress,
            log,
        )
        .await?;

        Ok(status)
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PullRequestBase;
    use crate::fakes::InMemoryHost;
    use crate::generation::PullRequestBranch;
    use crate::repository::RepositoryName;
    use crate::topology::RepositoryTopology;

    fn specification() -> SpecificationPullRequest {
        let repository = RepositoryName::new("Azure", "azure-rest-api-specs");
        SpecificationPullRequest {
            number: 4994,
            title: "Update MySQL API".to_string(),
            html_url: "https://github.com/Azure/azure-rest-api-specs/pull/4994".to_string(),
            repository: repository.clone(),
            head: PullRequestBranch {
                repository: repository.clone(),
                branch: "mysql".to_string(),
                commit: "d82d1491879729cdf44da9a664e815112acde158".to_string(),
            },
            base: PullRequestBranch {
                repository,
                branch: "master".to_string(),
                commit: "5d204450e3ea6709a034208af441ebaaa87bd805".to_string(),
            },
            merge_commit: None,
            merged: false,
            diff_url: None,
        }
    }

    fn target(integration: &str, generation: &str) -> PullRequestTarget {
        let topology = RepositoryTopology {
            main_repository: "Azure/azure-sdk-for-python".parse().unwrap(),
            integration_repository: integration.parse().unwrap(),
            generation_repository: generation.parse().unwrap(),
            integration_branch_prefix: "sdkAutomation".to_string(),
            main_branch: "master".to_string(),
            pull_request_base: PullRequestBase::Unset,
        };
        PullRequestTarget::resolve(
            &topology,
            "sdkAutomation/azure-mgmt-rdbms",
            "sdkAutomation/azure-mgmt-rdbms@4994",
        )
    }

    #[tokio::test]
    async fn creates_labels_and_comments() {
        let host = InMemoryHost::new();
        let log = ActivityLog::new();
        let target = target("Azure/azure-sdk-for-python", "Azure/azure-sdk-for-python");

        let status = reconcile_generation_pull_request(
            &host,
            &TemplateRenderer::new(),
            &target,
            "azure-mgmt-rdbms",
            &specification(),
            Some("pip install it"),
            &log,
        )
        .await
        .unwrap();

        assert_eq!(status.as_str(), "created");
        let pr = host.pull_request(&target.repository, 1).await.unwrap();
        assert_eq!(pr.title, "[AutoPR azure-mgmt-rdbms] Update MySQL API");
        assert_eq!(pr.head.ref_name, "sdkAutomation/azure-mgmt-rdbms@4994");
        assert_eq!(pr.base.ref_name, "sdkAutomation/azure-mgmt-rdbms");
        assert!(pr
            .body
            .starts_with("Created to sync https://github.com/Azure/azure-rest-api-specs/pull/4994."));
        assert_eq!(pr.labels, vec!["GenerationPR", "SpecPRInProgress"]);
        assert_eq!(host.comments(&target.repository, 1).await.len(), 1);
        assert_eq!(
            log.lines(),
            vec![
                "Checking if generation pull request exists...",
                "Creating SDK generation pull request in \"Azure/azure-sdk-for-python\" from \
                 \"sdkAutomation/azure-mgmt-rdbms@4994\" to \"sdkAutomation/azure-mgmt-rdbms\"...",
                "maintainerCanModify: true",
                "Created generation pull request at \
                 https://github.com/Azure/azure-sdk-for-python/pull/1.",
                "Adding installation instructions comment to generation pull request...",
                "Didn't find label GenerationPR in Azure/azure-sdk-for-python. Creating it...",
                "Didn't find label SpecPRInProgress in Azure/azure-sdk-for-python. Creating it...",
                "Label changes for PR 1 in Azure/azure-sdk-for-python: \
                 +GenerationPR, +SpecPRInProgress",
            ]
        );
    }

    #[tokio::test]
    async fn second_iteration_updates_existing_pull_request() {
        let host = InMemoryHost::new();
        let renderer = TemplateRenderer::new();
        let target = target("Azure/azure-sdk-for-python", "Azure/azure-sdk-for-python");
        let log = ActivityLog::new();

        let specification = specification();
        reconcile_generation_pull_request(
            &host,
            &renderer,
            &target,
            "azure-mgmt-rdbms",
            &specification,
            None,
            &log,
        )
        .await
        .unwrap();
        let status = reconcile_generation_pull_request(
            &host,
            &renderer,
            &target,
            "azure-mgmt-rdbms",
            &specification,
            None,
            &log,
        )
        .await
        .unwrap();

        assert_eq!(status.as_str(), "updated");
        assert_eq!(host.pull_requests(&target.repository).await.len(), 1);
        assert!(host.comments(&target.repository, 1).await.is_empty());
    }

    #[tokio::test]
    async fn cross_repository_head_disables_maintainer_edits() {
        let host = InMemoryHost::new();
        let log = ActivityLog::new();
        let target = target("integration/azure-sdk-for-python", "generation/azure-sdk-for-python");

        reconcile_generation_pull_request(
            &host,
            &TemplateRenderer::new(),
            &target,
            "azure-mgmt-rdbms",
            &specification(),
            None,
            &log,
        )
        .await
        .unwrap();

        assert!(log.contains("maintainerCanModify: false"));
        assert!(host.calls().await.contains(
            &"create_pull_request integration/azure-sdk-for-python \
              generation:sdkAutomation/azure-mgmt-rdbms@4994 -> sdkAutomation/azure-mgmt-rdbms"
                .to_string()
        ));
        let pr = host.pull_request(&target.repository, 1).await.unwrap();
        assert_eq!(pr.head.repository.full_name(), "generation/azure-sdk-for-python");
    }
}
