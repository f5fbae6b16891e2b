//! Integration pull requests for merged generation pull requests.

use crate::activity_log::ActivityLog;
use crate::generation::SpecificationPullRequest;
use crate::host::{NewPullRequest, PullRequest, SourceControlHost};
use crate::labels::{apply_labels, PullRequestRole, SpecPhase};
use crate::pull_requests::{append_integration_link, PrError, PrStatus};
use crate::templates::{integration_pr_body, integration_pr_title, TemplateRenderer};
use crate::topology::RepositoryTopology;

/// Makes sure the integration branch a generation pull request merged into
/// has an open pull request into the main branch.
///
/// Returns the created pull request, or `None` when the generation pull
/// request already targeted the main branch or an integration pull request
/// is open.
pub(super) async fn ensure_integration_pull_request(
    host: &dyn SourceControlHost,
    renderer: &TemplateRenderer,
    topology: &RepositoryTopology,
    specification: &SpecificationPullRequest,
    generation_pull_request: &PullRequest,
    log: &ActivityLog,
) -> Result<Option<PrStatus>, PrError> {
    let base = &generation_pull_request.base;
    if base.repository == topology.main_repository && base.ref_name == topology.main_branch {
        return Ok(None);
    }

    let main = &topology.main_repository;
    let existing = host
        .list_open_pull_requests(main)
        .await?
        .into_iter()
        .find(|pr| pr.head.label == base.label);
    if let Some(existing) = existing {
        log.info(format!(
            "Integration pull request already exists at {}.",
            existing.html_url
        ));
        return Ok(None);
    }

    log.info(format!(
        "Creating SDK integration pull request in \"{main}\" from \"{}\" to \"{}\"...",
        base.label, topology.main_branch
    ));
    let same_repository = &base.repository == main;
    let request = NewPullRequest {
        title: integration_pr_title(&specification.title),
        head: if same_repository {
            base.ref_name.clone()
        } else {
            base.label.clone()
        },
        base: topology.main_branch.clone(),
        body: integration_pr_body(&generation_pull_request.html_url),
        maintainer_can_modify: same_repository,
    };
    let created = host.create_pull_request(main, &request).await?;
    log.info(format!(
        "Created integration pull request at {}.",
        created.html_url
    ));

    apply_labels(
        host,
        main,
        &created,
        PullRequestRole::Integration,
        SpecPhase::Merged,
        log,
    )
    .await?;

    append_integration_link(
        host,
        renderer,
        &generation_pull_request.base.repository,
        generation_pull_request.number,
        &created.html_url,
    )
    .await?;

    Ok(Some(PrStatus::Created {
        number: created.number,
        url: created.html_url,
    }))
}
