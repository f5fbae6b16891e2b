//! Applies label deltas through a [`SourceControlHost`].

use super::{compute_label_delta, LabelDelta, PullRequestRole, SpecPhase};
use crate::activity_log::ActivityLog;
use crate::host::{HostError, PullRequest, SourceControlHost};
use crate::repository::RepositoryName;

/// Brings the labels of `pull_request` in line with `role` and `phase`.
///
/// Label definitions missing from the repository are created first. The
/// applied delta is logged as `Label changes for PR {n} in {repo}: +X, -Y`.
///
/// # Errors
///
/// Returns [`HostError`] if any host call fails.
pub async fn apply_labels(
    host: &dyn SourceControlHost,
    repository: &RepositoryName,
    pull_request: &PullRequest,
    role: PullRequestRole,
    phase: SpecPhase,
    log: &ActivityLog,
) -> Result<LabelDelta, HostError> {
    let delta = compute_label_delta(&pull_request.labels, role, phase);
    if delta.is_empty() {
        return Ok(delta);
    }

    if !delta.add.is_empty() {
        let defined = host.list_labels(repository).await?;
        for label in &delta.add {
            if !defined.iter().any(|name| name == label.as_str()) {
                log.info(format!(
                    "Didn't find label {label} in {repository}. Creating it..."
                ));
                host.create_label(repository, label.as_str(), label.color())
                    .await?;
            }
        }

        let names: Vec<String> = delta.add.iter().map(|l| l.as_str().to_string()).collect();
        host.add_labels(repository, pull_request.number, &names)
            .await?;
    }

    for label in &delta.remove {
        host.remove_label(repository, pull_request.number, label.as_str())
            .await?;
    }

    log.info(format!(
        "Label changes for PR {} in {repository}: {delta}",
        pull_request.number
    ));
    Ok(delta)
}
