//! Specification pull requests and the events that drive them.

use crate::labels::SpecPhase;
use crate::repository::RepositoryName;
use serde::{Deserialize, Serialize};

/// One side (head or base) of a specification pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestBranch {
    pub repository: RepositoryName,
    pub branch: String,
    pub commit: String,
}

/// A pull request in the specification repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationPullRequest {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub repository: RepositoryName,
    pub head: PullRequestBranch,
    pub base: PullRequestBranch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_commit: Option<String>,
    #[serde(default)]
    pub merged: bool,
    /// Where the pull request's diff can be downloaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_url: Option<String>,
}

impl SpecificationPullRequest {
    /// Commit the generated code is attributed to: the merge commit once
    /// merged, the head commit otherwise.
    #[must_use]
    pub fn source_commit(&self) -> &str {
        self.merge_commit
            .as_deref()
            .filter(|_| self.merged)
            .unwrap_or(&self.head.commit)
    }
}

/// Persisted `data.json` of a specification pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificationPullRequestRecord {
    pub pull_request: SpecificationPullRequest,
    /// Most recent iteration started for the pull request.
    pub current_iteration: u32,
}

/// Webhook action on a specification pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Opened,
    Synchronize,
    Reopened,
    Closed,
}

/// A readme to generate for an SDK repository, as found by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationTarget {
    pub readme_url: String,
    /// Requested SDK repository name, looked up in `sdkRepositoryMappings`.
    pub sdk_repository: String,
    /// Scripts run after generating this readme only.
    #[serde(default)]
    pub after_scripts: Vec<String>,
}

/// An event on a specification pull request together with its targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationPullRequestEvent {
    pub action: EventAction,
    pub pull_request: SpecificationPullRequest,
    #[serde(default)]
    pub targets: Vec<GenerationTarget>,
}

impl SpecificationPullRequestEvent {
    /// Lifecycle phase the event moves the specification pull request into.
    #[must_use]
    pub fn phase(&self) -> SpecPhase {
        match self.action {
            EventAction::Opened | EventAction::Synchronize | EventAction::Reopened => {
                SpecPhase::InProgress
            }
            EventAction::Closed if self.pull_request.merged => SpecPhase::Merged,
            EventAction::Closed => SpecPhase::Closed,
        }
    }

    /// Returns true when the event requires a new generation iteration.
    #[must_use]
    pub fn triggers_generation(&self) -> bool {
        self.phase() == SpecPhase::InProgress
    }
}
