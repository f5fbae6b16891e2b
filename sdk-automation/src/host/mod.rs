//! Source control host access (pull requests, labels, comments, branches).

mod error;
mod github;
mod rate_limit;

pub use error::HostError;
pub use github::GitHubHost;
pub use rate_limit::{core_budget, ensure_core_rate_limit, CoreBudget};

use crate::repository::RepositoryName;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One side (head or base) of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// `owner:branch`
    pub label: String,
    /// Branch name.
    pub ref_name: String,
    /// Repository the branch lives in.
    pub repository: RepositoryName,
}

impl PullRequestRef {
    /// Builds a reference to `branch` in `repository`.
    #[must_use]
    pub fn new(repository: RepositoryName, branch: impl Into<String>) -> Self {
        let ref_name = branch.into();
        Self {
            label: repository.head_label(&ref_name),
            ref_name,
            repository,
        }
    }
}

/// Pull request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestState {
    Open,
    Closed,
}

/// A pull request as seen on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
    pub title: String,
    pub body: String,
    pub state: PullRequestState,
    pub merged: bool,
    pub head: PullRequestRef,
    pub base: PullRequestRef,
    pub labels: Vec<String>,
}

impl PullRequest {
    /// Returns true for open pull requests.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == PullRequestState::Open
    }
}

/// Parameters of a new pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    /// Head branch, `owner:branch` for cross-repository pull requests.
    pub head: String,
    /// Base branch in the target repository.
    pub base: String,
    pub body: String,
    pub maintainer_can_modify: bool,
}

/// Changes to an existing pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub base: Option<String>,
}

/// A comment on a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueComment {
    pub id: u64,
    pub body: String,
}

/// Operations the engine needs from the source control host.
#[async_trait]
pub trait SourceControlHost: Send + Sync {
    /// Lists open pull requests of a repository.
    async fn list_open_pull_requests(
        &self,
        repository: &RepositoryName,
    ) -> Result<Vec<PullRequest>, HostError>;

    /// Creates a pull request.
    async fn create_pull_request(
        &self,
        repository: &RepositoryName,
        request: &NewPullRequest,
    ) -> Result<PullRequest, HostError>;

    /// Updates title, body or base of a pull request.
    async fn update_pull_request(
        &self,
        repository: &RepositoryName,
        number: u64,
        update: &PullRequestUpdate,
    ) -> Result<PullRequest, HostError>;

    /// Merges a pull request.
    async fn merge_pull_request(&self, repository: &RepositoryName, number: u64)
        -> Result<(), HostError>;

    /// Closes a pull request without merging.
    async fn close_pull_request(&self, repository: &RepositoryName, number: u64)
        -> Result<(), HostError>;

    /// Deletes a branch.
    async fn delete_branch(&self, repository: &RepositoryName, branch: &str)
        -> Result<(), HostError>;

    /// Lists label names defined in a repository.
    async fn list_labels(&self, repository: &RepositoryName) -> Result<Vec<String>, HostError>;

    /// Defines a label in a repository.
    async fn create_label(
        &self,
        repository: &RepositoryName,
        name: &str,
        color: &str,
    ) -> Result<(), HostError>;

    /// Adds labels to a pull request.
    async fn add_labels(
        &self,
        repository: &RepositoryName,
        number: u64,
        labels: &[String],
    ) -> Result<(), HostError>;

    /// Removes a label from a pull request.
    async fn remove_label(
        &self,
        repository: &RepositoryName,
        number: u64,
        label: &str,
    ) -> Result<(), HostError>;

    /// Lists comments on a pull request.
    async fn list_comments(
        &self,
        repository: &RepositoryName,
        number: u64,
    ) -> Result<Vec<IssueComment>, HostError>;

    /// Creates a comment on a pull request.
    async fn create_comment(
        &self,
        repository: &RepositoryName,
        number: u64,
        body: &str,
    ) -> Result<IssueComment, HostError>;

    /// Replaces the body of a comment.
    async fn update_comment(
        &self,
        repository: &RepositoryName,
        comment_id: u64,
        body: &str,
    ) -> Result<(), HostError>;
}
