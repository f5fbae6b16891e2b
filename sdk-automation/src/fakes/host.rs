//! In-memory source control host.

use crate::host::{
    HostError, IssueComment, NewPullRequest, PullRequest, PullRequestRef, PullRequestState,
    PullRequestUpdate, SourceControlHost,
};
use crate::repository::RepositoryName;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    pull_requests: BTreeMap<String, Vec<PullRequest>>,
    labels: BTreeMap<String, BTreeSet<String>>,
    comments: BTreeMap<(String, u64), Vec<IssueComment>>,
    next_comment_id: u64,
    calls: Vec<String>,
}

impl State {
    fn pull_request_mut(
        &mut self,
        repository: &RepositoryName,
        number: u64,
    ) -> Result<&mut PullRequest, HostError> {
        self.pull_requests
            .get_mut(&repository.full_name())
            .and_then(|prs| prs.iter_mut().find(|pr| pr.number == number))
            .ok_or_else(|| HostError::NotFound {
                what: format!("{repository}#{number}"),
            })
    }

    fn insert(
        &mut self,
        repository: &RepositoryName,
        request: &NewPullRequest,
        labels: &[&str],
    ) -> PullRequest {
        let prs = self
            .pull_requests
            .entry(repository.full_name())
            .or_default();
        let number = prs.len() as u64 + 1;

        let head = match request.head.split_once(':') {
            Some((owner, branch)) => {
                PullRequestRef::new(RepositoryName::new(owner, repository.name.clone()), branch)
            }
            None => PullRequestRef::new(repository.clone(), request.head.clone()),
        };
        let pr = PullRequest {
            number,
            html_url: format!("{}/pull/{number}", repository.url()),
            title: request.title.clone(),
            body: request.body.clone(),
            state: PullRequestState::Open,
            merged: false,
            head,
            base: PullRequestRef::new(repository.clone(), request.base.clone()),
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
        };
        prs.push(pr.clone());
        pr
    }
}

/// Source control host keeping pull requests, labels and comments in memory.
///
/// Operations named with [`with_failure`](Self::with_failure) (for example
/// `"merge_pull_request"`) return [`HostError::Rejected`].
#[derive(Default)]
pub struct InMemoryHost {
    state: RwLock<State>,
    failures: HashSet<String>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines labels in a repository.
    #[must_use]
    pub fn with_labels(mut self, repository: &RepositoryName, labels: &[&str]) -> Self {
        self.state
            .get_mut()
            .labels
            .entry(repository.full_name())
            .or_default()
            .extend(labels.iter().map(|l| (*l).to_string()));
        self
    }

    /// Adds an open pull request carrying `labels`.
    #[must_use]
    pub fn with_pull_request(
        mut self,
        repository: &RepositoryName,
        request: &NewPullRequest,
        labels: &[&str],
    ) -> Self {
        self.state.get_mut().insert(repository, request, labels);
        self
    }

    /// Makes an operation fail.
    #[must_use]
    pub fn with_failure(mut self, operation: &str) -> Self {
        self.failures.insert(operation.to_string());
        self
    }

    /// Every pull request of a repository, open or closed.
    pub async fn pull_requests(&self, repository: &RepositoryName) -> Vec<PullRequest> {
        self.state
            .read()
            .await
            .pull_requests
            .get(&repository.full_name())
            .cloned()
            .unwrap_or_default()
    }

    /// One pull request by number.
    pub async fn pull_request(
        &self,
        repository: &RepositoryName,
        number: u64,
    ) -> Option<PullRequest> {
        self.pull_requests(repository)
            .await
            .into_iter()
            .find(|pr| pr.number == number)
    }

    /// Comments on a pull request.
    pub async fn comments(&self, repository: &RepositoryName, number: u64) -> Vec<IssueComment> {
        self.state
            .read()
            .await
            .comments
            .get(&(repository.full_name(), number))
            .cloned()
            .unwrap_or_default()
    }

    /// Mutating calls made so far, e.g. `close_pull_request Azure/repo#1`.
    pub async fn calls(&self) -> Vec<String> {
        self.state.read().await.calls.clone()
    }

    fn check(&self, operation: &str) -> Result<(), HostError> {
        if self.failures.contains(operation) {
            return Err(HostError::Rejected {
                operation: operation.to_string(),
                message: "configured to fail".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SourceControlHost for InMemoryHost {
    async fn list_open_pull_requests(
        &self,
        repository: &RepositoryName,
    ) -> Result<Vec<PullRequest>, HostError> {
        self.check("list_open_pull_requests")?;
        Ok(self
            .pull_requests(repository)
            .await
            .into_iter()
            .filter(PullRequest::is_open)
            .collect())
    }

    async fn create_pull_request(
        &self,
        repository: &RepositoryName,
        request: &NewPullRequest,
    ) -> Result<PullRequest, HostError> {
        self.check("create_pull_request")?;
        let mut state = self.state.write().await;
        state.calls.push(format!(
            "create_pull_request {repository} {} -> {}",
            request.head, request.base
        ));
        Ok(state.insert(repository, request, &[]))
    }

    async fn update_pull_request(
        &self,
        repository: &RepositoryName,
        number: u64,
        update: &PullRequestUpdate,
    ) -> Result<PullRequest, HostError> {
        self.check("update_pull_request")?;
        let mut state = self.state.write().await;
        state
            .calls
            .push(format!("update_pull_request {repository}#{number}"));
        let pr = state.pull_request_mut(repository, number)?;
        if let Some(title) = &update.title {
            pr.title = title.clone();
        }
        if let Some(body) = &update.body {
            pr.body = body.clone();
        }
        if let Some(base) = &update.base {
            pr.base = PullRequestRef::new(pr.base.repository.clone(), base.clone());
        }
        Ok(pr.clone())
    }

    async fn merge_pull_request(
        &self,
        repository: &RepositoryName,
        number: u64,
    ) -> Result<(), HostError> {
        self.check("merge_pull_request")?;
        let mut state = self.state.write().await;
        state
            .calls
            .push(format!("merge_pull_request {repository}#{number}"));
        let pr = state.pull_request_mut(repository, number)?;
        pr.state = PullRequestState::Closed;
        pr.merged = true;
        Ok(())
    }

    async fn close_pull_request(
        &self,
        repository: &RepositoryName,
        number: u64,
    ) -> Result<(), HostError> {
        self.check("close_pull_request")?;
        let mut state = self.state.write().await;
        state
            .calls
            .push(format!("close_pull_request {repository}#{number}"));
        state.pull_request_mut(repository, number)?.state = PullRequestState::Closed;
        Ok(())
    }

    async fn delete_branch(
        &self,
        repository: &RepositoryName,
        branch: &str,
    ) -> Result<(), HostError> {
        self.check("delete_branch")?;
        self.state
            .write()
            .await
            .calls
            .push(format!("delete_branch {repository} {branch}"));
        Ok(())
    }

    async fn list_labels(&self, repository: &RepositoryName) -> Result<Vec<String>, HostError> {
        self.check("list_labels")?;
        Ok(self
            .state
            .read()
            .await
            .labels
            .get(&repository.full_name())
            .map(|labels| labels.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn create_label(
        &self,
        repository: &RepositoryName,
        name: &str,
        _color: &str,
    ) -> Result<(), HostError> {
        self.check("create_label")?;
        let mut state = self.state.write().await;
        state.calls.push(format!("create_label {repository} {name}"));
        state
            .labels
            .entry(repository.full_name())
            .or_default()
            .insert(name.to_string());
        Ok(())
    }

    async fn add_labels(
        &self,
        repository: &RepositoryName,
        number: u64,
        labels: &[String],
    ) -> Result<(), HostError> {
        self.check("add_labels")?;
        let mut state = self.state.write().await;
        state.calls.push(format!(
            "add_labels {repository}#{number} {}",
            labels.join(",")
        ));
        let pr = state.pull_request_mut(repository, number)?;
        for label in labels {
            if !pr.labels.contains(label) {
                pr.labels.push(label.clone());
            }
        }
        Ok(())
    }

    async fn remove_label(
        &self,
        repository: &RepositoryName,
        number: u64,
        label: &str,
    ) -> Result<(), HostError> {
        self.check("remove_label")?;
        let mut state = self.state.write().await;
        state
            .calls
            .push(format!("remove_label {repository}#{number} {label}"));
        state
            .pull_request_mut(repository, number)?
            .labels
            .retain(|l| l != label);
        Ok(())
    }

    async fn list_comments(
        &self,
        repository: &RepositoryName,
        number: u64,
    ) -> Result<Vec<IssueComment>, HostError> {
        self.check("list_comments")?;
        Ok(self.comments(repository, number).await)
    }

    async fn create_comment(
        &self,
        repository: &RepositoryName,
        number: u64,
        body: &str,
    ) -> Result<IssueComment, HostError> {
        self.check("create_comment")?;
        let mut state = self.state.write().await;
        state.next_comment_id += 1;
        let comment = IssueComment {
            id: state.next_comment_id,
            body: body.to_string(),
        };
        state
            .calls
            .push(format!("create_comment {repository}#{number}"));
        state
            .comments
            .entry((repository.full_name(), number))
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        repository: &RepositoryName,
        comment_id: u64,
        body: &str,
    ) -> Result<(), HostError> {
        self.check("update_comment")?;
        let mut state = self.state.write().await;
        state
            .calls
            .push(format!("update_comment {repository} {comment_id}"));
        let comment = state
            .comments
            .iter_mut()
            .filter(|((repo, _), _)| *repo == repository.full_name())
            .flat_map(|(_, comments)| comments.iter_mut())
            .find(|c| c.id == comment_id)
            .ok_or_else(|| HostError::NotFound {
                what: format!("comment {comment_id} in {repository}"),
            })?;
        comment.body = body.to_string();
        Ok(())
    }
}
