//! GitHub implementation of [`SourceControlHost`] over octocrab.

use super::{
    ensure_core_rate_limit, HostError, IssueComment, NewPullRequest, PullRequest,
    PullRequestRef, PullRequestState, PullRequestUpdate, SourceControlHost,
};
use crate::repository::RepositoryName;
use async_trait::async_trait;
use octocrab::models::{pulls, CommentId, IssueState};
use octocrab::params;
use octocrab::Octocrab;
use tracing::debug;

/// Page size used for list calls.
const PER_PAGE: u8 = 100;

/// Source control host backed by the GitHub REST API.
#[derive(Clone)]
pub struct GitHubHost {
    octocrab: Octocrab,
}

impl GitHubHost {
    /// Wraps an authenticated octocrab client.
    pub fn new(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    /// Builds a client authenticated with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::GitHubError`] if the client cannot be built.
    pub fn from_token(token: &str) -> Result<Self, HostError> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()?;
        Ok(Self::new(octocrab))
    }

    async fn ready(&self) -> Result<(), HostError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        Ok(())
    }
}

fn side(
    label: Option<&String>,
    ref_field: &str,
    repo: Option<&octocrab::models::Repository>,
    fallback: &RepositoryName,
) -> PullRequestRef {
    let repository = repo
        .and_then(|r| r.full_name.as_deref())
        .and_then(|full| full.parse::<RepositoryName>().ok())
        .unwrap_or_else(|| fallback.clone());
    let mut reference = PullRequestRef::new(repository, ref_field);
    if let Some(label) = label {
        reference.label = label.clone();
    }
    reference
}

fn convert(pr: &pulls::PullRequest, repository: &RepositoryName) -> PullRequest {
    let html_url = pr
        .html_url
        .as_ref()
        .map(|u| u.to_string())
        .unwrap_or_else(|| format!("{}/pull/{}", repository.url(), pr.number));
    let state = match pr.state {
        Some(IssueState::Closed) => PullRequestState::Closed,
        _ => PullRequestState::Open,
    };

    PullRequest {
        number: pr.number,
        html_url,
        title: pr.title.clone().unwrap_or_default(),
        body: pr.body.clone().unwrap_or_default(),
        state,
        merged: pr.merged_at.is_some() || pr.merged.unwrap_or(false),
        head: side(
            pr.head.label.as_ref(),
            &pr.head.ref_field,
            pr.head.repo.as_ref(),
            repository,
        ),
        base: side(
            pr.base.label.as_ref(),
            &pr.base.ref_field,
            pr.base.repo.as_ref(),
            repository,
        ),
        labels: pr
            .labels
            .as_ref()
            .map(|labels| labels.iter().map(|l| l.name.clone()).collect())
            .unwrap_or_default(),
    }
}

#[async_trait]
impl SourceControlHost for GitHubHost {
    async fn list_open_pull_requests(
        &self,
        repository: &RepositoryName,
    ) -> Result<Vec<PullRequest>, HostError> {
        self.ready().await?;
        let page = self
            .octocrab
            .pulls(&repository.owner, &repository.name)
            .list()
            .state(params::State::Open)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let all = self.octocrab.all_pages(page).await?;
        debug!(repo = %repository, count = all.len(), "Listed open pull requests");

        Ok(all.iter().map(|pr| convert(pr, repository)).collect())
    }

    async fn create_pull_request(
        &self,
        repository: &RepositoryName,
        request: &NewPullRequest,
    ) -> Result<PullRequest, HostError> {
        self.ready().await?;
        let pr = self
            .octocrab
            .pulls(&repository.owner, &repository.name)
            .create(&request.title, &request.head, &request.base)
            .body(&request.body)
            .maintainer_can_modify(request.maintainer_can_modify)
            .send()
            .await?;

        Ok(convert(&pr, repository))
    }

    async fn update_pull_request(
        &self,
        repository: &RepositoryName,
        number: u64,
        update: &PullRequestUpdate,
    ) -> Result<PullRequest, HostError> {
        self.ready().await?;
        let handler = self.octocrab.pulls(&repository.owner, &repository.name);
        let mut builder = handler.update(number);
        if let Some(title) = &update.title {
            builder = builder.title(title);
        }
        if let Some(body) = &update.body {
            builder = builder.body(body);
        }
        if let Some(base) = &update.base {
            builder = builder.base(base);
        }
        let pr = builder.send().await?;

        Ok(convert(&pr, repository))
    }

    async fn merge_pull_request(
        &self,
        repository: &RepositoryName,
        number: u64,
    ) -> Result<(), HostError> {
        self.ready().await?;
        let merge = self
            .octocrab
            .pulls(&repository.owner, &repository.name)
            .merge(number)
            .send()
            .await?;
        if merge.merged {
            Ok(())
        } else {
            Err(HostError::Rejected {
                operation: format!("Merging {repository}#{number}"),
                message: merge.message.unwrap_or_default(),
            })
        }
    }

    async fn close_pull_request(
        &self,
        repository: &RepositoryName,
        number: u64,
    ) -> Result<(), HostError> {
        self.ready().await?;
        self.octocrab
            .pulls(&repository.owner, &repository.name)
            .update(number)
            .state(params::pulls::State::Closed)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_branch(
        &self,
        repository: &RepositoryName,
        branch: &str,
    ) -> Result<(), HostError> {
        self.ready().await?;
        self.octocrab
            .repos(&repository.owner, &repository.name)
            .delete_ref(&params::repos::Reference::Branch(branch.to_string()))
            .await?;
        Ok(())
    }

    async fn list_labels(&self, repository: &RepositoryName) -> Result<Vec<String>, HostError> {
        self.ready().await?;
        let page = self
            .octocrab
            .issues(&repository.owner, &repository.name)
            .list_labels_for_repo()
            .per_page(PER_PAGE)
            .send()
            .await?;
        let all = self.octocrab.all_pages(page).await?;

        Ok(all.into_iter().map(|label| label.name).collect())
    }

    async fn create_label(
        &self,
        repository: &RepositoryName,
        name: &str,
        color: &str,
    ) -> Result<(), HostError> {
        self.ready().await?;
        self.octocrab
            .issues(&repository.owner, &repository.name)
            .create_label(name, color, "")
            .await?;
        Ok(())
    }

    async fn add_labels(
        &self,
        repository: &RepositoryName,
        number: u64,
        labels: &[String],
    ) -> Result<(), HostError> {
        self.ready().await?;
        self.octocrab
            .issues(&repository.owner, &repository.name)
            .add_labels(number, labels)
            .await?;
        Ok(())
    }

    async fn remove_label(
        &self,
        repository: &RepositoryName,
        number: u64,
        label: &str,
    ) -> Result<(), HostError> {
        self.ready().await?;
        self.octocrab
            .issues(&repository.owner, &repository.name)
            .remove_label(number, label)
            .await?;
        Ok(())
    }

    async fn list_comments(
        &self,
        repository: &RepositoryName,
        number: u64,
    ) -> Result<Vec<IssueComment>, HostError> {
        self.ready().await?;
        let page = self
            .octocrab
            .issues(&repository.owner, &repository.name)
            .list_comments(number)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let all = self.octocrab.all_pages(page).await?;

        Ok(all
            .into_iter()
            .map(|comment| IssueComment {
                id: comment.id.into_inner(),
                body: comment.body.unwrap_or_default(),
            })
            .collect())
    }

    async fn create_comment(
        &self,
        repository: &RepositoryName,
        number: u64,
        body: &str,
    ) -> Result<IssueComment, HostError> {
        self.ready().await?;
        let comment = self
            .octocrab
            .issues(&repository.owner, &repository.name)
            .create_comment(number, body)
            .await?;

        Ok(IssueComment {
            id: comment.id.into_inner(),
            body: comment.body.unwrap_or_default(),
        })
    }

    async fn update_comment(
        &self,
        repository: &RepositoryName,
        comment_id: u64,
        body: &str,
    ) -> Result<(), HostError> {
        self.ready().await?;
        self.octocrab
            .issues(&repository.owner, &repository.name)
            .update_comment(CommentId(comment_id), body)
            .await?;
        Ok(())
    }
}
