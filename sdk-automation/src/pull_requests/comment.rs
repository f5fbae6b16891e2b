//! The engine's marked comment on generation pull requests.

use super::PrError;
use crate::host::{IssueComment, SourceControlHost};
use crate::repository::RepositoryName;
use crate::templates::{TemplateRenderer, INSTRUCTIONS_COMMENT_MARKER};

async fn find_marked_comment(
    host: &dyn SourceControlHost,
    repository: &RepositoryName,
    number: u64,
) -> Result<Option<IssueComment>, PrError> {
    Ok(host
        .list_comments(repository, number)
        .await?
        .into_iter()
        .find(|c| c.body.contains(INSTRUCTIONS_COMMENT_MARKER)))
}

/// Creates or refreshes the installation-instructions comment.
///
/// # Errors
///
/// Returns [`PrError`] if rendering or a host call fails.
pub async fn upsert_instructions_comment(
    host: &dyn SourceControlHost,
    renderer: &TemplateRenderer,
    repository: &RepositoryName,
    number: u64,
    instructions: &str,
) -> Result<(), PrError> {
    let body = renderer.render_instructions_comment(instructions, &[])?;
    match find_marked_comment(host, repository, number).await? {
        Some(existing) => host.update_comment(repository, existing.id, &body).await?,
        None => {
            host.create_comment(repository, number, &body).await?;
        }
    }
    Ok(())
}

/// Appends an integration pull request link to the engine's comment,
/// creating the comment when it does not exist yet.
///
/// # Errors
///
/// Returns [`PrError`] if rendering or a host call fails.
pub async fn append_integration_link(
    host: &dyn SourceControlHost,
    renderer: &TemplateRenderer,
    repository: &RepositoryName,
    number: u64,
    link: &str,
) -> Result<(), PrError> {
    match find_marked_comment(host, repository, number).await? {
        Some(existing) => {
            if existing.body.contains(link) {
                return Ok(());
            }
            let body = format!(
                "{}\n\nIntegration pull request: {link}",
                existing.body.trim_end()
            );
            host.update_comment(repository, existing.id, &body).await?;
        }
        None => {
            let body = renderer.render_instructions_comment("", &[link.to_string()])?;
            host.create_comment(repository, number, &body).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::InMemoryHost;
    use crate::host::NewPullRequest;

    fn repo() -> RepositoryName {
        RepositoryName::new("Azure", "azure-sdk-for-js")
    }

    fn host() -> InMemoryHost {
        InMemoryHost::new().with_pull_request(
            &repo(),
            &NewPullRequest {
                title: "[AutoPR @azure/arm-mysql] Update".to_string(),
                head: "sdkAutomation/@azure_arm-mysql@12".to_string(),
                base: "sdkAutomation/@azure_arm-mysql".to_string(),
                body: String::new(),
                maintainer_can_modify: true,
            },
            &["GenerationPR"],
        )
    }

    #[tokio::test]
    async fn refreshes_comment_in_place() {
        let host = host();
        let renderer = TemplateRenderer::new();

        upsert_instructions_comment(&host, &renderer, &repo(), 1, "first").await.unwrap();
        upsert_instructions_comment(&host, &renderer, &repo(), 1, "second").await.unwrap();

        let comments = host.comments(&repo(), 1).await;
        assert_eq!(comments.len(), 1);
        assert!(comments[0].body.contains("second"));
        assert!(!comments[0].body.contains("first"));
    }

    #[tokio::test]
    async fn appends_integration_link_once() {
        let host = host();
        let renderer = TemplateRenderer::new();
        upsert_instructions_comment(&host, &renderer, &repo(), 1, "install it").await.unwrap();

        let link = "https://github.com/Azure/azure-sdk-for-js/pull/2";
        append_integration_link(&host, &renderer, &repo(), 1, link).await.unwrap();
        append_integration_link(&host, &renderer, &repo(), 1, link).await.unwrap();

        let body = &host.comments(&repo(), 1).await[0].body;
        assert!(body.starts_with(INSTRUCTIONS_COMMENT_MARKER));
        assert!(
            body.ends_with("Integration pull request: https://github.com/Azure/azure-sdk-for-js/pull/2")
        );
        assert_eq!(body.matches(link).count(), 1);
    }
}
