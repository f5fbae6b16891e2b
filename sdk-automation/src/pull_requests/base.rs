//! Pull request base selection.

use crate::config::PullRequestBase;
use crate::repository::RepositoryName;
use crate::topology::RepositoryTopology;

/// Where a generation pull request is opened and from which head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestTarget {
    /// Repository the pull request is opened in.
    pub repository: RepositoryName,
    /// Base branch in `repository`.
    pub base_branch: String,
    /// Repository holding the head branch.
    pub head_repository: RepositoryName,
    /// Head branch.
    pub head_branch: String,
}

impl PullRequestTarget {
    /// Resolves the target of a package's generation pull request.
    ///
    /// | policy                         | repository  | base                |
    /// |--------------------------------|-------------|---------------------|
    /// | unset / `integration_branch`   | integration | integration branch  |
    /// | `main_branch`                  | main        | main branch         |
    ///
    /// The head is always the generation branch in the generation repository.
    #[must_use]
    pub fn resolve(
        topology: &RepositoryTopology,
        integration_branch: &str,
        generation_branch: &str,
    ) -> Self {
        let base_branch = match topology.pull_request_base {
            PullRequestBase::Unset | PullRequestBase::IntegrationBranch => {
                integration_branch.to_string()
            }
            PullRequestBase::MainBranch => topology.main_branch.clone(),
        };

        Self {
            repository: Self::repository_for(topology).clone(),
            base_branch,
            head_repository: topology.generation_repository.clone(),
            head_branch: generation_branch.to_string(),
        }
    }

    /// Repository that generation pull requests of `topology` are opened in.
    #[must_use]
    pub fn repository_for(topology: &RepositoryTopology) -> &RepositoryName {
        match topology.pull_request_base {
            PullRequestBase::Unset | PullRequestBase::IntegrationBranch => {
                &topology.integration_repository
            }
            PullRequestBase::MainBranch => &topology.main_repository,
        }
    }

    /// Returns true when head and base live in different repositories.
    #[must_use]
    pub fn is_cross_repository(&self) -> bool {
        self.repository != self.head_repository
    }

    /// Head reference: `owner:branch` across repositories, the bare branch otherwise.
    #[must_use]
    pub fn head_reference(&self) -> String {
        if self.is_cross_repository() {
            self.head_repository.head_label(&self.head_branch)
        } else {
            self.head_branch.clone()
        }
    }

    /// Maintainers may only push to the head branch of same-repository pull requests.
    #[must_use]
    pub fn maintainer_can_modify(&self) -> bool {
        !self.is_cross_repository()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology(
        main: &str,
        integration: &str,
        generation: &str,
        policy: PullRequestBase,
    ) -> RepositoryTopology {
        RepositoryTopology {
            main_repository: main.parse().unwrap(),
            integration_repository: integration.parse().unwrap(),
            generation_repository: generation.parse().unwrap(),
            integration_branch_prefix: "sdkAutomation".to_string(),
            main_branch: "master".to_string(),
            pull_request_base: policy,
        }
    }

    const INTEGRATION: &str = "sdkAutomation/azure-mgmt-rdbms";
    const GENERATION: &str = "sdkAutomation/azure-mgmt-rdbms@4994";

    #[test]
    fn single_repository_targets_integration_branch() {
        for policy in [PullRequestBase::Unset, PullRequestBase::IntegrationBranch] {
            let t = topology(
                "Azure/azure-sdk-for-python",
                "Azure/azure-sdk-for-python",
                "Azure/azure-sdk-for-python",
                policy,
            );
            let target = PullRequestTarget::resolve(&t, INTEGRATION, GENERATION);

            assert_eq!(target.repository.full_name(), "Azure/azure-sdk-for-python");
            assert_eq!(target.base_branch, INTEGRATION);
            assert_eq!(target.head_reference(), GENERATION);
            assert!(target.maintainer_can_modify());
        }
    }

    #[test]
    fn distinct_generation_repository_uses_owner_qualified_head() {
        let t = topology(
            "Azure/azure-sdk-for-python",
            "integration/azure-sdk-for-python",
            "generation/azure-sdk-for-python",
            PullRequestBase::Unset,
        );
        let target = PullRequestTarget::resolve(&t, INTEGRATION, GENERATION);

        assert_eq!(target.repository.full_name(), "integration/azure-sdk-for-python");
        assert_eq!(target.base_branch, INTEGRATION);
        assert_eq!(
            target.head_reference(),
            "generation:sdkAutomation/azure-mgmt-rdbms@4994"
        );
        assert!(!target.maintainer_can_modify());
    }

    #[test]
    fn main_branch_policy_targets_main_repository() {
        let t = topology(
            "Azure/azure-sdk-for-python",
            "integration/azure-sdk-for-python",
            "generation/azure-sdk-for-python",
            PullRequestBase::MainBranch,
        );
        let target = PullRequestTarget::resolve(&t, INTEGRATION, GENERATION);

        assert_eq!(target.repository.full_name(), "Azure/azure-sdk-for-python");
        assert_eq!(target.base_branch, "master");
        assert!(target.is_cross_repository());
    }

    #[test]
    fn main_branch_policy_in_one_repository() {
        let t = topology(
            "Azure/azure-sdk-for-python",
            "Azure/azure-sdk-for-python",
            "Azure/azure-sdk-for-python",
            PullRequestBase::MainBranch,
        );
        let target = PullRequestTarget::resolve(&t, INTEGRATION, GENERATION);

        assert_eq!(target.base_branch, "master");
        assert_eq!(target.head_reference(), GENERATION);
        assert!(target.maintainer_can_modify());
    }
}
