//! Blob paths used by a specification pull request.

use crate::repository::RepositoryName;

/// Path builder rooted at one specification pull request.
///
/// ```text
/// {working_prefix}/{spec_owner}/{spec_name}/{pr_number}/
/// ├── data.json
/// └── {iteration}/
///     ├── data.json
///     ├── logs.txt
///     ├── comment.html
///     └── {sdk_owner}/{sdk_name}/
///         ├── diff.txt
///         └── {package}/...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobLayout {
    pull_request_prefix: String,
}

impl BlobLayout {
    /// Creates the layout for a specification pull request.
    #[must_use]
    pub fn new(
        working_prefix: &str,
        specification_repository: &RepositoryName,
        pull_request_number: u64,
    ) -> Self {
        let working_prefix = working_prefix.trim_matches('/');
        let base = format!(
            "{}/{}/{pull_request_number}",
            specification_repository.owner, specification_repository.name
        );
        let pull_request_prefix = if working_prefix.is_empty() {
            base
        } else {
            format!("{working_prefix}/{base}")
        };
        Self {
            pull_request_prefix,
        }
    }

    /// Returns the prefix shared by every iteration.
    #[must_use]
    pub fn pull_request_prefix(&self) -> &str {
        &self.pull_request_prefix
    }

    /// Path of the specification pull request record.
    #[must_use]
    pub fn pull_request_data(&self) -> String {
        format!("{}/data.json", self.pull_request_prefix)
    }

    /// Prefix of one iteration.
    #[must_use]
    pub fn generation_prefix(&self, iteration: u32) -> String {
        format!("{}/{iteration}", self.pull_request_prefix)
    }

    /// Path of an iteration's generation record.
    #[must_use]
    pub fn generation_data(&self, iteration: u32) -> String {
        format!("{}/data.json", self.generation_prefix(iteration))
    }

    /// Path of an iteration's append log.
    #[must_use]
    pub fn logs(&self, iteration: u32) -> String {
        format!("{}/logs.txt", self.generation_prefix(iteration))
    }

    /// Path of an iteration's rendered comment.
    #[must_use]
    pub fn comment(&self, iteration: u32) -> String {
        format!("{}/comment.html", self.generation_prefix(iteration))
    }

    /// Prefix of one SDK repository within an iteration.
    #[must_use]
    pub fn sdk_repository_prefix(&self, iteration: u32, repository: &RepositoryName) -> String {
        format!(
            "{}/{}/{}",
            self.generation_prefix(iteration),
            repository.owner,
            repository.name
        )
    }

    /// Path of the full generator diff of an SDK repository.
    #[must_use]
    pub fn diff(&self, iteration: u32, repository: &RepositoryName) -> String {
        format!("{}/diff.txt", self.sdk_repository_prefix(iteration, repository))
    }

    /// Prefix of a package's artifacts within an iteration.
    #[must_use]
    pub fn package_prefix(
        &self,
        iteration: u32,
        repository: &RepositoryName,
        package_name: &str,
    ) -> String {
        format!(
            "{}/{package_name}",
            self.sdk_repository_prefix(iteration, repository)
        )
    }

    /// Prefix of a package that stays stable across iterations.
    #[must_use]
    pub fn latest_package_prefix(&self, repository: &RepositoryName, package_name: &str) -> String {
        format!(
            "{}/{}/{}/{package_name}",
            self.pull_request_prefix, repository.owner, repository.name
        )
    }
}
