//! Persisted generation records.

use crate::config::GeneratorConfiguration;
use crate::packages::Package;
use crate::status::AutomationStatus;
use crate::topology::RepositoryTopology;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One language's generation target within an iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkRepositoryRecord {
    /// Name the repository was requested under.
    pub requested_name: String,
    pub language_name: String,
    #[serde(flatten)]
    pub topology: RepositoryTopology,
    pub main_repository_url: String,
    pub integration_repository_url: String,
    pub generation_repository_url: String,
    pub status: AutomationStatus,
    /// Readme or configuration URLs queued for generation, in arrival order.
    pub readme_urls: Vec<String>,
    /// After-scripts attached to individual readmes.
    #[serde(default)]
    pub readme_after_scripts: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub generator_configuration: GeneratorConfiguration,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SdkRepositoryRecord {
    /// Creates a pending record.
    #[must_use]
    pub fn new(
        requested_name: &str,
        language_name: &str,
        topology: RepositoryTopology,
        generator_configuration: GeneratorConfiguration,
    ) -> Self {
        Self {
            requested_name: requested_name.to_string(),
            language_name: language_name.to_string(),
            main_repository_url: topology.main_repository.url(),
            integration_repository_url: topology.integration_repository.url(),
            generation_repository_url: topology.generation_repository.url(),
            topology,
            status: AutomationStatus::Pending,
            readme_urls: Vec::new(),
            readme_after_scripts: BTreeMap::new(),
            generator_configuration,
            packages: Vec::new(),
            diff_url: None,
            error: None,
        }
    }

    /// Marks the record failed with `message`. Failure is final for the iteration.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = AutomationStatus::Failed;
        self.error = Some(message.into());
    }

    /// After-scripts for the whole repository followed by those of each readme.
    #[must_use]
    pub fn after_scripts(&self) -> Vec<String> {
        let mut scripts = self.generator_configuration.all_after_scripts();
        for readme in &self.readme_urls {
            if let Some(extra) = self.readme_after_scripts.get(readme) {
                for script in extra {
                    if !scripts.contains(script) {
                        scripts.push(script.clone());
                    }
                }
            }
        }
        scripts
    }

    /// Recomputes the status from the package statuses.
    ///
    /// A failed record stays failed.
    pub fn refresh_status(&mut self) {
        if self.status == AutomationStatus::Failed {
            return;
        }
        self.status = AutomationStatus::aggregate(self.packages.iter().map(|p| p.status));
    }
}

/// Persisted `data.json` of one iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub iteration: u32,
    pub specification_pull_request_number: u64,
    pub specification_pull_request_url: String,
    pub sdk_repositories: Vec<SdkRepositoryRecord>,
    pub logs_url: String,
    pub comment_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PullRequestBase;
    use crate::packages::PackageFolder;
    use crate::repository::RepositoryName;

    fn record() -> SdkRepositoryRecord {
        let main = RepositoryName::new("Azure", "azure-sdk-for-python");
        let topology = RepositoryTopology {
            main_repository: main.clone(),
            integration_repository: main.clone(),
            generation_repository: RepositoryName::new("generation", "azure-sdk-for-python"),
            integration_branch_prefix: "sdkAutomation".to_string(),
            main_branch: "master".to_string(),
            pull_request_base: PullRequestBase::Unset,
        };
        SdkRepositoryRecord::new(
            "azure-sdk-for-python",
            "Python",
            topology,
            GeneratorConfiguration::default(),
        )
    }

    fn package(status: AutomationStatus) -> Package {
        let folder = PackageFolder {
            relative_folder: "azure-mgmt-rdbms".to_string(),
            files: Vec::new(),
        };
        let mut package =
            Package::new("azure-mgmt-rdbms".to_string(), folder, "sdkAutomation", 1).unwrap();
        package.status = status;
        package
    }

    #[test]
    fn serializes_flat_camel_case() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["mainRepository"], "Azure/azure-sdk-for-python");
        assert_eq!(
            json["generationRepositoryUrl"],
            "https://github.com/generation/azure-sdk-for-python"
        );
        assert_eq!(json["status"], "pending");
        assert_eq!(json["integrationBranchPrefix"], "sdkAutomation");

        let back: SdkRepositoryRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.topology.main_branch, "master");
    }

    #[test]
    fn status_follows_packages_unless_failed() {
        let mut record = record();
        record.refresh_status();
        assert_eq!(record.status, AutomationStatus::Succeeded);

        record.packages = vec![
            package(AutomationStatus::Succeeded),
            package(AutomationStatus::Warning),
        ];
        record.refresh_status();
        assert_eq!(record.status, AutomationStatus::Warning);

        record.fail("Generator failed");
        record.packages = vec![package(AutomationStatus::Succeeded)];
        record.refresh_status();
        assert_eq!(record.status, AutomationStatus::Failed);
    }

    #[test]
    fn merges_readme_after_scripts() {
        let mut record = record();
        record.generator_configuration.after_scripts = vec!["npm install".to_string()];
        record.readme_urls = vec!["a/readme.md".to_string()];
        record.readme_after_scripts.insert(
            "a/readme.md".to_string(),
            vec!["npm install".to_string(), "npm run lint".to_string()],
        );
        assert_eq!(
            record.after_scripts(),
            vec!["npm install".to_string(), "npm run lint".to_string()]
        );
    }
}
