//! Changed packages and their branch lifecycle.

mod artifacts;
mod error;
mod lifecycle;
mod partition;

pub use artifacts::{collect_artifacts, upload_artifacts};
pub use error::PackageError;
pub use lifecycle::{process_package, PackageContext, PackageOutcome};
pub use partition::{find_package_folders, PackageFolder};

use crate::config::LanguageConfiguration;
use crate::status::AutomationStatus;
use crate::templates::{
    generation_branch_name, integration_branch_name, ArtifactLink, TemplateError,
};
use serde::{Deserialize, Serialize};

/// Lifecycle stage a package has reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PackageStage {
    #[default]
    Discovered,
    BranchPrepared,
    Committed,
    ScriptsRun,
    Built,
    ArtifactsUploaded,
    Pushed,
    PullRequestReconciled,
}

impl PackageStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::BranchPrepared => "branch prepared",
            Self::Committed => "committed",
            Self::ScriptsRun => "after scripts run",
            Self::Built => "built",
            Self::ArtifactsUploaded => "artifacts uploaded",
            Self::Pushed => "pushed",
            Self::PullRequestReconciled => "pull request reconciled",
        }
    }
}

/// A changed package within one SDK repository clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub name: String,
    /// Folder relative to the clone root.
    pub relative_folder: String,
    pub changed_files: Vec<String>,
    pub generation_branch: String,
    pub integration_branch: String,
    pub status: AutomationStatus,
    pub stage: PackageStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_pull_request_url: Option<String>,
    #[serde(default)]
    pub artifacts: Vec<ArtifactLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Package {
    /// Creates a package from a changed folder.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidBranchName`] if the package name does
    /// not form valid branch names.
    pub fn new(
        name: String,
        folder: PackageFolder,
        integration_branch_prefix: &str,
        specification_pull_request_number: u64,
    ) -> Result<Self, TemplateError> {
        Ok(Self {
            generation_branch: generation_branch_name(
                integration_branch_prefix,
                &name,
                specification_pull_request_number,
            )?,
            integration_branch: integration_branch_name(integration_branch_prefix, &name)?,
            name,
            relative_folder: folder.relative_folder,
            changed_files: folder.files,
            status: AutomationStatus::Pending,
            stage: PackageStage::Discovered,
            generation_pull_request_url: None,
            artifacts: Vec::new(),
            instructions_url: None,
            error: None,
        })
    }
}

/// Derives a package name from its folder.
#[must_use]
pub fn package_name(language: &LanguageConfiguration, relative_folder: &str) -> String {
    match &language.package_name_prefix {
        Some(prefix) => format!("{prefix}{relative_folder}"),
        None => relative_folder.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LanguageRegistry;

    #[test]
    fn names_branches_from_package() {
        let folder = PackageFolder {
            relative_folder: "azure-mgmt-rdbms".to_string(),
            files: vec!["azure-mgmt-rdbms/setup.py".to_string()],
        };
        let package =
            Package::new("azure-mgmt-rdbms".to_string(), folder, "sdkAutomation", 4994).unwrap();

        assert_eq!(package.generation_branch, "sdkAutomation/azure-mgmt-rdbms@4994");
        assert_eq!(package.integration_branch, "sdkAutomation/azure-mgmt-rdbms");
        assert_eq!(package.status, AutomationStatus::Pending);
    }

    #[test]
    fn nested_folders_keep_slashes_in_branch_names() {
        let folder = PackageFolder {
            relative_folder: "sdk/mysql".to_string(),
            files: Vec::new(),
        };
        let package = Package::new("sdk/mysql".to_string(), folder, "sdkAutomation", 7).unwrap();
        assert_eq!(package.generation_branch, "sdkAutomation/sdk/mysql@7");
        assert_eq!(package.integration_branch, "sdkAutomation/sdk/mysql");
    }

    #[test]
    fn applies_language_prefix() {
        let registry = LanguageRegistry::builtin();
        let mut language = registry.get("Python").unwrap().clone();
        assert_eq!(package_name(&language, "azure-mgmt-rdbms"), "azure-mgmt-rdbms");

        language.package_name_prefix = Some("@azure/".to_string());
        assert_eq!(package_name(&language, "arm-mysql"), "@azure/arm-mysql");
    }
}
