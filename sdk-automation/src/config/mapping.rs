//! Specification repository configuration and SDK repository mappings.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Owner assumed for bare repository names.
pub(crate) fn default_repository_owner() -> String {
    "Azure".to_string()
}

/// Path of the generator configuration inside an SDK repository.
pub(crate) fn default_generator_configuration_path() -> String {
    "swagger_to_sdk_config.json".to_string()
}

/// Specification-repository-level configuration document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificationRepositoryConfiguration {
    /// Mappings from requested SDK repository names to repository topologies.
    #[serde(default)]
    pub sdk_repository_mappings: BTreeMap<String, SdkRepositoryMappingEntry>,

    /// Owner assigned to bare repository names.
    #[serde(default = "default_repository_owner")]
    pub default_repository_owner: String,

    /// Path of the generator configuration file in each SDK repository.
    #[serde(default = "default_generator_configuration_path")]
    pub generator_configuration_path: String,
}

impl Default for SpecificationRepositoryConfiguration {
    fn default() -> Self {
        Self {
            sdk_repository_mappings: BTreeMap::new(),
            default_repository_owner: default_repository_owner(),
            generator_configuration_path: default_generator_configuration_path(),
        }
    }
}

impl SpecificationRepositoryConfiguration {
    /// Returns the mapping entry for a requested SDK repository, if any.
    #[must_use]
    pub fn mapping(&self, sdk_repository_name: &str) -> Option<&SdkRepositoryMappingEntry> {
        self.sdk_repository_mappings.get(sdk_repository_name)
    }
}

/// One entry of `sdkRepositoryMappings`: a bare repository or a full topology.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SdkRepositoryMappingEntry {
    /// `"owner/repo"`
    Bare(String),

    /// Structured mapping.
    Detailed(DetailedMapping),
}

/// Structured mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedMapping {
    /// Repository that owns the main branch.
    pub main_repository: String,

    /// Repository holding integration branches.
    #[serde(default)]
    pub integration_repository: Option<String>,

    /// Repository generation branches are pushed to.
    #[serde(default)]
    pub generation_repository: Option<String>,

    /// Prefix for integration and generation branches.
    #[serde(default)]
    pub integration_branch_prefix: Option<String>,

    /// Main branch of the main repository.
    #[serde(default)]
    pub main_branch: Option<String>,

    /// Overrides the generator configuration path for this repository.
    #[serde(default)]
    pub config_file_path: Option<String>,
}
