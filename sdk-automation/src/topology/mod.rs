//! Repository topology resolution.
//!
//! An SDK repository is served by up to three GitHub repositories:
//! - the main repository, owning the main branch
//! - the integration repository, holding long-lived integration branches
//! - the generation repository, receiving per-iteration generation branches
//!
//! Unset repositories default to the main repository.

mod fallback;

pub use fallback::apply_existence_fallback;

use crate::activity_log::ActivityLog;
use crate::config::{
    ConfigError, PullRequestBase, SdkRepositoryMappingEntry, SpecificationRepositoryConfiguration,
};
use crate::repository::RepositoryName;
use crate::templates::local_main_branch_name;
use serde::{Deserialize, Serialize};

/// Branch prefix used when a mapping sets none.
pub const DEFAULT_INTEGRATION_BRANCH_PREFIX: &str = "sdkAutomation";

/// Main branch used when a mapping sets none.
pub const DEFAULT_MAIN_BRANCH: &str = "master";

/// A mapping entry resolved into its canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping {
    /// Name the SDK repository was requested under.
    pub requested_name: String,
    pub main_repository: RepositoryName,
    pub integration_repository: RepositoryName,
    pub generation_repository: RepositoryName,
    pub integration_branch_prefix: String,
    pub main_branch: String,
    /// Whether `mainBranch` was set explicitly.
    pub main_branch_explicit: bool,
    /// Generator configuration path inside the SDK repository.
    pub config_file_path: String,
}

/// Resolves the mapping for a requested SDK repository name.
///
/// Names without a mapping entry map to themselves under the default owner.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidRepository`] if a repository identity in the
/// mapping cannot be parsed.
pub fn resolve_mapping(
    requested_name: &str,
    config: &SpecificationRepositoryConfiguration,
    log: &ActivityLog,
) -> Result<ResolvedMapping, ConfigError> {
    let owner = config.default_repository_owner.as_str();
    let parse = |value: &str| RepositoryName::parse_with_default_owner(value, owner);

    let resolved = match config.mapping(requested_name) {
        None => {
            let main = parse(requested_name)?;
            log.info(format!("Mapping \"{requested_name}\" to \"{main}\"."));
            ResolvedMapping {
                requested_name: requested_name.to_string(),
                integration_repository: main.clone(),
                generation_repository: main.clone(),
                main_repository: main,
                integration_branch_prefix: DEFAULT_INTEGRATION_BRANCH_PREFIX.to_string(),
                main_branch: DEFAULT_MAIN_BRANCH.to_string(),
                main_branch_explicit: false,
                config_file_path: config.generator_configuration_path.clone(),
            }
        }
        Some(SdkRepositoryMappingEntry::Bare(main)) => {
            let main = parse(main)?;
            log.info(format!("Mapping \"{requested_name}\" to \"{main}\"."));
            ResolvedMapping {
                requested_name: requested_name.to_string(),
                integration_repository: main.clone(),
                generation_repository: main.clone(),
                main_repository: main,
                integration_branch_prefix: DEFAULT_INTEGRATION_BRANCH_PREFIX.to_string(),
                main_branch: DEFAULT_MAIN_BRANCH.to_string(),
                main_branch_explicit: false,
                config_file_path: config.generator_configuration_path.clone(),
            }
        }
        Some(SdkRepositoryMappingEntry::Detailed(detailed)) => {
            let main = parse(&detailed.main_repository)?;
            log.info(format!(
                "Mapping \"{requested_name}\" main repository to \"{main}\"."
            ));

            let integration = match &detailed.integration_repository {
                Some(value) => {
                    let repository = parse(value)?;
                    log.info(format!(
                        "Mapping \"{requested_name}\" integration repository to \"{repository}\"."
                    ));
                    repository
                }
                None => main.clone(),
            };
            let generation = match &detailed.generation_repository {
                Some(value) => {
                    let repository = parse(value)?;
                    log.info(format!(
                        "Mapping \"{requested_name}\" generation repository to \"{repository}\"."
                    ));
                    repository
                }
                None => main.clone(),
            };

            ResolvedMapping {
                requested_name: requested_name.to_string(),
                main_repository: main,
                integration_repository: integration,
                generation_repository: generation,
                integration_branch_prefix: detailed
                    .integration_branch_prefix
                    .clone()
                    .filter(|prefix| !prefix.is_empty())
                    .unwrap_or_else(|| DEFAULT_INTEGRATION_BRANCH_PREFIX.to_string()),
                main_branch: detailed
                    .main_branch
                    .clone()
                    .filter(|branch| !branch.is_empty())
                    .unwrap_or_else(|| DEFAULT_MAIN_BRANCH.to_string()),
                main_branch_explicit: detailed
                    .main_branch
                    .as_deref()
                    .is_some_and(|branch| !branch.is_empty()),
                config_file_path: detailed
                    .config_file_path
                    .clone()
                    .unwrap_or_else(|| config.generator_configuration_path.clone()),
            }
        }
    };

    log.info(format!(
        "Using \"{}\" as the integration branch prefix.",
        resolved.integration_branch_prefix
    ));
    log.info(format!(
        "Using \"{}\" as the main branch in the main repository.",
        resolved.main_branch
    ));

    Ok(resolved)
}

/// Concrete repositories and branches used for one SDK repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryTopology {
    pub main_repository: RepositoryName,
    pub integration_repository: RepositoryName,
    pub generation_repository: RepositoryName,
    pub integration_branch_prefix: String,
    pub main_branch: String,
    pub pull_request_base: PullRequestBase,
}

impl RepositoryTopology {
    /// Applies the pull request base policy to a resolved mapping.
    ///
    /// Under [`PullRequestBase::MainBranch`] without an explicit main branch,
    /// the integration and generation repositories collapse onto the main
    /// repository.
    #[must_use]
    pub fn from_mapping(mapping: &ResolvedMapping, policy: PullRequestBase) -> Self {
        let collapse = policy == PullRequestBase::MainBranch && !mapping.main_branch_explicit;
        let (integration_repository, generation_repository) = if collapse {
            (
                mapping.main_repository.clone(),
                mapping.main_repository.clone(),
            )
        } else {
            (
                mapping.integration_repository.clone(),
                mapping.generation_repository.clone(),
            )
        };

        Self {
            main_repository: mapping.main_repository.clone(),
            integration_repository,
            generation_repository,
            integration_branch_prefix: mapping.integration_branch_prefix.clone(),
            main_branch: mapping.main_branch.clone(),
            pull_request_base: policy,
        }
    }

    /// Name of the local branch tracking `main/{main_branch}`.
    #[must_use]
    pub fn local_main_branch(&self) -> String {
        local_main_branch_name(&self.main_branch)
    }

    /// Remote-qualified main branch, e.g. `main/master`.
    #[must_use]
    pub fn remote_main_branch(&self) -> String {
        format!("{}/{}", crate::git::REMOTE_MAIN, self.main_branch)
    }

    /// Returns true when all three roles use one repository.
    #[must_use]
    pub fn is_single_repository(&self) -> bool {
        self.main_repository == self.integration_repository
            && self.main_repository == self.generation_repository
    }
}

/// Resolves a topology in one step.
///
/// # Errors
///
/// Returns [`ConfigError`] if the mapping cannot be resolved.
pub fn resolve_topology(
    requested_name: &str,
    config: &SpecificationRepositoryConfiguration,
    policy: PullRequestBase,
    log: &ActivityLog,
) -> Result<RepositoryTopology, ConfigError> {
    let mapping = resolve_mapping(requested_name, config, log)?;
    Ok(RepositoryTopology::from_mapping(&mapping, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_specification_configuration;

    fn config() -> SpecificationRepositoryConfiguration {
        parse_specification_configuration(
            r#"{
                "sdkRepositoryMappings": {
                    "azure-sdk-for-java": "Azure/azure-sdk-for-java",
                    "azure-sdk-for-python": {
                        "mainRepository": "Azure/azure-sdk-for-python",
                        "integrationRepository": "integration/azure-sdk-for-python",
                        "generationRepository": "generation/azure-sdk-for-python",
                        "integrationBranchPrefix": "apples"
                    },
                    "azure-sdk-for-go": {
                        "mainRepository": "Azure/azure-sdk-for-go",
                        "integrationRepository": "integration/azure-sdk-for-go",
                        "mainBranch": "non-master"
                    }
                }
            }"#,
            "inline",
        )
        .unwrap()
    }

    #[test]
    fn unmapped_name_uses_default_owner() {
        let log = ActivityLog::new();
        let mapping = resolve_mapping("azure-sdk-for-js", &config(), &log).unwrap();

        assert_eq!(mapping.main_repository.full_name(), "Azure/azure-sdk-for-js");
        assert_eq!(mapping.integration_repository, mapping.main_repository);
        assert_eq!(mapping.generation_repository, mapping.main_repository);
        assert_eq!(mapping.integration_branch_prefix, "sdkAutomation");
        assert_eq!(mapping.main_branch, "master");
        assert_eq!(
            log.lines(),
            vec![
                "Mapping \"azure-sdk-for-js\" to \"Azure/azure-sdk-for-js\".".to_string(),
                "Using \"sdkAutomation\" as the integration branch prefix.".to_string(),
                "Using \"master\" as the main branch in the main repository.".to_string(),
            ]
        );
    }

    #[test]
    fn detailed_mapping_keeps_distinct_repositories() {
        let log = ActivityLog::new();
        let mapping = resolve_mapping("azure-sdk-for-python", &config(), &log).unwrap();

        assert_eq!(
            mapping.integration_repository.full_name(),
            "integration/azure-sdk-for-python"
        );
        assert_eq!(
            mapping.generation_repository.full_name(),
            "generation/azure-sdk-for-python"
        );
        assert_eq!(mapping.integration_branch_prefix, "apples");
        assert!(log.contains(
            "Mapping \"azure-sdk-for-python\" generation repository to \"generation/azure-sdk-for-python\"."
        ));
    }

    #[test]
    fn main_branch_policy_collapses_without_explicit_main_branch() {
        let log = ActivityLog::new();
        let mapping = resolve_mapping("azure-sdk-for-python", &config(), &log).unwrap();

        let topology = RepositoryTopology::from_mapping(&mapping, PullRequestBase::MainBranch);
        assert!(topology.is_single_repository());

        let topology = RepositoryTopology::from_mapping(&mapping, PullRequestBase::Unset);
        assert!(!topology.is_single_repository());
    }

    #[test]
    fn explicit_main_branch_keeps_integration_repository() {
        let log = ActivityLog::new();
        let topology = resolve_topology(
            "azure-sdk-for-go",
            &config(),
            PullRequestBase::MainBranch,
            &log,
        )
        .unwrap();

        assert_eq!(topology.main_branch, "non-master");
        assert_eq!(
            topology.integration_repository.full_name(),
            "integration/azure-sdk-for-go"
        );
        assert_eq!(topology.local_main_branch(), "main-non-master");
        assert_eq!(topology.remote_main_branch(), "main/non-master");
    }

    #[test]
    fn invalid_repository_is_a_configuration_error() {
        let config = parse_specification_configuration(
            r#"{ "sdkRepositoryMappings": { "x": "a/b/c" } }"#,
            "inline",
        )
        .unwrap();
        let result = resolve_mapping("x", &config, &ActivityLog::new());
        assert!(matches!(result, Err(ConfigError::InvalidRepository { .. })));
    }
}
