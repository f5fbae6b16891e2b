//! Per-SDK-repository generator configuration (`swagger_to_sdk_config.json`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generator configuration document found in each SDK repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfiguration {
    /// Scripts run after generation, for every readme.
    #[serde(default)]
    pub after_scripts: Vec<String>,

    /// Generator metadata.
    #[serde(default)]
    pub meta: GeneratorMeta,
}

impl GeneratorConfiguration {
    /// Returns all configured after-scripts: top-level entries first, then `meta` ones.
    #[must_use]
    pub fn all_after_scripts(&self) -> Vec<String> {
        self.after_scripts
            .iter()
            .chain(self.meta.after_scripts.iter())
            .cloned()
            .collect()
    }

    /// Returns the advanced options.
    #[must_use]
    pub fn advanced_options(&self) -> &AdvancedOptions {
        &self.meta.advanced_options
    }
}

/// The `meta` section of the generator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorMeta {
    /// Scripts run after generation.
    #[serde(default)]
    pub after_scripts: Vec<String>,

    /// Environment variables for generator and scripts. Keys prefixed with
    /// `sdkrel:` resolve their value relative to the clone folder.
    #[serde(default)]
    pub envs: BTreeMap<String, serde_json::Value>,

    /// Options handed to the generator command.
    #[serde(default, alias = "autorest_options")]
    pub generator_options: BTreeMap<String, serde_json::Value>,

    /// Behavioural switches.
    #[serde(default)]
    pub advanced_options: AdvancedOptions,
}

/// Switches controlling pull request automation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedOptions {
    /// Whether generation pull requests are created at all.
    #[serde(default = "default_true")]
    pub create_sdk_pull_requests: bool,

    /// Base branch policy for generation pull requests.
    #[serde(default)]
    pub sdk_generation_pull_request_base: PullRequestBase,

    /// When set, generation pull requests are relabelled but never closed or merged.
    #[serde(default)]
    pub disable_generation_pr_automation: bool,

    /// Clone folder name override.
    #[serde(default)]
    pub clone_dir: Option<String>,
}

impl Default for AdvancedOptions {
    fn default() -> Self {
        Self {
            create_sdk_pull_requests: true,
            sdk_generation_pull_request_base: PullRequestBase::Unset,
            disable_generation_pr_automation: false,
            clone_dir: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Where generation pull requests are opened against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestBase {
    /// Not configured; behaves like [`PullRequestBase::IntegrationBranch`].
    #[default]
    Unset,

    /// The package's integration branch in the integration repository.
    IntegrationBranch,

    /// The main branch in the main repository.
    MainBranch,
}

impl PullRequestBase {
    /// Returns true when pull requests target integration branches.
    #[must_use]
    pub fn uses_integration_branch(self) -> bool {
        !matches!(self, Self::MainBranch)
    }

    /// Returns the policy as a string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::IntegrationBranch => "integration_branch",
            Self::MainBranch => "main_branch",
        }
    }
}
