//! Branch names, titles, commit messages and Handlebars rendering.
//!
//! Branch names are a contract shared with other tooling:
//! - generation branch: `{prefix}/{package}@{spec_pr_number}`
//! - integration branch: `{prefix}/{package}`
//! - local main tracking branch: `main-{main_branch}`
//!
//! Package names keep their `/` separators; `/` inside the main branch becomes `-`.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{
    create_handlebars_registry, ArtifactLink, TemplateRenderer, INSTRUCTIONS_COMMENT_MARKER,
};

use bstr::ByteSlice;

/// Generates the integration branch name for a package.
///
/// Format: `{prefix}/{package}`
///
/// # Errors
///
/// Returns [`TemplateError::InvalidBranchName`] if the result is not a valid
/// git reference name.
pub fn integration_branch_name(prefix: &str, package_name: &str) -> Result<String, TemplateError> {
    validate_branch_name(format!("{prefix}/{package_name}"))
}

/// Generates the generation branch name for a package.
///
/// Format: `{prefix}/{package}@{spec_pr_number}`
///
/// # Errors
///
/// Returns [`TemplateError::InvalidBranchName`] if the result is not a valid
/// git reference name.
pub fn generation_branch_name(
    prefix: &str,
    package_name: &str,
    specification_pull_request_number: u64,
) -> Result<String, TemplateError> {
    validate_branch_name(format!(
        "{prefix}/{package_name}@{specification_pull_request_number}"
    ))
}

/// Generates the local branch that tracks the main branch.
///
/// Format: `main-{main_branch}`
#[must_use]
pub fn local_main_branch_name(main_branch: &str) -> String {
    format!("main-{}", main_branch.replace('/', "-"))
}

/// Returns the suffix shared by all generation branches of a spec pull request.
#[must_use]
pub fn generation_branch_suffix(specification_pull_request_number: u64) -> String {
    format!("@{specification_pull_request_number}")
}

/// Generates the generation pull request title.
///
/// Format: `[AutoPR {package}] {spec_title}`
#[must_use]
pub fn generation_pr_title(package_name: &str, specification_title: &str) -> String {
    format!("[AutoPR {package_name}] {specification_title}")
}

/// Generates the integration pull request title.
///
/// Format: `[AutoPR] {spec_title}`
#[must_use]
pub fn integration_pr_title(specification_title: &str) -> String {
    format!("[AutoPR] {specification_title}")
}

/// Generates the integration pull request body.
#[must_use]
pub fn integration_pr_body(generation_pull_request_url: &str) -> String {
    format!("Created to integrate {generation_pull_request_url}.")
}

/// Commit title for generated code.
///
/// Format: `Generated from {commit}`
#[must_use]
pub fn generation_commit_title(specification_commit: &str) -> String {
    format!("Generated from {specification_commit}")
}

/// Commit title for the separate commit holding after-script changes.
pub const AFTER_SCRIPTS_COMMIT_TITLE: &str = "Modifications after running after_scripts";

fn validate_branch_name(name: String) -> Result<String, TemplateError> {
    match gix_validate::reference::name_partial(name.as_bytes().as_bstr()) {
        Ok(_) => Ok(name),
        Err(e) => Err(TemplateError::InvalidBranchName {
            name,
            message: e.to_string(),
        }),
    }
}
