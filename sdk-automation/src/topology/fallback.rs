//! Substitution of repositories that do not exist.

use super::RepositoryTopology;
use crate::activity_log::ActivityLog;
use crate::config::ConfigError;
use crate::http::{probe_exists, HttpClient};

/// Replaces integration or generation repositories that fail a HEAD probe
/// with the main repository. Branch names are left untouched.
///
/// # Errors
///
/// Returns [`ConfigError::MissingMainRepository`] if the main repository
/// itself does not respond.
pub async fn apply_existence_fallback(
    topology: &mut RepositoryTopology,
    http: &dyn HttpClient,
    log: &ActivityLog,
) -> Result<(), ConfigError> {
    let main_url = topology.main_repository.url();
    if !probe_exists(http, &main_url).await {
        return Err(ConfigError::MissingMainRepository { url: main_url });
    }

    if topology.integration_repository != topology.main_repository {
        let url = topology.integration_repository.url();
        if !probe_exists(http, &url).await {
            log.warn(format!(
                "Integration repository {url} doesn't exist. Using fallback {main_url}"
            ));
            topology.integration_repository = topology.main_repository.clone();
        }
    }

    if topology.generation_repository != topology.main_repository {
        let url = topology.generation_repository.url();
        if !probe_exists(http, &url).await {
            log.warn(format!(
                "Generation repository {url} doesn't exist. Using fallback {main_url}"
            ));
            topology.generation_repository = topology.main_repository.clone();
        }
    }

    Ok(())
}
