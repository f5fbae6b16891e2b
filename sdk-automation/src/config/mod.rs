//! Configuration loading.
//!
//! Three documents drive a run:
//! - the specification repository configuration (JSON, `sdkRepositoryMappings`)
//! - the generator configuration of each SDK repository (JSON, fetched over HTTP)
//! - an optional language table (TOML) overriding the built-in languages

mod error;
mod generator;
mod language;
mod mapping;

pub use error::ConfigError;
pub use generator::{AdvancedOptions, GeneratorConfiguration, GeneratorMeta, PullRequestBase};
pub use language::{LanguageConfiguration, LanguageRegistry, PackagePartition};
pub use mapping::{DetailedMapping, SdkRepositoryMappingEntry, SpecificationRepositoryConfiguration};

use language::LanguagesDocument;
use std::path::Path;
use tracing::{debug, info};

/// Loads the specification repository configuration from a JSON file.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file is missing, unreadable, not valid
/// JSON, or contains a mapping without a main repository.
pub fn load_specification_configuration(
    path: &Path,
) -> Result<SpecificationRepositoryConfiguration, ConfigError> {
    info!(path = %path.display(), "Loading specification repository configuration");
    let content = read_file(path)?;
    parse_specification_configuration(&content, &path.display().to_string())
}

/// Parses the specification repository configuration.
///
/// # Arguments
///
/// * `content` - JSON document
/// * `source` - Path or URL the document came from, used in errors
///
/// # Errors
///
/// Returns [`ConfigError::JsonError`] or [`ConfigError::ValidationError`].
pub fn parse_specification_configuration(
    content: &str,
    source: &str,
) -> Result<SpecificationRepositoryConfiguration, ConfigError> {
    let config: SpecificationRepositoryConfiguration =
        serde_json::from_str(content).map_err(|e| ConfigError::JsonError {
            path: source.to_string(),
            source: e,
        })?;

    for (name, entry) in &config.sdk_repository_mappings {
        let main_repository = match entry {
            SdkRepositoryMappingEntry::Bare(main) => main,
            SdkRepositoryMappingEntry::Detailed(detailed) => &detailed.main_repository,
        };
        if main_repository.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                path: source.to_string(),
                message: format!("mapping '{name}' has an empty main repository"),
            });
        }
    }

    debug!(
        mappings = config.sdk_repository_mappings.len(),
        "Parsed specification repository configuration"
    );
    Ok(config)
}

/// Parses an SDK repository's generator configuration.
///
/// # Errors
///
/// Returns [`ConfigError::JsonError`] if the document is not valid JSON.
pub fn parse_generator_configuration(
    content: &str,
    source: &str,
) -> Result<GeneratorConfiguration, ConfigError> {
    serde_json::from_str(content).map_err(|e| ConfigError::JsonError {
        path: source.to_string(),
        source: e,
    })
}

/// Builds the language registry, applying overrides from a TOML file when given.
///
/// # Errors
///
/// Returns [`ConfigError`] if the override file cannot be read or parsed.
pub fn load_language_registry(path: Option<&Path>) -> Result<LanguageRegistry, ConfigError> {
    let registry = LanguageRegistry::builtin();
    let Some(path) = path else {
        return Ok(registry);
    };

    info!(path = %path.display(), "Loading language overrides");
    let content = read_file(path)?;
    let document: LanguagesDocument =
        toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })?;

    Ok(registry.with_overrides(document.language))
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.display().to_string(),
        });
    }

    std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    })
}
