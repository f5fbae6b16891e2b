//! `$(name)` substitution in command lines and environment resolution.

use crate::activity_log::ActivityLog;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Prefix marking environment values relative to the clone folder.
const SDK_RELATIVE_PREFIX: &str = "sdkrel:";

/// Normalizes a property name: lowercase, without `_` and `-`.
#[must_use]
pub fn normalize_property_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Properties available to `$(name)` references.
///
/// Keys are matched ignoring case, `_` and `-`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandProperties {
    values: BTreeMap<String, String>,
}

impl CommandProperties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a property.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a property.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.values
            .insert(normalize_property_name(name), value.into());
    }

    /// Looks up a property.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&normalize_property_name(name))
            .map(String::as_str)
    }
}

/// Replaces `$(name)` references in `value`.
///
/// Substituted text is not scanned again. Unknown references are kept verbatim
/// and reported on the activity log.
#[must_use]
pub fn replace_string_variables(
    value: &str,
    properties: &CommandProperties,
    log: &ActivityLog,
) -> String {
    let mut result = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("$(") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find(')') else {
            result.push_str(&rest[start..]);
            return result;
        };

        let name = &after[..end];
        match properties.get(name) {
            Some(replacement) => result.push_str(replacement),
            None => {
                log.warn(format!(
                    "Found no property replacement for \"{name}\" in \"{value}\"."
                ));
                result.push_str(&rest[start..start + 2 + end + 1]);
            }
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

/// Builds the extra environment for generator and script commands.
///
/// Keys prefixed with `sdkrel:` lose the prefix and have their value joined
/// onto `repository_folder`. Non-string values use their JSON form.
#[must_use]
pub fn resolve_environment_variables(
    envs: &BTreeMap<String, Value>,
    repository_folder: &Path,
) -> BTreeMap<String, String> {
    envs.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            match key.strip_prefix(SDK_RELATIVE_PREFIX) {
                Some(stripped) => (
                    stripped.to_string(),
                    repository_folder.join(&value).display().to_string(),
                ),
                None => (key.clone(), value),
            }
        })
        .collect()
}
