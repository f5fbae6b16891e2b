//! Repository identities.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Host that all repository URLs point at.
const GITHUB_URL: &str = "https://github.com";

/// A repository identity in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryName {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,
}

impl RepositoryName {
    /// Creates a repository identity from its parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parses `owner/name`, or a bare `name` which is assigned `default_owner`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRepository`] for empty segments or more
    /// than one `/`.
    pub fn parse_with_default_owner(value: &str, default_owner: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRepository {
            value: value.to_string(),
        };

        let trimmed = value.trim().trim_end_matches(".git");
        let trimmed = trimmed
            .strip_prefix(GITHUB_URL)
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or(trimmed);

        match trimmed.split_once('/') {
            Some((owner, name)) => {
                if owner.is_empty() || name.is_empty() || name.contains('/') {
                    return Err(invalid());
                }
                Ok(Self::new(owner, name))
            }
            None if !trimmed.is_empty() && !default_owner.is_empty() => {
                Ok(Self::new(default_owner, trimmed))
            }
            None => Err(invalid()),
        }
    }

    /// Returns the `owner/name` form.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Returns the public web URL of the repository.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{GITHUB_URL}/{}/{}", self.owner, self.name)
    }

    /// Returns the URL used for cloning and remotes.
    ///
    /// When a token is provided it is embedded as `x-access-token` credentials.
    #[must_use]
    pub fn clone_url(&self, token: Option<&str>) -> String {
        let public = self.url();
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return public;
        };

        match Url::parse(&public) {
            Ok(mut url) => {
                if url.set_username("x-access-token").is_err()
                    || url.set_password(Some(token)).is_err()
                {
                    return public;
                }
                url.to_string()
            }
            Err(_) => public,
        }
    }

    /// Returns the head label for a branch in this repository (`owner:branch`).
    #[must_use]
    pub fn head_label(&self, branch: &str) -> String {
        format!("{}:{branch}", self.owner)
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl std::str::FromStr for RepositoryName {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse_with_default_owner(value, "")
    }
}

impl TryFrom<String> for RepositoryName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepositoryName> for String {
    fn from(value: RepositoryName) -> Self {
        value.full_name()
    }
}

/// Replaces the password of any URL embedded in `text` with `***`.
#[must_use]
pub fn redact_credentials(text: &str) -> String {
    text.split(' ')
        .map(|part| match Url::parse(part) {
            Ok(mut url) if url.password().is_some() => {
                if url.set_password(Some("***")).is_ok() {
                    url.to_string()
                } else {
                    part.to_string()
                }
            }
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
