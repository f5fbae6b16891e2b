//! Pull request status types.

use serde::Serialize;

/// Outcome of one pull request operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrStatus {
    /// PR successfully created.
    Created {
        /// GitHub PR number.
        number: u64,
        /// GitHub PR URL.
        url: String,
    },

    /// An existing open PR was updated.
    Updated { number: u64, url: String },

    /// PR closed without merging.
    Closed { number: u64, url: String },

    /// PR merged.
    Merged { number: u64, url: String },

    /// Nothing was done.
    Skipped {
        /// Reason for skipping.
        reason: String,
    },

    /// The operation failed.
    Failed {
        /// Error message.
        error: String,
    },
}

impl PrStatus {
    /// Returns the status as a string for template rendering.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::Closed { .. } => "closed",
            Self::Merged { .. } => "merged",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }

    /// Returns the PR URL when a PR was touched.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Created { url, .. }
            | Self::Updated { url, .. }
            | Self::Closed { url, .. }
            | Self::Merged { url, .. } => Some(url),
            Self::Skipped { .. } | Self::Failed { .. } => None,
        }
    }
}
