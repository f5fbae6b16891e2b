//! Automation status shared by packages and SDK repositories.

use serde::{Deserialize, Serialize};

/// Progress of a package or SDK repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutomationStatus {
    #[default]
    Pending,
    InProgress,
    Succeeded,
    Warning,
    Failed,
}

impl AutomationStatus {
    /// Returns the status as a string for template rendering.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inProgress",
            Self::Succeeded => "succeeded",
            Self::Warning => "warning",
            Self::Failed => "failed",
        }
    }

    /// Returns true once no further transition is possible in an iteration.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Warning | Self::Failed)
    }

    /// Folds statuses: failed wins over warning, warning over succeeded.
    /// An empty input is succeeded.
    #[must_use]
    pub fn aggregate(statuses: impl IntoIterator<Item = AutomationStatus>) -> Self {
        statuses
            .into_iter()
            .fold(Self::Succeeded, |acc, status| match (acc, status) {
                (Self::Failed, _) | (_, Self::Failed) => Self::Failed,
                (Self::Warning, _) | (_, Self::Warning) => Self::Warning,
                _ => Self::Succeeded,
            })
    }
}
