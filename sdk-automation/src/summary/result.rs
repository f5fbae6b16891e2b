//! Processing result types.

use crate::pull_requests::PrStatus;
use crate::sdk_repository::SdkRepositoryOutcome;
use crate::status::AutomationStatus;

/// Result of processing a single SDK repository.
#[derive(Debug, Clone)]
pub enum ProcessingResult {
    /// Processing succeeded, possibly with warnings.
    Success {
        /// Main repository full name.
        repository: String,
        /// Whether any package warned.
        warned: bool,
        /// Generation pull requests touched.
        pull_requests: Vec<PrStatus>,
    },

    /// Processing was skipped.
    Skipped {
        /// Main repository full name.
        repository: String,
        /// Reason for skipping.
        reason: String,
    },

    /// Processing failed.
    Failed {
        /// Main repository full name.
        repository: String,
        /// Error message.
        error: String,
        /// Generation pull requests touched before the failure.
        pull_requests: Vec<PrStatus>,
    },
}

impl From<&SdkRepositoryOutcome> for ProcessingResult {
    fn from(outcome: &SdkRepositoryOutcome) -> Self {
        let record = &outcome.record;
        let repository = record.topology.main_repository.full_name();
        match record.status {
            AutomationStatus::Succeeded | AutomationStatus::Warning => Self::Success {
                repository,
                warned: record.status == AutomationStatus::Warning,
                pull_requests: outcome.pull_requests.clone(),
            },
            AutomationStatus::Failed => Self::Failed {
                repository,
                error: record.error.clone().unwrap_or_else(|| {
                    let failed: Vec<&str> = record
                        .packages
                        .iter()
                        .filter(|p| p.status == AutomationStatus::Failed)
                        .map(|p| p.name.as_str())
                        .collect();
                    format!("Failed packages: {}", failed.join(", "))
                }),
                pull_requests: outcome.pull_requests.clone(),
            },
            AutomationStatus::Pending | AutomationStatus::InProgress => Self::Skipped {
                repository,
                reason: format!("left {}", record.status.as_str()),
            },
        }
    }
}
