//! Run summary types.

use super::result::ProcessingResult;
use crate::pull_requests::PrStatus;
use serde::Serialize;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Generation iteration, when the run generated code.
    pub iteration: Option<u32>,

    /// Number of SDK repositories that succeeded without warnings.
    pub repositories_succeeded: usize,

    /// Number of SDK repositories that succeeded with warnings.
    pub repositories_warned: usize,

    /// Number of SDK repositories that failed.
    pub repositories_failed: usize,

    /// Number of SDK repositories skipped.
    pub repositories_skipped: usize,

    /// Number of pull requests created.
    pub prs_created: usize,

    /// Number of existing pull requests updated.
    pub prs_updated: usize,

    /// Number of pull requests closed.
    pub prs_closed: usize,

    /// Number of pull requests merged.
    pub prs_merged: usize,

    /// Number of pull request operations that failed.
    pub prs_failed: usize,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(iteration: Option<u32>) -> Self {
        Self {
            iteration,
            ..Default::default()
        }
    }

    /// Updates the summary with a processing result.
    pub fn record_result(&mut self, result: &ProcessingResult) {
        match result {
            ProcessingResult::Success {
                warned,
                pull_requests,
                ..
            } => {
                if *warned {
                    self.repositories_warned += 1;
                } else {
                    self.repositories_succeeded += 1;
                }
                pull_requests.iter().for_each(|pr| self.record_pull_request(pr));
            }
            ProcessingResult::Skipped { .. } => self.repositories_skipped += 1,
            ProcessingResult::Failed { pull_requests, .. } => {
                self.repositories_failed += 1;
                pull_requests.iter().for_each(|pr| self.record_pull_request(pr));
            }
        }
    }

    /// Updates the summary with one pull request operation.
    pub fn record_pull_request(&mut self, status: &PrStatus) {
        match status {
            PrStatus::Created { .. } => self.prs_created += 1,
            PrStatus::Updated { .. } => self.prs_updated += 1,
            PrStatus::Closed { .. } => self.prs_closed += 1,
            PrStatus::Merged { .. } => self.prs_merged += 1,
            PrStatus::Failed { .. } => self.prs_failed += 1,
            PrStatus::Skipped { .. } => {}
        }
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.repositories_failed > 0 || self.prs_failed > 0
    }

    /// Returns true if all operations were successful.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_record_result() {
        let mut summary = RunSummary::new(Some(1));

        summary.record_result(&ProcessingResult::Success {
            repository: "Azure/azure-sdk-for-python".to_string(),
            warned: false,
            pull_requests: vec![PrStatus::Created {
                number: 2,
                url: "https://example.com/pr".to_string(),
            }],
        });
        summary.record_result(&ProcessingResult::Success {
            repository: "Azure/azure-sdk-for-go".to_string(),
            warned: true,
            pull_requests: vec![PrStatus::Updated {
                number: 7,
                url: "https://example.com/pr/7".to_string(),
            }],
        });

        assert_eq!(summary.repositories_succeeded, 1);
        assert_eq!(summary.repositories_warned, 1);
        assert_eq!(summary.prs_created, 1);
        assert_eq!(summary.prs_updated, 1);
        assert!(summary.all_success());
    }

    #[test]
    fn failed_pull_request_is_a_failure() {
        let mut summary = RunSummary::new(None);
        summary.record_pull_request(&PrStatus::Merged {
            number: 1,
            url: "https://example.com/pr/1".to_string(),
        });
        summary.record_pull_request(&PrStatus::Failed {
            error: "merge conflict".to_string(),
        });

        assert_eq!(summary.prs_merged, 1);
        assert!(summary.has_failures());
    }

    #[test]
    fn failed_repository_counts_its_pull_requests() {
        let mut summary = RunSummary::new(Some(3));
        summary.record_result(&ProcessingResult::Failed {
            repository: "Azure/azure-sdk-for-js".to_string(),
            error: "Build failed".to_string(),
            pull_requests: vec![PrStatus::Created {
                number: 4,
                url: "https://example.com/pr/4".to_string(),
            }],
        });

        assert_eq!(summary.repositories_failed, 1);
        assert_eq!(summary.prs_created, 1);
        assert!(!summary.all_success());
    }

    #[test]
    fn serializes_camel_case_counts() {
        let mut summary = RunSummary::new(Some(2));
        summary.record_pull_request(&PrStatus::Closed {
            number: 9,
            url: "https://example.com/pr/9".to_string(),
        });

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["iteration"], 2);
        assert_eq!(json["prsClosed"], 1);
        assert_eq!(json["repositoriesFailed"], 0);
    }
}
