//! Pull request label state machine.
//!
//! Every engine-owned pull request carries a role label (`GenerationPR` or
//! `IntegrationPR`) and exactly one phase label mirroring the specification
//! pull request: `SpecPRInProgress`, `SpecPRClosed` or `SpecPRMerged`.

mod apply;

pub use apply::apply_labels;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Labels managed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "GenerationPR")]
    GenerationPr,
    #[serde(rename = "IntegrationPR")]
    IntegrationPr,
    #[serde(rename = "SpecPRInProgress")]
    SpecPrInProgress,
    #[serde(rename = "SpecPRClosed")]
    SpecPrClosed,
    #[serde(rename = "SpecPRMerged")]
    SpecPrMerged,
}

impl Label {
    /// Phase labels, at most one of which is present at a time.
    pub const PHASES: [Label; 3] = [
        Label::SpecPrInProgress,
        Label::SpecPrClosed,
        Label::SpecPrMerged,
    ];

    /// Returns the label name as it appears on the host.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GenerationPr => "GenerationPR",
            Self::IntegrationPr => "IntegrationPR",
            Self::SpecPrInProgress => "SpecPRInProgress",
            Self::SpecPrClosed => "SpecPRClosed",
            Self::SpecPrMerged => "SpecPRMerged",
        }
    }

    /// Color used when the label has to be created.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::GenerationPr => "0e8a16",
            Self::IntegrationPr => "1d76db",
            Self::SpecPrInProgress => "fbca04",
            Self::SpecPrClosed => "b60205",
            Self::SpecPrMerged => "5319e7",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle phase of the specification pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecPhase {
    /// Opened or synchronized.
    InProgress,
    /// Closed without merge.
    Closed,
    /// Closed with merge.
    Merged,
}

impl SpecPhase {
    #[must_use]
    pub fn label(self) -> Label {
        match self {
            Self::InProgress => Label::SpecPrInProgress,
            Self::Closed => Label::SpecPrClosed,
            Self::Merged => Label::SpecPrMerged,
        }
    }
}

/// Which engine-owned pull request is being labeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestRole {
    Generation,
    Integration,
}

impl PullRequestRole {
    #[must_use]
    pub fn label(self) -> Label {
        match self {
            Self::Generation => Label::GenerationPr,
            Self::Integration => Label::IntegrationPr,
        }
    }
}

/// Labels to add and remove.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDelta {
    pub add: Vec<Label>,
    pub remove: Vec<Label>,
}

impl LabelDelta {
    /// Returns true when nothing changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

impl fmt::Display for LabelDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .add
            .iter()
            .map(|label| format!("+{label}"))
            .chain(self.remove.iter().map(|label| format!("-{label}")))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Computes the minimal change that gives a pull request its role label and
/// the label of `phase`.
#[must_use]
pub fn compute_label_delta(
    current: &[String],
    role: PullRequestRole,
    phase: SpecPhase,
) -> LabelDelta {
    let has = |label: Label| current.iter().any(|name| name == label.as_str());
    let mut delta = LabelDelta::default();

    if !has(role.label()) {
        delta.add.push(role.label());
    }
    let target = phase.label();
    if !has(target) {
        delta.add.push(target);
    }
    delta.remove = Label::PHASES
        .into_iter()
        .filter(|label| *label != target && has(*label))
        .collect();

    delta
}
