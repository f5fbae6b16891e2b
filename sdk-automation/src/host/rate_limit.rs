//! Core API budget tracking for [`GitHubHost`](super::GitHubHost).
//!
//! Pull request, label, comment and ref calls all draw from the core
//! budget. Before each call the host asks the gate, which sleeps until the
//! window resets when only a handful of requests are left.

use octocrab::Octocrab;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Longest sleep before giving the call a chance anyway.
const MAX_WAIT: Duration = Duration::from_secs(3600);

/// Remaining requests below which calls wait for the reset.
const LOW_WATERMARK: u32 = 5;

/// Snapshot of the core budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreBudget {
    pub remaining: u32,
    pub limit: u32,
    /// Unix timestamp (seconds) when the window resets.
    pub reset_at: u64,
}

impl CoreBudget {
    /// How long to sleep at `now` (Unix seconds), if at all.
    #[must_use]
    pub fn backoff(&self, now: u64) -> Option<Duration> {
        if self.remaining >= LOW_WATERMARK || self.reset_at <= now {
            return None;
        }

        let until_reset = Duration::from_secs(self.reset_at - now);
        if until_reset > MAX_WAIT {
            warn!(
                wait_secs = until_reset.as_secs(),
                max_wait_secs = MAX_WAIT.as_secs(),
                "Core rate limit resets too far ahead, capping the wait"
            );
        }
        Some(until_reset.min(MAX_WAIT))
    }
}

/// Fetches the current core budget.
///
/// # Errors
///
/// Returns the octocrab error if the rate limit endpoint fails.
pub async fn core_budget(octocrab: &Octocrab) -> Result<CoreBudget, octocrab::Error> {
    let core = octocrab.ratelimit().get().await?.resources.core;

    Ok(CoreBudget {
        remaining: u32::try_from(core.remaining).unwrap_or(u32::MAX),
        limit: u32::try_from(core.limit).unwrap_or(u32::MAX),
        reset_at: core.reset,
    })
}

/// Sleeps until the core window resets when the budget runs low.
///
/// # Errors
///
/// Returns the octocrab error if the budget cannot be read.
pub async fn ensure_core_rate_limit(octocrab: &Octocrab) -> Result<(), octocrab::Error> {
    let budget = core_budget(octocrab).await?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    if let Some(wait) = budget.backoff(now) {
        info!(
            remaining = budget.remaining,
            limit = budget.limit,
            wait_secs = wait.as_secs(),
            "Core rate limit low, waiting for reset"
        );
        tokio::time::sleep(wait).await;
    }
    Ok(())
}
