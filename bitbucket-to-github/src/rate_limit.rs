//! Rate limiting for GitHub write calls.
//!
//! All writes funnel through one octocrab client, so the limit state here
//! is shared across every worker by construction. Before a write the
//! remaining core-API budget is checked and, when low, the call waits for
//! the reset window instead of tripping the hard limit.

use octocrab::Octocrab;
use std::time::Duration;
use tracing::{info, warn};

/// Maximum time to wait for a rate limit reset (1 hour).
const MAX_WAIT_SECS: u64 = 3600;

/// Minimum remaining requests before proactively waiting.
const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Fallback wait when the remote throttles without a usable reset time.
const DEFAULT_THROTTLE_WAIT_SECS: u64 = 60;

/// Core-API rate limit snapshot.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the rate limit resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,
}

/// Checks the current core-API rate limit (repos, issues, PRs, comments).
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub async fn check_core_rate_limit(octocrab: &Octocrab) -> Result<RateLimitInfo, octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let core = &rate_limit.resources.core;

    Ok(RateLimitInfo {
        remaining: core.remaining as u32,
        reset: core.reset,
        limit: core.limit as u32,
    })
}

/// Waits if the remaining budget is low, returning true if we waited.
pub async fn wait_if_needed(info: &RateLimitInfo) -> bool {
    if info.remaining >= MIN_REMAINING_THRESHOLD {
        return false;
    }

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    if info.reset <= now {
        return false;
    }

    let wait_secs = info.reset - now;
    if wait_secs > MAX_WAIT_SECS {
        warn!(
            wait_secs,
            max_wait = MAX_WAIT_SECS,
            "Rate limit reset too far in future, capping wait time"
        );
    }

    let actual_wait = wait_secs.min(MAX_WAIT_SECS);
    info!(
        remaining = info.remaining,
        wait_secs = actual_wait,
        "Rate limit low, waiting for reset"
    );

    tokio::time::sleep(Duration::from_secs(actual_wait)).await;
    true
}

/// Ensures sufficient core-API budget before a write call.
///
/// # Errors
///
/// Returns an error if the rate limit check fails.
pub async fn ensure_core_rate_limit(octocrab: &Octocrab) -> Result<(), octocrab::Error> {
    let info = check_core_rate_limit(octocrab).await?;
    wait_if_needed(&info).await;
    Ok(())
}

/// Blocks until the remote's reset window elapses after a throttle response.
///
/// Used by the writer between a throttled call and its single retry. Falls
/// back to a fixed wait when the reset timestamp is unusable.
pub async fn wait_for_reset(octocrab: &Octocrab) {
    let wait_secs = match check_core_rate_limit(octocrab).await {
        Ok(info) => {
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            info.reset.saturating_sub(now)
        }
        Err(e) => {
            warn!(error = %e, "Could not read reset window, using fallback wait");
            DEFAULT_THROTTLE_WAIT_SECS
        }
    };

    let actual_wait = wait_secs.clamp(1, MAX_WAIT_SECS);
    info!(wait_secs = actual_wait, "Throttled by remote, waiting for reset");
    tokio::time::sleep(Duration::from_secs(actual_wait)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_wait_with_healthy_budget() {
        let info = RateLimitInfo {
            remaining: 100,
            reset: 0,
            limit: 5000,
        };

        let waited = wait_if_needed(&info).await;
        assert!(!waited);
    }

    #[tokio::test]
    async fn no_wait_when_reset_already_passed() {
        let info = RateLimitInfo {
            remaining: 1,
            reset: 0, // Already passed
            limit: 5000,
        };

        let waited = wait_if_needed(&info).await;
        assert!(!waited);
    }
}
