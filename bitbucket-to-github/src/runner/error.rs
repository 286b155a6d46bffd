//! Orchestrator error types.
//!
//! Only setup-level failures surface here: credential rejection or an
//! unreachable API before the run starts. Every per-item failure is caught
//! inside the runner and downgraded to a report entry.

use crate::bitbucket::SourceError;
use crate::github::TargetError;

/// Fatal errors that abort a run before or at its start.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Source connectivity or authentication failure.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Target connectivity or authentication failure.
    #[error(transparent)]
    Target(#[from] TargetError),
}
