//! Target API error types.

use crate::mirror::MirrorError;
use thiserror::Error;

/// Errors that can occur while writing to the target organization.
#[derive(Debug, Error)]
pub enum TargetError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),

    /// Credentials or organization access were rejected. Fatal: the run
    /// aborts before any writes.
    #[error("GitHub authentication failed: {0}")]
    Authentication(String),

    /// Git content mirroring into the target repository failed.
    #[error(transparent)]
    Mirror(#[from] MirrorError),

    /// A repository of that name already exists. The orchestrator treats
    /// this as a skip on idempotent re-runs.
    #[error("Repository '{name}' already exists in the organization")]
    AlreadyExists { name: String },

    /// The pull request's head or base branch is absent on the target.
    /// A documented, irreversible limitation: never retried, and no branch
    /// is ever fabricated.
    #[error("Branch '{branch}' does not exist on '{repo}'")]
    InvalidBranchReference { repo: String, branch: String },
}
