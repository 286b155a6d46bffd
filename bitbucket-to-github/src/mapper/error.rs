//! Mapping error types.

use thiserror::Error;

/// Errors produced while translating a source record.
///
/// Every variant is a per-item failure: the orchestrator records it and
/// moves on to the next sibling, it never aborts the batch.
#[derive(Debug, Error)]
pub enum MapError {
    /// The pull request references a branch that no longer exists in the
    /// source repository, so it cannot be recreated.
    #[error("pull request #{id} references missing source branch '{branch}'")]
    MissingBranch { id: u64, branch: String },

    /// The record carries no author where one is required for provenance.
    #[error("{entity} #{id} has no author information")]
    MissingAuthor { entity: &'static str, id: u64 },

    /// The source state string is not one this tool knows how to translate.
    #[error("issue #{id} has unrecognized state '{state}'")]
    UnknownState { id: u64, state: String },

    /// The record title is empty; the target platform rejects titleless
    /// issues and pull requests.
    #[error("{entity} #{id} has an empty title")]
    EmptyTitle { entity: &'static str, id: u64 },
}
