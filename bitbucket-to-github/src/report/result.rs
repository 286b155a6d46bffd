//! Per-entity migration result types.

use serde::Serialize;

/// The kind of entity a result refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Repository,
    Issue,
    PullRequest,
    Comment,
}

impl EntityKind {
    /// Short display name for report rendering.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::Issue => "issue",
            Self::PullRequest => "pull request",
            Self::Comment => "comment",
        }
    }
}

/// Final outcome of migrating one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Created on the target.
    Written {
        /// Identifier assigned by the target platform.
        target_id: String,
    },

    /// Not written: already present, cancelled, or blocked by a sibling
    /// failure.
    Skipped {
        /// Reason for skipping.
        reason: String,
    },

    /// Not written because dry-run mode is active. Carries the record that
    /// would have been sent, so verbose output is inspectable.
    SkippedDryRun {
        /// Summary of the suppressed write.
        preview: String,
    },

    /// The mapper or writer failed for this entity.
    Failed {
        /// Failure reason, including the causing error.
        reason: String,
    },
}

/// Outcome of migrating one source entity.
///
/// Every source entity produces exactly one of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationResult {
    /// What kind of entity this was.
    pub kind: EntityKind,

    /// Source-side identifier (e.g., "tool", "tool#12", "tool!4").
    pub source_id: String,

    /// What happened to it.
    pub outcome: Outcome,
}

impl MigrationResult {
    /// Creates a result for an entity.
    #[must_use]
    pub fn new(kind: EntityKind, source_id: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            kind,
            source_id: source_id.into(),
            outcome,
        }
    }

    /// Returns true for failed outcomes.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}
