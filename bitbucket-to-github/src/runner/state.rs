//! Per-unit work state machine.
//!
//! Each unit of work (repository, issue, pull request, comment) moves
//! through `Pending -> Mapped -> (Skipped | Written | Failed)`. Keeping the
//! transitions explicit here lets the retry/skip/fail logic be tested
//! without any network.

use crate::report::{EntityKind, MigrationResult, Outcome};

/// Lifecycle state of one unit of work.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkState {
    /// Not yet mapped.
    Pending,

    /// Mapping succeeded; no write decision made yet.
    Mapped,

    /// Terminal: not written (already exists, cancelled, or blocked by a
    /// failed parent).
    Skipped { reason: String },

    /// Terminal: not written because dry-run mode suppressed the call.
    DryRun { preview: String },

    /// Terminal: created on the target.
    Written { target_id: String },

    /// Terminal: mapper or writer failed.
    Failed { reason: String },
}

impl WorkState {
    /// Returns true once the unit has reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Mapped)
    }
}

/// One unit of work tracked through the state machine.
#[derive(Debug, Clone)]
pub struct WorkItem {
    kind: EntityKind,
    source_id: String,
    state: WorkState,
}

impl WorkItem {
    /// Creates a pending unit.
    #[must_use]
    pub fn new(kind: EntityKind, source_id: impl Into<String>) -> Self {
        Self {
            kind,
            source_id: source_id.into(),
            state: WorkState::Pending,
        }
    }

    /// Current state, for assertions and logging.
    #[must_use]
    pub fn state(&self) -> &WorkState {
        &self.state
    }

    /// `Pending -> Mapped`.
    pub fn mark_mapped(&mut self) {
        debug_assert_eq!(self.state, WorkState::Pending);
        self.state = WorkState::Mapped;
    }

    /// `Mapped -> Skipped`.
    pub fn mark_skipped(&mut self, reason: impl Into<String>) {
        debug_assert_eq!(self.state, WorkState::Mapped);
        self.state = WorkState::Skipped {
            reason: reason.into(),
        };
    }

    /// `Mapped -> Skipped` flavored for dry-run, carrying the suppressed
    /// record so verbose output is inspectable.
    pub fn mark_dry_run(&mut self, preview: impl Into<String>) {
        debug_assert_eq!(self.state, WorkState::Mapped);
        self.state = WorkState::DryRun {
            preview: preview.into(),
        };
    }

    /// `Mapped -> Written`.
    pub fn mark_written(&mut self, target_id: impl Into<String>) {
        debug_assert_eq!(self.state, WorkState::Mapped);
        self.state = WorkState::Written {
            target_id: target_id.into(),
        };
    }

    /// `Pending -> Failed` or `Mapped -> Failed`.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        debug_assert!(!self.state.is_terminal());
        self.state = WorkState::Failed {
            reason: reason.into(),
        };
    }

    /// Finalizes the unit into its report entry.
    ///
    /// A unit that never reached a terminal state is reported as failed;
    /// the orchestrator always finalizes explicitly, so this path only
    /// guards against bugs.
    #[must_use]
    pub fn into_result(self) -> MigrationResult {
        let outcome = match self.state {
            WorkState::Written { target_id } => Outcome::Written { target_id },
            WorkState::Skipped { reason } => Outcome::Skipped { reason },
            WorkState::DryRun { preview } => Outcome::SkippedDryRun { preview },
            WorkState::Failed { reason } => Outcome::Failed { reason },
            WorkState::Pending | WorkState::Mapped => Outcome::Failed {
                reason: "processing did not complete".to_string(),
            },
        };
        MigrationResult::new(self.kind, self.source_id, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_path() {
        let mut item = WorkItem::new(EntityKind::Issue, "tool#1");
        assert!(!item.state().is_terminal());

        item.mark_mapped();
        assert_eq!(item.state(), &WorkState::Mapped);

        item.mark_written("42");
        assert!(item.state().is_terminal());

        let result = item.into_result();
        assert_eq!(
            result.outcome,
            Outcome::Written {
                target_id: "42".to_string()
            }
        );
    }

    #[test]
    fn skip_requires_successful_mapping() {
        let mut item = WorkItem::new(EntityKind::Repository, "tool");
        item.mark_mapped();
        item.mark_skipped("already exists on target");

        assert_eq!(
            item.into_result().outcome,
            Outcome::Skipped {
                reason: "already exists on target".to_string()
            }
        );
    }

    #[test]
    fn failure_is_reachable_from_pending() {
        let mut item = WorkItem::new(EntityKind::PullRequest, "tool!3");
        item.mark_failed("unrecognized state");

        assert_eq!(
            item.into_result().outcome,
            Outcome::Failed {
                reason: "unrecognized state".to_string()
            }
        );
    }

    #[test]
    fn dry_run_carries_the_suppressed_record() {
        let mut item = WorkItem::new(EntityKind::Issue, "tool#1");
        item.mark_mapped();
        item.mark_dry_run("would create issue \"Crash\"");

        assert_eq!(
            item.into_result().outcome,
            Outcome::SkippedDryRun {
                preview: "would create issue \"Crash\"".to_string()
            }
        );
    }

    #[test]
    fn unfinalized_unit_reports_as_failed() {
        let item = WorkItem::new(EntityKind::Comment, "tool#1/comment-1");
        assert!(matches!(item.into_result().outcome, Outcome::Failed { .. }));
    }
}
