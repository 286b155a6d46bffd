//! Aggregated run report.

use super::result::{MigrationResult, Outcome};
use std::fmt::Write as _;

/// Aggregated outcome of a migration run.
///
/// Append-only: results flow in through [`record`][Self::record] from a
/// single collector, so concurrent repository workers never write here
/// directly.
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    /// Every per-entity result, in processing order.
    pub results: Vec<MigrationResult>,

    /// Number of entities created on the target.
    pub created: usize,

    /// Number of entities skipped (dry-run or idempotent re-run).
    pub skipped: usize,

    /// Number of entities that failed.
    pub failed: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl MigrationReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Appends a result and updates the counters.
    pub fn record(&mut self, result: MigrationResult) {
        match &result.outcome {
            Outcome::Written { .. } => self.created += 1,
            Outcome::Skipped { .. } | Outcome::SkippedDryRun { .. } => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
        self.results.push(result);
    }

    /// Appends every result from an iterator.
    pub fn record_all(&mut self, results: impl IntoIterator<Item = MigrationResult>) {
        for result in results {
            self.record(result);
        }
    }

    /// Returns true if any entity failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Failed results, for the always-visible failure listing.
    pub fn failed_items(&self) -> impl Iterator<Item = &MigrationResult> {
        self.results.iter().filter(|r| r.is_failed())
    }

    /// Renders the human-readable table plus summary counts.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        if !self.results.is_empty() {
            let _ = writeln!(out, "{:<12} {:<28} RESULT", "STATUS", "ENTITY");
            for result in &self.results {
                let (status, detail) = match &result.outcome {
                    Outcome::Written { target_id } => ("written", format!("-> {target_id}")),
                    Outcome::Skipped { reason } => ("skipped", reason.clone()),
                    Outcome::SkippedDryRun { preview } => ("dry-run", preview.clone()),
                    Outcome::Failed { reason } => ("FAILED", reason.clone()),
                };
                let _ = writeln!(out, "{status:<12} {:<28} {detail}", result.source_id);
            }
            let _ = writeln!(out);
        }

        let mode = if self.dry_run { "dry run" } else { "live" };
        let _ = writeln!(out, "Mode: {mode}");
        let _ = writeln!(
            out,
            "Created: {}  Skipped: {}  Failed: {}",
            self.created, self.skipped, self.failed
        );

        // Failed items are always listed individually.
        if self.has_failures() {
            let _ = writeln!(out, "\nFailures:");
            for item in self.failed_items() {
                if let Outcome::Failed { reason } = &item.outcome {
                    let _ = writeln!(
                        out,
                        "  {} {}: {reason}",
                        item.kind.as_str(),
                        item.source_id
                    );
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::EntityKind;

    fn written(source_id: &str) -> MigrationResult {
        MigrationResult::new(
            EntityKind::Issue,
            source_id,
            Outcome::Written {
                target_id: "42".to_string(),
            },
        )
    }

    #[test]
    fn counts_each_outcome_once() {
        let mut report = MigrationReport::new(false);
        report.record(written("tool#1"));
        report.record(MigrationResult::new(
            EntityKind::Repository,
            "tool",
            Outcome::Skipped {
                reason: "already exists".to_string(),
            },
        ));
        report.record(MigrationResult::new(
            EntityKind::PullRequest,
            "tool!3",
            Outcome::Failed {
                reason: "missing branch".to_string(),
            },
        ));

        assert_eq!(report.created, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert!(report.has_failures());
    }

    #[test]
    fn dry_run_results_count_as_skipped() {
        let mut report = MigrationReport::new(true);
        report.record(MigrationResult::new(
            EntityKind::Issue,
            "tool#1",
            Outcome::SkippedDryRun {
                preview: "issue \"Crash\"".to_string(),
            },
        ));

        assert_eq!(report.skipped, 1);
        assert!(!report.has_failures());
    }

    #[test]
    fn render_always_lists_failures() {
        let mut report = MigrationReport::new(false);
        report.record(written("tool#1"));
        report.record(MigrationResult::new(
            EntityKind::Issue,
            "tool#5",
            Outcome::Failed {
                reason: "issue #5 has no author information".to_string(),
            },
        ));

        let rendered = report.render();
        assert!(rendered.contains("Created: 1  Skipped: 0  Failed: 1"));
        assert!(rendered.contains("tool#5: issue #5 has no author information"));
    }

    #[test]
    fn reports_with_identical_results_render_identically() {
        let mut a = MigrationReport::new(true);
        let mut b = MigrationReport::new(true);
        for report in [&mut a, &mut b] {
            report.record(MigrationResult::new(
                EntityKind::Repository,
                "tool",
                Outcome::SkippedDryRun {
                    preview: "repository tool".to_string(),
                },
            ));
        }

        assert_eq!(a.render(), b.render());
    }
}
