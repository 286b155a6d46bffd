//! Migration orchestrator.
//!
//! Sequences reader -> mapper -> writer per repository, issue, pull request
//! and comment. Every unit of work moves through the [`state`] machine and
//! ends as exactly one report entry. Per-item failures never abort the
//! batch; only credential or connectivity failures at the start of a run
//! are fatal.

mod error;
mod state;

pub use error::RunnerError;
pub use state::{WorkItem, WorkState};

use crate::backend::{SourceReader, TargetWriter};
use crate::bitbucket::SourceError;
use crate::github::TargetError;
use crate::mapper::{self, MapError, TargetIssueState};
use crate::records::{CommentRecord, IssueRecord, PullRequestRecord, ReviewRecord};
use crate::report::{EntityKind, MigrationReport, MigrationResult};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

/// Configuration for a migration run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Whether to suppress all writer calls.
    dry_run: bool,
    /// Maximum repositories processed in parallel.
    concurrency: usize,
    /// Whether to mirror git content after creating a repository.
    mirror_content: bool,
    /// Set to request a graceful stop between items.
    cancel: Arc<AtomicBool>,
}

impl RunnerConfig {
    /// Creates a configuration with sequential processing and content
    /// mirroring enabled.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            concurrency: 1,
            mirror_content: true,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets how many repositories may run in parallel. Children within a
    /// repository always stay sequential.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Enables or disables git content mirroring.
    #[must_use]
    pub fn with_mirror_content(mut self, mirror_content: bool) -> Self {
        self.mirror_content = mirror_content;
        self
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the repository concurrency limit.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Shared flag that requests a graceful stop. New writer calls stop
    /// immediately; the in-flight call completes and is recorded.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }
}

/// How a unit of work should be finalized after mapping.
#[derive(Clone, Copy)]
enum Disposition<'a> {
    /// Map and write.
    Live,
    /// Map, then record the suppressed write.
    DryRun,
    /// Map, then skip with this reason (idempotent re-run, cancellation,
    /// or a failed parent).
    Skip(&'a str),
}

/// Orchestrates a migration run over injected reader and writer backends.
pub struct Runner<R, W> {
    reader: R,
    writer: W,
    config: RunnerConfig,
}

impl<R: SourceReader, W: TargetWriter> Runner<R, W> {
    /// Builds a runner from a reader, a writer and a configuration.
    pub fn new(reader: R, writer: W, config: RunnerConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    /// Returns the runner's configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Returns the source reader.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Returns the target writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Verifies both credentials without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when either platform rejects the
    /// credentials or is unreachable.
    pub async fn test_connections(&self) -> Result<(), RunnerError> {
        self.reader.test_connection().await?;
        self.writer.test_connection().await?;
        Ok(())
    }

    /// Migrates the named repositories, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] only for fatal setup failures; per-item
    /// failures land in the report.
    pub async fn migrate_repositories(
        &self,
        slugs: &[String],
    ) -> Result<MigrationReport, RunnerError> {
        self.test_connections().await?;

        let mut report = MigrationReport::new(self.config.dry_run);
        for slug in slugs {
            report.record_all(self.process_repository(slug).await);
        }
        Ok(report)
    }

    /// Migrates every repository in the source workspace.
    ///
    /// Repositories may run in parallel up to the configured limit; report
    /// aggregation stays in this single collector.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] only for fatal setup failures.
    pub async fn migrate_workspace(&self) -> Result<MigrationReport, RunnerError> {
        self.test_connections().await?;

        let repos = self.reader.list_repositories().await?;
        info!(count = repos.len(), "Migrating workspace");

        let all_results: Vec<Vec<MigrationResult>> = stream::iter(repos)
            .map(|repo| {
                let slug = repo.slug;
                async move { self.process_repository(&slug).await }
            })
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        let mut report = MigrationReport::new(self.config.dry_run);
        for results in all_results {
            report.record_all(results);
        }
        Ok(report)
    }

    fn cancelled(&self) -> bool {
        self.config.cancel.load(Ordering::SeqCst)
    }

    /// Migrates one repository and everything in it. Infallible by design:
    /// every outcome, including read failures, becomes a report entry.
    async fn process_repository(&self, slug: &str) -> Vec<MigrationResult> {
        let span = info_span!("migrate_repository", repo = slug);

        async {
            let mut results = Vec::new();

            if self.cancelled() {
                let mut item = WorkItem::new(EntityKind::Repository, slug);
                item.mark_mapped();
                item.mark_skipped("cancelled before start");
                results.push(item.into_result());
                return results;
            }

            // Read phase. A failure here yields one repository-level
            // entry; there is nothing else to enumerate.
            let read = self.read_repository(slug).await;
            let (repo, issues, prs, branches) = match read {
                Ok(parts) => parts,
                Err(e) => {
                    error!(error = %e, "Failed to read repository from source");
                    let mut item = WorkItem::new(EntityKind::Repository, slug);
                    item.mark_failed(e.to_string());
                    results.push(item.into_result());
                    return results;
                }
            };

            let mapped_repo = mapper::map_repository(&repo);
            let mut repo_item = WorkItem::new(EntityKind::Repository, slug);
            repo_item.mark_mapped();

            // Idempotent re-run: probe before creating.
            let exists = match self.writer.repository_exists(&mapped_repo.name).await {
                Ok(exists) => exists,
                Err(e) => {
                    error!(error = %e, "Failed to probe target repository");
                    repo_item.mark_failed(e.to_string());
                    results.push(repo_item.into_result());
                    self.finalize_children(
                        &mut results,
                        slug,
                        &issues,
                        &prs,
                        &branches,
                        Disposition::Skip("target repository state unknown"),
                    )
                    .await;
                    return results;
                }
            };

            if exists {
                info!("Repository already exists on target, skipping");
                repo_item.mark_skipped("already exists on target");
                results.push(repo_item.into_result());
                self.finalize_children(
                    &mut results,
                    slug,
                    &issues,
                    &prs,
                    &branches,
                    Disposition::Skip("target repository already exists"),
                )
                .await;
                return results;
            }

            if self.config.dry_run {
                repo_item.mark_dry_run(format!(
                    "would create repository '{}' ({} issues, {} pull requests)",
                    mapped_repo.name,
                    issues.len(),
                    prs.len()
                ));
                results.push(repo_item.into_result());
                self.finalize_children(
                    &mut results,
                    slug,
                    &issues,
                    &prs,
                    &branches,
                    Disposition::DryRun,
                )
                .await;
                return results;
            }

            match self.writer.create_repository(&mapped_repo).await {
                Ok(full_name) => {
                    if self.config.mirror_content {
                        let source_url = self.reader.authenticated_clone_url(slug);
                        if let Err(e) = self
                            .writer
                            .mirror_repository(&source_url, &mapped_repo.name)
                            .await
                        {
                            error!(error = %e, "Content mirroring failed");
                            repo_item.mark_failed(format!("content mirroring failed: {e}"));
                            results.push(repo_item.into_result());
                            self.finalize_children(
                                &mut results,
                                slug,
                                &issues,
                                &prs,
                                &branches,
                                Disposition::Skip("repository content migration failed"),
                            )
                            .await;
                            return results;
                        }

                        // The mirror push brings the branch over; only then
                        // can the target select it as the default.
                        if let Err(e) = self
                            .writer
                            .set_default_branch(&mapped_repo.name, &mapped_repo.default_branch)
                            .await
                        {
                            error!(error = %e, "Failed to select default branch");
                            repo_item
                                .mark_failed(format!("failed to select default branch: {e}"));
                            results.push(repo_item.into_result());
                            self.finalize_children(
                                &mut results,
                                slug,
                                &issues,
                                &prs,
                                &branches,
                                Disposition::Skip("repository setup failed"),
                            )
                            .await;
                            return results;
                        }
                    }
                    repo_item.mark_written(full_name);
                    results.push(repo_item.into_result());
                }
                Err(TargetError::AlreadyExists { .. }) => {
                    // Lost the race between probe and create; same skip as
                    // the probe path.
                    repo_item.mark_skipped("already exists on target");
                    results.push(repo_item.into_result());
                    self.finalize_children(
                        &mut results,
                        slug,
                        &issues,
                        &prs,
                        &branches,
                        Disposition::Skip("target repository already exists"),
                    )
                    .await;
                    return results;
                }
                Err(e) => {
                    error!(error = %e, "Repository creation failed");
                    repo_item.mark_failed(e.to_string());
                    results.push(repo_item.into_result());
                    self.finalize_children(
                        &mut results,
                        slug,
                        &issues,
                        &prs,
                        &branches,
                        Disposition::Skip("repository creation failed"),
                    )
                    .await;
                    return results;
                }
            }

            self.finalize_children(&mut results, slug, &issues, &prs, &branches, Disposition::Live)
                .await;
            results
        }
        .instrument(span)
        .await
    }

    async fn read_repository(
        &self,
        slug: &str,
    ) -> Result<
        (
            crate::records::RepositoryRecord,
            Vec<IssueRecord>,
            Vec<PullRequestRecord>,
            HashSet<String>,
        ),
        SourceError,
    > {
        let repo = self.reader.repository_details(slug).await?;
        let issues = self.reader.list_issues(slug).await?;
        let prs = self.reader.list_pull_requests(slug).await?;
        let branches: HashSet<String> =
            self.reader.list_branches(slug).await?.into_iter().collect();
        Ok((repo, issues, prs, branches))
    }

    /// Processes every issue and pull request of a repository under one
    /// disposition. Children stay strictly in source creation order, and
    /// comments in chronological order.
    async fn finalize_children(
        &self,
        results: &mut Vec<MigrationResult>,
        slug: &str,
        issues: &[IssueRecord],
        prs: &[PullRequestRecord],
        branches: &HashSet<String>,
        disposition: Disposition<'_>,
    ) {
        for issue in issues {
            let disposition = self.effective(disposition);
            results.extend(self.process_issue(slug, issue, disposition).await);
        }
        for pr in prs {
            let disposition = self.effective(disposition);
            results.extend(self.process_pull_request(slug, pr, branches, disposition).await);
        }
    }

    /// Downgrades a live disposition to a skip once cancellation is
    /// requested, so no new writer calls are issued.
    fn effective<'a>(&self, disposition: Disposition<'a>) -> Disposition<'a> {
        match disposition {
            Disposition::Live if self.cancelled() => Disposition::Skip("cancelled"),
            other => other,
        }
    }

    async fn process_issue(
        &self,
        slug: &str,
        issue: &IssueRecord,
        disposition: Disposition<'_>,
    ) -> Vec<MigrationResult> {
        let source_id = format!("{slug}#{}", issue.id);
        let mut results = Vec::new();
        let mut item = WorkItem::new(EntityKind::Issue, &source_id);

        let mapped = match mapper::map_issue(issue) {
            Ok(mapped) => {
                item.mark_mapped();
                mapped
            }
            Err(e) => {
                warn!(issue = %source_id, error = %e, "Issue mapping failed");
                item.mark_failed(e.to_string());
                results.push(item.into_result());
                self.finalize_comments(
                    &mut results,
                    &source_id,
                    "issue",
                    issue.id,
                    &issue.comments,
                    None,
                    Disposition::Skip("parent issue failed"),
                )
                .await;
                return results;
            }
        };

        let parent_number = match disposition {
            Disposition::Live => match self.writer.create_issue(slug, &mapped).await {
                Ok(number) => {
                    item.mark_written(number.to_string());
                    Some(number)
                }
                Err(e) => {
                    warn!(issue = %source_id, error = %e, "Issue creation failed");
                    item.mark_failed(e.to_string());
                    results.push(item.into_result());
                    self.finalize_comments(
                        &mut results,
                        &source_id,
                        "issue",
                        issue.id,
                        &issue.comments,
                        None,
                        Disposition::Skip("parent issue failed"),
                    )
                    .await;
                    return results;
                }
            },
            Disposition::DryRun => {
                let state = match mapped.state {
                    TargetIssueState::Open => "open",
                    TargetIssueState::Closed => "closed",
                };
                item.mark_dry_run(format!("would create issue \"{}\" [{state}]", mapped.title));
                None
            }
            Disposition::Skip(reason) => {
                item.mark_skipped(reason);
                None
            }
        };
        results.push(item.into_result());

        self.finalize_comments(
            &mut results,
            &source_id,
            "issue",
            issue.id,
            &issue.comments,
            parent_number.map(|n| (slug, n)),
            disposition,
        )
        .await;
        results
    }

    async fn process_pull_request(
        &self,
        slug: &str,
        pr: &PullRequestRecord,
        branches: &HashSet<String>,
        disposition: Disposition<'_>,
    ) -> Vec<MigrationResult> {
        let source_id = format!("{slug}!{}", pr.id);
        let mut results = Vec::new();
        let mut item = WorkItem::new(EntityKind::PullRequest, &source_id);

        let mapped = match mapper::map_pull_request(pr, branches) {
            Ok(mapped) => {
                item.mark_mapped();
                mapped
            }
            Err(e) => {
                let reason = match &e {
                    MapError::MissingBranch { .. } => {
                        format!("invalid branch reference: {e}")
                    }
                    _ => e.to_string(),
                };
                warn!(pull_request = %source_id, error = %e, "Pull request mapping failed");
                item.mark_failed(reason);
                results.push(item.into_result());
                self.finalize_pr_children(
                    &mut results,
                    &source_id,
                    pr,
                    None,
                    Disposition::Skip("parent pull request failed"),
                )
                .await;
                return results;
            }
        };

        let parent_number = match disposition {
            Disposition::Live => match self.writer.create_pull_request(slug, &mapped).await {
                Ok(number) => {
                    item.mark_written(number.to_string());
                    Some(number)
                }
                Err(e) => {
                    warn!(pull_request = %source_id, error = %e, "Pull request creation failed");
                    item.mark_failed(e.to_string());
                    results.push(item.into_result());
                    self.finalize_pr_children(
                        &mut results,
                        &source_id,
                        pr,
                        None,
                        Disposition::Skip("parent pull request failed"),
                    )
                    .await;
                    return results;
                }
            },
            Disposition::DryRun => {
                item.mark_dry_run(format!(
                    "would open pull request \"{}\" ({} -> {})",
                    mapped.title, mapped.head, mapped.base
                ));
                None
            }
            Disposition::Skip(reason) => {
                item.mark_skipped(reason);
                None
            }
        };
        results.push(item.into_result());

        self.finalize_pr_children(
            &mut results,
            &source_id,
            pr,
            parent_number.map(|n| (slug, n)),
            disposition,
        )
        .await;
        results
    }

    async fn finalize_pr_children(
        &self,
        results: &mut Vec<MigrationResult>,
        source_id: &str,
        pr: &PullRequestRecord,
        parent: Option<(&str, u64)>,
        disposition: Disposition<'_>,
    ) {
        self.finalize_comments(
            results,
            source_id,
            "pull request",
            pr.id,
            &pr.comments,
            parent,
            disposition,
        )
        .await;
        self.finalize_reviews(results, source_id, pr.id, &pr.reviews, parent, disposition)
            .await;
    }

    /// Comments migrate strictly in their original chronological order;
    /// the target renders them in creation order and reordering would
    /// corrupt the visible history.
    async fn finalize_comments(
        &self,
        results: &mut Vec<MigrationResult>,
        source_id: &str,
        entity: &'static str,
        parent_source_id: u64,
        comments: &[CommentRecord],
        parent: Option<(&str, u64)>,
        disposition: Disposition<'_>,
    ) {
        for (index, comment) in comments.iter().enumerate() {
            let comment_id = format!("{source_id}/comment-{}", index + 1);
            let mut item = WorkItem::new(EntityKind::Comment, &comment_id);

            match mapper::map_comment(entity, parent_source_id, comment) {
                Ok(mapped) => {
                    item.mark_mapped();
                    self.finalize_comment_write(&mut item, &mapped, parent, disposition)
                        .await;
                }
                Err(e) => item.mark_failed(e.to_string()),
            }
            results.push(item.into_result());
        }
    }

    /// Review entries degrade to tagged comments appended after the
    /// regular comments.
    async fn finalize_reviews(
        &self,
        results: &mut Vec<MigrationResult>,
        source_id: &str,
        pr_id: u64,
        reviews: &[ReviewRecord],
        parent: Option<(&str, u64)>,
        disposition: Disposition<'_>,
    ) {
        for (index, review) in reviews.iter().enumerate() {
            let review_id = format!("{source_id}/review-{}", index + 1);
            let mut item = WorkItem::new(EntityKind::Comment, &review_id);

            match mapper::map_review(pr_id, review) {
                Ok(mapped) => {
                    item.mark_mapped();
                    self.finalize_comment_write(&mut item, &mapped, parent, disposition)
                        .await;
                }
                Err(e) => item.mark_failed(e.to_string()),
            }
            results.push(item.into_result());
        }
    }

    async fn finalize_comment_write(
        &self,
        item: &mut WorkItem,
        mapped: &mapper::MappedComment,
        parent: Option<(&str, u64)>,
        disposition: Disposition<'_>,
    ) {
        match disposition {
            Disposition::Live => {
                // A live disposition without a written parent would orphan
                // the comment; the callers guarantee the pair.
                let Some((slug, number)) = parent else {
                    item.mark_skipped("parent was not written");
                    return;
                };
                match self.writer.create_comment(slug, number, mapped).await {
                    Ok(id) => item.mark_written(id.to_string()),
                    Err(e) => item.mark_failed(e.to_string()),
                }
            }
            Disposition::DryRun => {
                let first_line = mapped.body.lines().next().unwrap_or_default();
                item.mark_dry_run(format!("would append comment: {first_line}"));
            }
            Disposition::Skip(reason) => item.mark_skipped(reason),
        }
    }
}
