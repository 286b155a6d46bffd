//! Reader/writer capability traits.
//!
//! The orchestrator talks to the source and target platforms only through
//! these traits, so the retry/skip/fail logic can be exercised against fake
//! implementations without any network.

use crate::bitbucket::SourceError;
use crate::github::TargetError;
use crate::mapper::{MappedComment, MappedIssue, MappedPullRequest, MappedRepository};
use crate::records::{IssueRecord, PullRequestRecord, RepositoryRecord};
use async_trait::async_trait;

/// Read-only operations against the source workspace.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Verifies credentials and reachability without reading anything else.
    async fn test_connection(&self) -> Result<(), SourceError>;

    /// Lists every repository in the workspace.
    async fn list_repositories(&self) -> Result<Vec<RepositoryRecord>, SourceError>;

    /// Fetches one repository by slug.
    async fn repository_details(&self, slug: &str) -> Result<RepositoryRecord, SourceError>;

    /// Lists the repository's current branch names.
    async fn list_branches(&self, slug: &str) -> Result<Vec<String>, SourceError>;

    /// Lists issues with their comments, in source creation order.
    async fn list_issues(&self, slug: &str) -> Result<Vec<IssueRecord>, SourceError>;

    /// Lists open pull requests with their comments, in source creation
    /// order.
    async fn list_pull_requests(&self, slug: &str)
        -> Result<Vec<PullRequestRecord>, SourceError>;

    /// Clone URL with credentials embedded, for git mirroring.
    fn authenticated_clone_url(&self, slug: &str) -> String;
}

/// Write operations against the target organization.
#[async_trait]
pub trait TargetWriter: Send + Sync {
    /// Verifies credentials and organization access without writing.
    async fn test_connection(&self) -> Result<(), TargetError>;

    /// Returns whether a repository of that name already exists.
    async fn repository_exists(&self, name: &str) -> Result<bool, TargetError>;

    /// Creates a repository, returning its full name.
    async fn create_repository(&self, repo: &MappedRepository) -> Result<String, TargetError>;

    /// Mirrors every git ref from the source clone URL into the named
    /// repository.
    async fn mirror_repository(&self, source_url: &str, name: &str) -> Result<(), TargetError>;

    /// Selects the repository's default branch. The branch must already
    /// exist, so this runs after content mirroring.
    async fn set_default_branch(&self, repo: &str, branch: &str) -> Result<(), TargetError>;

    /// Creates an issue, returning its number. A closed mapped state is
    /// applied after creation.
    async fn create_issue(&self, repo: &str, issue: &MappedIssue) -> Result<u64, TargetError>;

    /// Appends a comment to an issue or pull request, returning the comment
    /// id. Issues and pull requests share one number space on the target.
    async fn create_comment(
        &self,
        repo: &str,
        parent_number: u64,
        comment: &MappedComment,
    ) -> Result<u64, TargetError>;

    /// Creates a pull request, returning its number.
    async fn create_pull_request(
        &self,
        repo: &str,
        pr: &MappedPullRequest,
    ) -> Result<u64, TargetError>;
}
