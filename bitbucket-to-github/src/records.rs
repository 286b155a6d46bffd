//! Typed entity records read from the source workspace.
//!
//! Every record is built once at the reader boundary from the raw API
//! response and never mutated afterwards. State fields keep the raw source
//! string; normalization to GitHub semantics happens in the mapper so that
//! an unrecognized state becomes a per-item mapping failure instead of a
//! silent default.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A repository in the source workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryRecord {
    /// URL-safe repository identifier (e.g., "my-repo").
    pub slug: String,

    /// Display name of the repository.
    pub name: String,

    /// Repository description, empty when the source has none.
    pub description: String,

    /// Default branch name (e.g., "main").
    pub default_branch: String,

    /// Whether the repository is private.
    pub is_private: bool,

    /// HTTPS clone URL without credentials.
    pub clone_url: String,
}

/// A single comment on an issue or pull request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    /// Display name of the comment author, if the source exposed one.
    pub author: Option<String>,

    /// Raw comment body.
    pub body: String,

    /// When the comment was posted.
    pub created_on: DateTime<Utc>,
}

/// An issue with its comments, ordered chronologically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueRecord {
    /// Source issue id.
    pub id: u64,

    /// Issue title.
    pub title: String,

    /// Raw issue body, empty when the source has none.
    pub body: String,

    /// Display name of the reporter, if the source exposed one.
    pub reporter: Option<String>,

    /// Link to the issue on the source platform.
    pub link: String,

    /// Raw source state (e.g., "new", "resolved", "on hold").
    pub state: String,

    /// When the issue was created.
    pub created_on: DateTime<Utc>,

    /// When the issue was last updated, if known.
    pub updated_on: Option<DateTime<Utc>>,

    /// Comments in original chronological order.
    pub comments: Vec<CommentRecord>,
}

/// A review or approval entry attached to a pull request.
///
/// The target platform cannot represent source approvals directly, so these
/// degrade to tagged comments during mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRecord {
    /// Display name of the reviewer, if the source exposed one.
    pub author: Option<String>,

    /// Raw review state ("approved", "changes_requested", ...).
    pub state: String,
}

/// A pull request with its comments and review entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullRequestRecord {
    /// Source pull request id.
    pub id: u64,

    /// Pull request title.
    pub title: String,

    /// Raw description, empty when the source has none.
    pub body: String,

    /// Display name of the author, if the source exposed one.
    pub author: Option<String>,

    /// Link to the pull request on the source platform.
    pub link: String,

    /// Branch the pull request merges from.
    pub source_branch: String,

    /// Branch the pull request merges into.
    pub target_branch: String,

    /// Raw source state (e.g., "OPEN").
    pub state: String,

    /// When the pull request was created.
    pub created_on: DateTime<Utc>,

    /// Comments in original chronological order.
    pub comments: Vec<CommentRecord>,

    /// Review and approval entries.
    pub reviews: Vec<ReviewRecord>,
}
