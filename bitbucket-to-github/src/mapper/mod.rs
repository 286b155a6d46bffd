//! Translation from source records to target entities.
//!
//! Pure functions, no I/O. Each function returns a typed result; a failure
//! here is a per-item report entry for the orchestrator, never a batch
//! abort. Authorship and source state cannot be carried over natively, so
//! every mapped body gets a provenance annotation instead. The policy is
//! always annotate, never discard.

mod error;

pub use error::MapError;

use crate::records::{
    CommentRecord, IssueRecord, PullRequestRecord, RepositoryRecord, ReviewRecord,
};
use std::collections::HashSet;

/// Label applied to every migrated issue.
pub const MIGRATED_LABEL: &str = "migrated-from-bitbucket";

/// Source states that translate to an open target issue.
const OPEN_LIKE_STATES: &[&str] = &["new", "open", "on hold"];

/// Source states that translate to a closed target issue.
const CLOSED_LIKE_STATES: &[&str] = &["resolved", "closed", "wontfix", "duplicate", "invalid"];

/// Issue state on the target platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetIssueState {
    Open,
    Closed,
}

/// A repository ready to be created on the target.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRepository {
    pub name: String,
    pub description: String,
    pub private: bool,
    pub default_branch: String,
}

/// An issue ready to be created on the target.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub state: TargetIssueState,
}

/// A comment ready to be appended to a target issue or pull request.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedComment {
    pub body: String,
}

/// A pull request ready to be created on the target.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

/// Maps a source repository to its target shape.
pub fn map_repository(record: &RepositoryRecord) -> MappedRepository {
    MappedRepository {
        name: record.slug.clone(),
        description: record.description.clone(),
        private: record.is_private,
        default_branch: record.default_branch.clone(),
    }
}

/// Translates a raw source issue state to the target state.
///
/// Open-like states stay open; every closed-like state collapses to closed.
/// The original string is preserved by the caller as a label and body
/// annotation, so no information is lost in the collapse.
///
/// # Errors
///
/// Returns [`MapError::UnknownState`] for states outside the known set.
pub fn map_issue_state(id: u64, raw: &str) -> Result<TargetIssueState, MapError> {
    let normalized = raw.trim().to_lowercase();
    if OPEN_LIKE_STATES.contains(&normalized.as_str()) {
        Ok(TargetIssueState::Open)
    } else if CLOSED_LIKE_STATES.contains(&normalized.as_str()) {
        Ok(TargetIssueState::Closed)
    } else {
        Err(MapError::UnknownState {
            id,
            state: raw.to_string(),
        })
    }
}

/// Maps a source issue to its target shape.
///
/// The body is prefixed with a provenance header naming the original
/// reporter, link and state. The original state also becomes a label next
/// to [`MIGRATED_LABEL`].
///
/// # Errors
///
/// Returns [`MapError`] on a missing reporter, empty title or unknown
/// state.
pub fn map_issue(record: &IssueRecord) -> Result<MappedIssue, MapError> {
    if record.title.trim().is_empty() {
        return Err(MapError::EmptyTitle {
            entity: "issue",
            id: record.id,
        });
    }

    let reporter = record
        .reporter
        .as_deref()
        .ok_or(MapError::MissingAuthor {
            entity: "issue",
            id: record.id,
        })?;

    let state = map_issue_state(record.id, &record.state)?;

    let body = format!(
        "Migrated from Bitbucket\n\
         Original reporter: {reporter}\n\
         Original link: {link}\n\
         Original state: {source_state}\n\
         \n\
         {body}",
        link = record.link,
        source_state = record.state,
        body = record.body,
    );

    Ok(MappedIssue {
        title: record.title.clone(),
        body,
        labels: vec![MIGRATED_LABEL.to_string(), record.state.clone()],
        state,
    })
}

/// Maps a source comment to a target comment.
///
/// The target platform cannot impersonate the original author, so the body
/// carries a provenance line instead.
///
/// # Errors
///
/// Returns [`MapError::MissingAuthor`] when the source comment has no
/// author.
pub fn map_comment(
    entity: &'static str,
    parent_id: u64,
    record: &CommentRecord,
) -> Result<MappedComment, MapError> {
    let author = record.author.as_deref().ok_or(MapError::MissingAuthor {
        entity,
        id: parent_id,
    })?;

    Ok(MappedComment {
        body: format!(
            "> originally posted by {author} on {timestamp}\n\n{body}",
            timestamp = record.created_on.to_rfc3339(),
            body = record.body,
        ),
    })
}

/// Degrades a review or approval entry to a tagged comment.
///
/// GitHub's review-state API cannot represent source approvals on a
/// migrated pull request, so each entry becomes a
/// `[review:...] by {author}` comment.
///
/// # Errors
///
/// Returns [`MapError::MissingAuthor`] when the entry has no author.
pub fn map_review(pr_id: u64, record: &ReviewRecord) -> Result<MappedComment, MapError> {
    let author = record.author.as_deref().ok_or(MapError::MissingAuthor {
        entity: "review",
        id: pr_id,
    })?;

    let tag = match record.state.trim().to_lowercase().as_str() {
        "approved" => "approved",
        "changes_requested" => "changes_requested",
        _ => "commented",
    };

    Ok(MappedComment {
        body: format!("[review:{tag}] by {author}"),
    })
}

/// Maps a source pull request to its target shape.
///
/// The source branch must still exist in the repository's current branch
/// listing: a pull request whose branch was deleted cannot be recreated,
/// and fabricating a branch is out of the question.
///
/// # Errors
///
/// Returns [`MapError::MissingBranch`] when the source branch is gone, and
/// the usual author/title errors otherwise.
pub fn map_pull_request(
    record: &PullRequestRecord,
    branches: &HashSet<String>,
) -> Result<MappedPullRequest, MapError> {
    if record.title.trim().is_empty() {
        return Err(MapError::EmptyTitle {
            entity: "pull request",
            id: record.id,
        });
    }

    let author = record.author.as_deref().ok_or(MapError::MissingAuthor {
        entity: "pull request",
        id: record.id,
    })?;

    if !branches.contains(&record.source_branch) {
        return Err(MapError::MissingBranch {
            id: record.id,
            branch: record.source_branch.clone(),
        });
    }

    let body = format!(
        "Migrated from Bitbucket Pull Request\n\
         Original author: {author}\n\
         Original created on: {created}\n\
         Original link: {link}\n\
         \n\
         {body}",
        created = record.created_on.to_rfc3339(),
        link = record.link,
        body = record.body,
    );

    Ok(MappedPullRequest {
        title: record.title.clone(),
        body,
        head: record.source_branch.clone(),
        base: record.target_branch.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn issue(state: &str) -> IssueRecord {
        IssueRecord {
            id: 7,
            title: "Crash on startup".to_string(),
            body: "Stack trace attached.".to_string(),
            reporter: Some("Alice".to_string()),
            link: "https://bitbucket.org/ws/repo/issues/7".to_string(),
            state: state.to_string(),
            created_on: Utc.with_ymd_and_hms(2023, 4, 1, 12, 0, 0).unwrap(),
            updated_on: None,
            comments: Vec::new(),
        }
    }

    fn pull_request() -> PullRequestRecord {
        PullRequestRecord {
            id: 4,
            title: "Add feature".to_string(),
            body: "Implements the feature.".to_string(),
            author: Some("Bob".to_string()),
            link: "https://bitbucket.org/ws/repo/pull-requests/4".to_string(),
            source_branch: "feature/x".to_string(),
            target_branch: "main".to_string(),
            state: "OPEN".to_string(),
            created_on: Utc.with_ymd_and_hms(2023, 5, 2, 9, 30, 0).unwrap(),
            comments: Vec::new(),
            reviews: Vec::new(),
        }
    }

    #[test]
    fn open_like_states_stay_open() {
        for state in ["new", "open", "on hold", "On Hold"] {
            assert_eq!(map_issue_state(1, state).unwrap(), TargetIssueState::Open);
        }
    }

    #[test]
    fn closed_like_states_collapse_to_closed() {
        for state in ["resolved", "closed", "wontfix", "duplicate", "invalid"] {
            assert_eq!(map_issue_state(1, state).unwrap(), TargetIssueState::Closed);
        }
    }

    #[test]
    fn unknown_state_is_a_typed_failure() {
        let result = map_issue_state(3, "parked");
        assert!(matches!(
            result,
            Err(MapError::UnknownState { id: 3, ref state }) if state == "parked"
        ));
    }

    #[test]
    fn issue_body_is_content_superset() {
        let mapped = map_issue(&issue("resolved")).unwrap();

        // Original title and body survive; the provenance header only adds.
        assert_eq!(mapped.title, "Crash on startup");
        assert!(mapped.body.contains("Stack trace attached."));
        assert!(mapped.body.contains("Original reporter: Alice"));
        assert!(mapped.body.contains("Original state: resolved"));
        assert_eq!(mapped.state, TargetIssueState::Closed);
    }

    #[test]
    fn issue_keeps_original_state_as_label() {
        let mapped = map_issue(&issue("wontfix")).unwrap();
        assert!(mapped.labels.contains(&MIGRATED_LABEL.to_string()));
        assert!(mapped.labels.contains(&"wontfix".to_string()));
    }

    #[test]
    fn issue_without_reporter_fails() {
        let mut record = issue("open");
        record.reporter = None;
        assert!(matches!(
            map_issue(&record),
            Err(MapError::MissingAuthor { entity: "issue", id: 7 })
        ));
    }

    #[test]
    fn issue_with_empty_title_fails() {
        let mut record = issue("open");
        record.title = "  ".to_string();
        assert!(matches!(map_issue(&record), Err(MapError::EmptyTitle { .. })));
    }

    #[test]
    fn comment_gets_provenance_prefix() {
        let record = CommentRecord {
            author: Some("Carol".to_string()),
            body: "Looks good to me.".to_string(),
            created_on: Utc.with_ymd_and_hms(2023, 4, 2, 8, 0, 0).unwrap(),
        };

        let mapped = map_comment("issue", 7, &record).unwrap();
        assert!(mapped
            .body
            .starts_with("> originally posted by Carol on 2023-04-02T08:00:00+00:00"));
        assert!(mapped.body.ends_with("Looks good to me."));
    }

    #[test]
    fn comment_without_author_fails() {
        let record = CommentRecord {
            author: None,
            body: "anonymous".to_string(),
            created_on: Utc.with_ymd_and_hms(2023, 4, 2, 8, 0, 0).unwrap(),
        };

        assert!(matches!(
            map_comment("pull request", 4, &record),
            Err(MapError::MissingAuthor { entity: "pull request", id: 4 })
        ));
    }

    #[test]
    fn review_degrades_to_tagged_comment() {
        let approved = ReviewRecord {
            author: Some("Dave".to_string()),
            state: "approved".to_string(),
        };
        assert_eq!(
            map_review(4, &approved).unwrap().body,
            "[review:approved] by Dave"
        );

        let changes = ReviewRecord {
            author: Some("Erin".to_string()),
            state: "changes_requested".to_string(),
        };
        assert_eq!(
            map_review(4, &changes).unwrap().body,
            "[review:changes_requested] by Erin"
        );

        let other = ReviewRecord {
            author: Some("Frank".to_string()),
            state: "participated".to_string(),
        };
        assert_eq!(
            map_review(4, &other).unwrap().body,
            "[review:commented] by Frank"
        );
    }

    #[test]
    fn pull_request_maps_branches_and_body() {
        let branches: HashSet<String> =
            ["main".to_string(), "feature/x".to_string()].into_iter().collect();

        let mapped = map_pull_request(&pull_request(), &branches).unwrap();
        assert_eq!(mapped.head, "feature/x");
        assert_eq!(mapped.base, "main");
        assert!(mapped.body.contains("Implements the feature."));
        assert!(mapped.body.contains("Original author: Bob"));
    }

    #[test]
    fn pull_request_with_deleted_source_branch_fails() {
        let branches: HashSet<String> = ["main".to_string()].into_iter().collect();

        let result = map_pull_request(&pull_request(), &branches);
        assert!(matches!(
            result,
            Err(MapError::MissingBranch { id: 4, ref branch }) if branch == "feature/x"
        ));
    }

    #[test]
    fn repository_maps_without_loss() {
        let record = RepositoryRecord {
            slug: "my-repo".to_string(),
            name: "My Repo".to_string(),
            description: "A repo.".to_string(),
            default_branch: "develop".to_string(),
            is_private: true,
            clone_url: "https://bitbucket.org/ws/my-repo.git".to_string(),
        };

        let mapped = map_repository(&record);
        assert_eq!(mapped.name, "my-repo");
        assert_eq!(mapped.default_branch, "develop");
        assert!(mapped.private);
    }
}
