#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod backend;
pub mod bitbucket;
pub mod config;
pub mod github;
pub mod mapper;
pub mod mirror;
pub mod rate_limit;
pub mod records;
pub mod report;
pub mod runner;

pub use backend::{SourceReader, TargetWriter};
pub use bitbucket::{BitbucketReader, SourceError};
pub use config::{resolve_value, ConfigError, MigrationConfig};
pub use github::{GitHubWriter, TargetError};
pub use mapper::{
    map_comment, map_issue, map_issue_state, map_pull_request, map_repository, map_review,
    MapError, MappedComment, MappedIssue, MappedPullRequest, MappedRepository, TargetIssueState,
    MIGRATED_LABEL,
};
pub use mirror::{mirror_repository, MirrorError};
pub use rate_limit::{
    check_core_rate_limit, ensure_core_rate_limit, wait_for_reset, wait_if_needed, RateLimitInfo,
};
pub use records::{
    CommentRecord, IssueRecord, PullRequestRecord, RepositoryRecord, ReviewRecord,
};
pub use report::{EntityKind, MigrationReport, MigrationResult, Outcome};
pub use runner::{Runner, RunnerConfig, RunnerError, WorkItem, WorkState};
