//! Wire structs for the Bitbucket Cloud REST API v2.
//!
//! Responses are deserialized into these explicit shapes at the boundary
//! and converted to records immediately; raw JSON never leaves this module.

use crate::records::{
    CommentRecord, IssueRecord, PullRequestRecord, RepositoryRecord, ReviewRecord,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A page of a paginated listing. `next` is an absolute URL cursor.
#[derive(Debug, Deserialize)]
pub(crate) struct Paginated<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActorWire {
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentWire {
    pub raw: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HrefWire {
    pub href: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LinksWire {
    pub html: Option<HrefWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedBranchWire {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentUserWire {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub uuid: Option<String>,
    pub account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryWire {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    pub mainbranch: Option<NamedBranchWire>,
}

impl RepositoryWire {
    pub fn into_record(self, workspace: &str) -> RepositoryRecord {
        let clone_url = format!("https://bitbucket.org/{workspace}/{}.git", self.slug);
        RepositoryRecord {
            name: self.name,
            description: self.description.unwrap_or_default(),
            default_branch: self
                .mainbranch
                .and_then(|b| b.name)
                .unwrap_or_else(|| "main".to_string()),
            is_private: self.is_private,
            clone_url,
            slug: self.slug,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BranchWire {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueWire {
    pub id: u64,
    pub title: String,
    pub state: String,
    pub content: Option<ContentWire>,
    pub reporter: Option<ActorWire>,
    pub created_on: DateTime<Utc>,
    pub updated_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: LinksWire,
}

impl IssueWire {
    pub fn into_record(self, comments: Vec<CommentRecord>) -> IssueRecord {
        IssueRecord {
            id: self.id,
            title: self.title,
            body: self.content.and_then(|c| c.raw).unwrap_or_default(),
            reporter: self.reporter.and_then(|a| a.display_name),
            link: self.links.html.map(|h| h.href).unwrap_or_default(),
            state: self.state,
            created_on: self.created_on,
            updated_on: self.updated_on,
            comments,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentWire {
    pub user: Option<ActorWire>,
    pub content: Option<ContentWire>,
    pub created_on: DateTime<Utc>,
}

impl CommentWire {
    pub fn into_record(self) -> CommentRecord {
        CommentRecord {
            author: self.user.and_then(|a| a.display_name),
            body: self.content.and_then(|c| c.raw).unwrap_or_default(),
            created_on: self.created_on,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PrBranchWire {
    pub branch: Option<NamedBranchWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParticipantWire {
    pub user: Option<ActorWire>,
    pub state: Option<String>,
    #[serde(default)]
    pub approved: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestWire {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub state: String,
    pub author: Option<ActorWire>,
    pub source: Option<PrBranchWire>,
    pub destination: Option<PrBranchWire>,
    pub created_on: DateTime<Utc>,
    #[serde(default)]
    pub links: LinksWire,
    #[serde(default = "Vec::new")]
    pub participants: Vec<ParticipantWire>,
}

impl PullRequestWire {
    /// Converts to a record. Branch names default to empty strings when the
    /// API omits them; the mapper's branch check rejects those later.
    pub fn into_record(self, comments: Vec<CommentRecord>) -> PullRequestRecord {
        let reviews = self
            .participants
            .into_iter()
            .filter_map(|p| {
                // Participants who only viewed the PR carry no signal.
                let state = match (p.state, p.approved) {
                    (Some(state), _) => state,
                    (None, true) => "approved".to_string(),
                    (None, false) => return None,
                };
                Some(ReviewRecord {
                    author: p.user.and_then(|a| a.display_name),
                    state,
                })
            })
            .collect();

        PullRequestRecord {
            id: self.id,
            title: self.title,
            body: self.description.unwrap_or_default(),
            author: self.author.and_then(|a| a.display_name),
            link: self.links.html.map(|h| h.href).unwrap_or_default(),
            source_branch: branch_name(self.source),
            target_branch: branch_name(self.destination),
            state: self.state,
            created_on: self.created_on,
            comments,
            reviews,
        }
    }
}

fn branch_name(spec: Option<PrBranchWire>) -> String {
    spec.and_then(|s| s.branch)
        .and_then(|b| b.name)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_paginated_repository_listing() {
        let json = r#"{
            "values": [
                {
                    "slug": "tool",
                    "name": "Tool",
                    "description": "A tool.",
                    "is_private": true,
                    "mainbranch": {"name": "develop"}
                }
            ],
            "next": "https://api.bitbucket.org/2.0/repositories/ws?page=2"
        }"#;

        let page: Paginated<RepositoryWire> = serde_json::from_str(json).unwrap();
        assert_eq!(page.values.len(), 1);
        assert!(page.next.is_some());

        let record = page.values.into_iter().next().unwrap().into_record("ws");
        assert_eq!(record.slug, "tool");
        assert_eq!(record.default_branch, "develop");
        assert_eq!(record.clone_url, "https://bitbucket.org/ws/tool.git");
        assert!(record.is_private);
    }

    #[test]
    fn repository_defaults_when_fields_missing() {
        let json = r#"{"slug": "bare", "name": "Bare"}"#;
        let record: RepositoryRecord = serde_json::from_str::<RepositoryWire>(json)
            .unwrap()
            .into_record("ws");
        assert_eq!(record.description, "");
        assert_eq!(record.default_branch, "main");
        assert!(!record.is_private);
    }

    #[test]
    fn issue_keeps_raw_state_and_optional_reporter() {
        let json = r#"{
            "id": 12,
            "title": "Broken",
            "state": "on hold",
            "content": {"raw": "Details."},
            "reporter": null,
            "created_on": "2023-04-01T12:00:00+00:00",
            "links": {"html": {"href": "https://bitbucket.org/ws/tool/issues/12"}}
        }"#;

        let record: IssueRecord = serde_json::from_str::<IssueWire>(json)
            .unwrap()
            .into_record(Vec::new());
        assert_eq!(record.state, "on hold");
        assert_eq!(record.reporter, None);
        assert_eq!(record.body, "Details.");
        assert_eq!(record.link, "https://bitbucket.org/ws/tool/issues/12");
    }

    #[test]
    fn pull_request_extracts_branches_and_reviews() {
        let json = r#"{
            "id": 3,
            "title": "Fix",
            "description": "Fixes it.",
            "state": "OPEN",
            "author": {"display_name": "Bob"},
            "source": {"branch": {"name": "fix/bug"}},
            "destination": {"branch": {"name": "main"}},
            "created_on": "2023-05-02T09:30:00+00:00",
            "participants": [
                {"user": {"display_name": "Alice"}, "state": "approved", "approved": true},
                {"user": {"display_name": "Carol"}, "state": null, "approved": false}
            ]
        }"#;

        let record: PullRequestRecord = serde_json::from_str::<PullRequestWire>(json)
            .unwrap()
            .into_record(Vec::new());
        assert_eq!(record.source_branch, "fix/bug");
        assert_eq!(record.target_branch, "main");
        assert_eq!(record.reviews.len(), 1);
        assert_eq!(record.reviews[0].author.as_deref(), Some("Alice"));
        assert_eq!(record.reviews[0].state, "approved");
    }

    #[test]
    fn malformed_issue_is_a_deserialization_error() {
        let json = r#"{"id": "not-a-number", "title": "x", "state": "open"}"#;
        assert!(serde_json::from_str::<IssueWire>(json).is_err());
    }
}
