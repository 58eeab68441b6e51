//! Typed models for the GitHub API payloads the tool servers consume
//!
//! Only the fields actually read by the tools are modeled; everything else
//! in the upstream JSON is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// Repository metadata from `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Repository {
    pub name: Option<String>,
    pub full_name: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    /// Open issues including pull requests, as GitHub counts them
    #[serde(default)]
    pub open_issues_count: u64,
    pub language: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
    pub default_branch: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub pushed_at: Option<String>,
}

/// One entry from `GET /repos/{owner}/{repo}/commits`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommitEntry {
    pub sha: Option<String>,
    #[serde(default)]
    pub commit: CommitDetail,
    /// The GitHub account linked to the commit, absent for unmapped emails
    pub author: Option<UserRef>,
}

/// The git-level commit data nested in a commit entry
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommitDetail {
    #[serde(default)]
    pub author: CommitSignature,
    pub message: Option<String>,
}

/// Name/date signature of a commit author
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommitSignature {
    pub name: Option<String>,
    pub date: Option<String>,
}

/// A user reference as embedded in commits and issues
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserRef {
    pub login: Option<String>,
}

/// Response envelope of `GET /search/issues`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchIssuesResponse {
    #[serde(default)]
    pub total_count: u64,
}

/// One entry from `GET /repos/{owner}/{repo}/contributors`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Contributor {
    pub login: Option<String>,
    #[serde(default)]
    pub contributions: u64,
}

/// One entry from `GET /repos/{owner}/{repo}/issues`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Issue {
    #[serde(default)]
    pub number: u64,
    pub title: Option<String>,
    pub state: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub created_at: Option<String>,
    pub user: Option<UserRef>,
    /// Present when the "issue" is actually a pull request
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    /// GitHub's issues listing includes pull requests; tools that want
    /// issues proper filter on this.
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// An issue label
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Label {
    pub name: Option<String>,
}

/// One entry from `GET /repos/{owner}/{repo}/branches`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Branch {
    pub name: Option<String>,
    #[serde(default)]
    pub protected: bool,
}
