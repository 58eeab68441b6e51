//! GitHub endpoint helpers
//!
//! Thin typed wrappers over the call primitive for the endpoints the tool
//! servers use. Each helper is one resilient call; the multi-page commit
//! collector issues one call per page.

use std::collections::HashMap;

use super::GitHubClient;
use crate::error::Result;
use crate::models::{Branch, CommitEntry, Contributor, Issue, Repository, SearchIssuesResponse};
use crate::progress::ProgressSink;

/// Page size used for listing endpoints
const PAGE_SIZE: u32 = 100;

/// Hard page cap for commit collection (1000 commits)
pub const MAX_COMMIT_PAGES: u32 = 10;

impl GitHubClient {
    /// Fetch repository metadata
    pub async fn repository(
        &self,
        owner: &str,
        repo: &str,
        sink: &dyn ProgressSink,
    ) -> Result<Repository> {
        self.get_json(&format!("/repos/{}/{}", owner, repo), None, sink)
            .await
    }

    /// Count issues or pull requests matching a search query
    pub async fn search_issue_count(&self, query: &str, sink: &dyn ProgressSink) -> Result<u64> {
        let params = HashMap::from([
            ("q".to_string(), query.to_string()),
            ("per_page".to_string(), "1".to_string()),
        ]);

        let response: SearchIssuesResponse = self.get_json("/search/issues", Some(params), sink).await?;
        Ok(response.total_count)
    }

    /// Count open pull requests via the search API
    pub async fn open_pull_request_count(
        &self,
        owner: &str,
        repo: &str,
        sink: &dyn ProgressSink,
    ) -> Result<u64> {
        self.search_issue_count(&format!("repo:{}/{} type:pr state:open", owner, repo), sink)
            .await
    }

    /// Fetch the most recent commit, if the repository has any
    pub async fn latest_commit(
        &self,
        owner: &str,
        repo: &str,
        sink: &dyn ProgressSink,
    ) -> Result<Option<CommitEntry>> {
        let params = HashMap::from([("per_page".to_string(), "1".to_string())]);

        let commits: Vec<CommitEntry> = self
            .get_json(&format!("/repos/{}/{}/commits", owner, repo), Some(params), sink)
            .await?;
        Ok(commits.into_iter().next())
    }

    /// Fetch one page of the commit listing
    pub async fn commits_page(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        since: Option<&str>,
        until: Option<&str>,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<CommitEntry>> {
        let mut params = HashMap::from([
            ("per_page".to_string(), PAGE_SIZE.to_string()),
            ("page".to_string(), page.to_string()),
        ]);

        if let Some(since) = since {
            params.insert("since".to_string(), since.to_string());
        }
        if let Some(until) = until {
            params.insert("until".to_string(), until.to_string());
        }

        self.get_json(&format!("/repos/{}/{}/commits", owner, repo), Some(params), sink)
            .await
    }

    /// Collect commits page by page, bounded at [`MAX_COMMIT_PAGES`]
    pub async fn collect_commits(
        &self,
        owner: &str,
        repo: &str,
        since: Option<&str>,
        until: Option<&str>,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<CommitEntry>> {
        let mut all = Vec::new();

        for page in 1..=MAX_COMMIT_PAGES {
            let commits = self
                .commits_page(owner, repo, page, since, until, sink)
                .await?;
            let count = commits.len();

            if count == 0 {
                break;
            }

            all.extend(commits);
            sink.progress(page, MAX_COMMIT_PAGES).await;

            if count < PAGE_SIZE as usize {
                break;
            }
        }

        Ok(all)
    }

    /// Fetch the top contributors, ordered by contribution count
    pub async fn contributors(
        &self,
        owner: &str,
        repo: &str,
        top_n: u32,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<Contributor>> {
        let params = HashMap::from([
            ("per_page".to_string(), top_n.to_string()),
            ("anon".to_string(), "false".to_string()),
        ]);

        self.get_json(
            &format!("/repos/{}/{}/contributors", owner, repo),
            Some(params),
            sink,
        )
        .await
    }

    /// Fetch one page of the issues listing (includes pull requests, as
    /// the upstream endpoint does)
    pub async fn issues_page(
        &self,
        owner: &str,
        repo: &str,
        state: &str,
        page: u32,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<Issue>> {
        let params = HashMap::from([
            ("state".to_string(), state.to_string()),
            ("per_page".to_string(), PAGE_SIZE.to_string()),
            ("page".to_string(), page.to_string()),
        ]);

        self.get_json(&format!("/repos/{}/{}/issues", owner, repo), Some(params), sink)
            .await
    }

    /// Fetch the branch listing (first page, 100 branches)
    pub async fn branches(
        &self,
        owner: &str,
        repo: &str,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<Branch>> {
        let params = HashMap::from([("per_page".to_string(), PAGE_SIZE.to_string())]);

        self.get_json(&format!("/repos/{}/{}/branches", owner, repo), Some(params), sink)
            .await
    }
}
