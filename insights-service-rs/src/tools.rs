//! Tool implementations of the insights service
//!
//! Each tool resolves its parameters, drives one or more resilient calls
//! through the shared SDK client, and returns the dual-shaped result:
//! a text rendering plus the structured payload.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use github_sdk::error::Result;
use github_sdk::progress::ProgressSink;
use github_sdk::tool::validate_repo_ref;
use github_sdk::util::{days_ago, parse_github_datetime, percentage, truncate_string};
use github_sdk::{GitHubClient, GitHubError, ToolParams, ToolResult};

/// Issue listing pages fetched at most per summary (100 issues per page)
const MAX_ISSUE_PAGES: u32 = 5;

/// Health metrics of one repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryHealth {
    pub owner: String,
    pub repo: String,
    /// Open issues excluding pull requests
    pub open_issues_count: u64,
    pub open_prs_count: u64,
    pub stars_count: u64,
    pub forks_count: u64,
    pub watchers_count: u64,
    pub last_commit_date: Option<DateTime<Utc>>,
    pub last_commit_age_days: Option<i64>,
    pub language: Option<String>,
    pub is_archived: bool,
    pub is_disabled: bool,
    pub default_branch: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Collect health metrics for one repository
pub async fn repository_health(
    client: &GitHubClient,
    params: &ToolParams,
    sink: &dyn ProgressSink,
) -> Result<ToolResult> {
    let owner = params.required_str("owner")?;
    let repo = params.required_str("repo")?;
    validate_repo_ref(&owner, &repo)?;

    sink.info(&format!("Collecting health metrics for {}/{}", owner, repo))
        .await;
    sink.progress(0, 100).await;

    let repository = client.repository(&owner, &repo, sink).await?;
    sink.progress(40, 100).await;

    // The PR count comes from the search API and is tolerated: a failed
    // search degrades the issue split rather than the whole tool call.
    let open_prs_count = client
        .open_pull_request_count(&owner, &repo, sink)
        .await
        .unwrap_or(0);
    sink.progress(70, 100).await;

    let last_commit = client.latest_commit(&owner, &repo, sink).await?;
    let last_commit_date =
        last_commit.and_then(|c| parse_github_datetime(c.commit.author.date.as_deref()));
    sink.progress(90, 100).await;

    let metrics = RepositoryHealth {
        owner: owner.clone(),
        repo: repo.clone(),
        open_issues_count: repository.open_issues_count.saturating_sub(open_prs_count),
        open_prs_count,
        stars_count: repository.stargazers_count,
        forks_count: repository.forks_count,
        watchers_count: repository.watchers_count,
        last_commit_date,
        last_commit_age_days: days_ago(last_commit_date),
        language: repository.language,
        is_archived: repository.archived,
        is_disabled: repository.disabled,
        default_branch: repository
            .default_branch
            .unwrap_or_else(|| "main".to_string()),
        created_at: parse_github_datetime(repository.created_at.as_deref()),
        updated_at: parse_github_datetime(repository.updated_at.as_deref()),
        pushed_at: parse_github_datetime(repository.pushed_at.as_deref()),
    };

    let text = render_health_text(&metrics);
    sink.progress(100, 100).await;
    sink.info("Repository health metrics collected").await;

    Ok(ToolResult::new(text, serde_json::to_value(&metrics)?)
        .with_meta("owner", owner)
        .with_meta("repo", repo)
        .with_meta("operation", "get_repository_health"))
}

fn render_health_text(metrics: &RepositoryHealth) -> String {
    let mut lines = vec![
        format!("Repository health: {}/{}", metrics.owner, metrics.repo),
        String::new(),
        format!("Open issues: {}", metrics.open_issues_count),
        format!("Open pull requests: {}", metrics.open_prs_count),
        format!("Stars: {}", metrics.stars_count),
        format!("Forks: {}", metrics.forks_count),
        format!("Watchers: {}", metrics.watchers_count),
    ];

    match metrics.last_commit_age_days {
        Some(0) => lines.push("Last commit: today".to_string()),
        Some(1) => lines.push("Last commit: yesterday".to_string()),
        Some(age) if age < 30 => lines.push(format!("Last commit: {} days ago", age)),
        Some(age) => lines.push(format!("Last commit: {} days ago (inactive)", age)),
        None => lines.push("Last commit: unknown".to_string()),
    }

    if let Some(ref language) = metrics.language {
        lines.push(format!("Primary language: {}", language));
    }

    if metrics.is_archived {
        lines.push("The repository is archived".to_string());
    }

    if metrics.is_disabled {
        lines.push("The repository is disabled".to_string());
    }

    lines.join("\n")
}

/// A short issue reference for the summary listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueBrief {
    pub number: u64,
    pub title: String,
    pub state: String,
}

/// Aggregate issue summary of one repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuesSummary {
    pub owner: String,
    pub repo: String,
    pub state_filter: String,
    pub total_issues: u64,
    pub open_issues: u64,
    pub closed_issues: u64,
    /// Issues inspected for the label/recency breakdown
    pub analyzed_count: u64,
    pub issues_by_label: BTreeMap<String, u64>,
    pub recent_issues: Vec<IssueBrief>,
}

/// Summarize the issues of one repository
pub async fn issues_summary(
    client: &GitHubClient,
    params: &ToolParams,
    sink: &dyn ProgressSink,
) -> Result<ToolResult> {
    let owner = params.required_str("owner")?;
    let repo = params.required_str("repo")?;
    validate_repo_ref(&owner, &repo)?;

    let state = params
        .optional_str("state")?
        .unwrap_or_else(|| "open".to_string());
    if !matches!(state.as_str(), "open" | "closed" | "all") {
        return Err(GitHubError::validation(format!(
            "Parameter 'state' must be one of open, closed, all; got {}",
            state
        )));
    }

    sink.info(&format!("Summarizing issues for {}/{}", owner, repo))
        .await;
    sink.progress(0, 100).await;

    // Totals come from the search API so they cover the whole repository,
    // not just the inspected pages.
    let open_issues = client
        .search_issue_count(&format!("repo:{}/{} type:issue state:open", owner, repo), sink)
        .await?;
    let closed_issues = client
        .search_issue_count(
            &format!("repo:{}/{} type:issue state:closed", owner, repo),
            sink,
        )
        .await?;
    sink.progress(30, 100).await;

    let mut issues = Vec::new();
    for page in 1..=MAX_ISSUE_PAGES {
        let page_items = client.issues_page(&owner, &repo, &state, page, sink).await?;
        let count = page_items.len();

        // The listing endpoint mixes pull requests in; drop them.
        issues.extend(page_items.into_iter().filter(|i| !i.is_pull_request()));

        if count < 100 {
            break;
        }
    }
    sink.progress(80, 100).await;

    let mut issues_by_label: BTreeMap<String, u64> = BTreeMap::new();
    for issue in &issues {
        for label in &issue.labels {
            if let Some(ref name) = label.name {
                *issues_by_label.entry(name.clone()).or_insert(0) += 1;
            }
        }
    }

    let recent_issues: Vec<IssueBrief> = issues
        .iter()
        .take(5)
        .map(|issue| IssueBrief {
            number: issue.number,
            title: truncate_string(issue.title.as_deref().unwrap_or(""), 80),
            state: issue.state.clone().unwrap_or_else(|| "open".to_string()),
        })
        .collect();

    let summary = IssuesSummary {
        owner: owner.clone(),
        repo: repo.clone(),
        state_filter: state,
        total_issues: open_issues + closed_issues,
        open_issues,
        closed_issues,
        analyzed_count: issues.len() as u64,
        issues_by_label,
        recent_issues,
    };

    let text = render_issues_text(&summary);
    sink.progress(100, 100).await;
    sink.info("Issue summary collected").await;

    Ok(ToolResult::new(text, serde_json::to_value(&summary)?)
        .with_meta("owner", owner)
        .with_meta("repo", repo)
        .with_meta("operation", "get_repository_issues_summary"))
}

fn render_issues_text(summary: &IssuesSummary) -> String {
    let mut lines = vec![
        format!("Issue summary: {}/{}", summary.owner, summary.repo),
        String::new(),
        format!("Total issues: {}", summary.total_issues),
        format!("Open: {}", summary.open_issues),
        format!("Closed: {}", summary.closed_issues),
    ];

    if !summary.issues_by_label.is_empty() {
        lines.push(String::new());
        lines.push("Issues by label:".to_string());
        for (label, count) in &summary.issues_by_label {
            lines.push(format!("  - {}: {}", label, count));
        }
    }

    if !summary.recent_issues.is_empty() {
        lines.push(String::new());
        lines.push("Recent issues:".to_string());
        for issue in &summary.recent_issues {
            lines.push(format!(
                "  [{}] #{}: {}",
                issue.state, issue.number, issue.title
            ));
        }
    }

    lines.join("\n")
}

/// One contributor with their share of the total contributions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorStats {
    pub login: String,
    pub contributions: u64,
    pub percentage: f64,
}

/// Contributor breakdown of one repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorsReport {
    pub owner: String,
    pub repo: String,
    pub total_contributions: u64,
    pub contributors: Vec<ContributorStats>,
}

/// List the top contributors of one repository
pub async fn contributors(
    client: &GitHubClient,
    params: &ToolParams,
    sink: &dyn ProgressSink,
) -> Result<ToolResult> {
    let owner = params.required_str("owner")?;
    let repo = params.required_str("repo")?;
    validate_repo_ref(&owner, &repo)?;

    let top_n = params.u64_or("top_n", 10)?;
    if !(1..=100).contains(&top_n) {
        return Err(GitHubError::validation(format!(
            "Parameter 'top_n' must be between 1 and 100, got {}",
            top_n
        )));
    }

    sink.info(&format!("Fetching top {} contributors for {}/{}", top_n, owner, repo))
        .await;
    sink.progress(0, 100).await;

    let listing = client.contributors(&owner, &repo, top_n as u32, sink).await?;
    sink.progress(70, 100).await;

    let total_contributions: u64 = listing.iter().map(|c| c.contributions).sum();
    let contributors: Vec<ContributorStats> = listing
        .iter()
        .map(|c| ContributorStats {
            login: c.login.clone().unwrap_or_else(|| "unknown".to_string()),
            contributions: c.contributions,
            percentage: percentage(c.contributions, total_contributions),
        })
        .collect();

    let report = ContributorsReport {
        owner: owner.clone(),
        repo: repo.clone(),
        total_contributions,
        contributors,
    };

    let text = render_contributors_text(&report);
    sink.progress(100, 100).await;
    sink.info("Contributor statistics collected").await;

    Ok(ToolResult::new(text, serde_json::to_value(&report)?)
        .with_meta("owner", owner)
        .with_meta("repo", repo)
        .with_meta("operation", "get_repository_contributors"))
}

fn render_contributors_text(report: &ContributorsReport) -> String {
    let mut lines = vec![
        format!("Top contributors: {}/{}", report.owner, report.repo),
        String::new(),
        format!(
            "Total contributions (listed authors): {}",
            report.total_contributions
        ),
        String::new(),
    ];

    for (i, contributor) in report.contributors.iter().enumerate() {
        lines.push(format!(
            "  {}. {}: {} contributions ({:.1}%)",
            i + 1,
            contributor.login,
            contributor.contributions,
            contributor.percentage
        ));
    }

    lines.join("\n")
}
