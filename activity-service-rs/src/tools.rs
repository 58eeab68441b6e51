//! Tool implementations of the activity service

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use github_sdk::error::Result;
use github_sdk::models::CommitEntry;
use github_sdk::progress::ProgressSink;
use github_sdk::tool::validate_repo_ref;
use github_sdk::util::{parse_github_datetime, percentage};
use github_sdk::{GitHubClient, GitHubError, ToolParams, ToolResult};

/// Weekday labels in Monday-first order
const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Authors listed in the commit statistics
const TOP_AUTHORS: usize = 10;

/// One author with their share of the analyzed commits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorStats {
    pub name: String,
    pub commits: u64,
    pub percentage: f64,
}

/// Commit count of one weekday
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekdayCount {
    pub day: String,
    pub commits: u64,
}

/// Commit statistics over a time window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitStatistics {
    pub owner: String,
    pub repo: String,
    pub since: String,
    pub until: String,
    pub total_commits: u64,
    pub unique_authors: u64,
    pub top_authors: Vec<AuthorStats>,
    pub commits_by_weekday: Vec<WeekdayCount>,
}

/// Analyze the commit history of one repository over a time window
pub async fn commit_statistics(
    client: &GitHubClient,
    params: &ToolParams,
    sink: &dyn ProgressSink,
) -> Result<ToolResult> {
    let owner = params.required_str("owner")?;
    let repo = params.required_str("repo")?;
    validate_repo_ref(&owner, &repo)?;

    let since = resolve_bound(params, "since", Utc::now() - Duration::days(30))?;
    let until = resolve_bound(params, "until", Utc::now())?;

    sink.info(&format!(
        "Collecting commit statistics for {}/{} ({} .. {})",
        owner, repo, since, until
    ))
    .await;
    sink.progress(0, 100).await;

    let commits = client
        .collect_commits(&owner, &repo, Some(&since), Some(&until), sink)
        .await?;
    sink.progress(70, 100).await;

    let total_commits = commits.len() as u64;

    let mut authors: BTreeMap<String, u64> = BTreeMap::new();
    for commit in &commits {
        let name = commit
            .commit
            .author
            .name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        *authors.entry(name).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&String, &u64)> = authors.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let top_authors: Vec<AuthorStats> = ranked
        .iter()
        .take(TOP_AUTHORS)
        .map(|(name, &commits)| AuthorStats {
            name: (*name).clone(),
            commits,
            percentage: percentage(commits, total_commits),
        })
        .collect();

    let mut weekday_counts = [0u64; 7];
    for commit in &commits {
        if let Some(date) = parse_github_datetime(commit.commit.author.date.as_deref()) {
            weekday_counts[date.weekday().num_days_from_monday() as usize] += 1;
        }
    }
    let commits_by_weekday: Vec<WeekdayCount> = WEEKDAYS
        .iter()
        .zip(weekday_counts)
        .map(|(day, commits)| WeekdayCount {
            day: day.to_string(),
            commits,
        })
        .collect();

    let stats = CommitStatistics {
        owner: owner.clone(),
        repo: repo.clone(),
        since,
        until,
        total_commits,
        unique_authors: authors.len() as u64,
        top_authors,
        commits_by_weekday,
    };

    let text = render_commit_stats_text(&stats);
    sink.progress(100, 100).await;
    sink.info("Commit statistics collected").await;

    Ok(ToolResult::new(text, serde_json::to_value(&stats)?)
        .with_meta("owner", owner)
        .with_meta("repo", repo)
        .with_meta("operation", "get_commit_statistics"))
}

/// Resolve a time-window bound: the given RFC 3339 value, or the default
fn resolve_bound(
    params: &ToolParams,
    key: &str,
    default: chrono::DateTime<Utc>,
) -> Result<String> {
    match params.optional_str(key)? {
        Some(value) => {
            chrono::DateTime::parse_from_rfc3339(&value).map_err(|e| {
                GitHubError::validation(format!(
                    "Parameter '{}' must be an RFC 3339 timestamp: {}",
                    key, e
                ))
            })?;
            Ok(value)
        }
        None => Ok(default.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
    }
}

fn render_commit_stats_text(stats: &CommitStatistics) -> String {
    let mut lines = vec![
        format!("Commit statistics: {}/{}", stats.owner, stats.repo),
        String::new(),
        format!("Window: {} .. {}", stats.since, stats.until),
        format!("Total commits: {}", stats.total_commits),
        format!("Unique authors: {}", stats.unique_authors),
    ];

    if !stats.top_authors.is_empty() {
        lines.push(String::new());
        lines.push("Top authors:".to_string());
        for (i, author) in stats.top_authors.iter().enumerate() {
            lines.push(format!(
                "  {}. {}: {} commits ({:.1}%)",
                i + 1,
                author.name,
                author.commits,
                author.percentage
            ));
        }
    }

    lines.push(String::new());
    lines.push("Commits by weekday:".to_string());
    for entry in &stats.commits_by_weekday {
        lines.push(format!("  - {}: {}", entry.day, entry.commits));
    }

    lines.join("\n")
}

/// One developer with their share of the analyzed commits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperStats {
    pub login: String,
    pub name: String,
    pub commits: u64,
    pub percentage: f64,
}

/// Developer activity breakdown of one repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperActivity {
    pub owner: String,
    pub repo: String,
    pub total_commits: u64,
    pub unique_developers: u64,
    pub top_developers: Vec<DeveloperStats>,
}

/// Rank the developers of one repository by recent commit count
pub async fn developer_activity(
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

    sink.info(&format!("Analyzing developer activity for {}/{}", owner, repo))
        .await;
    sink.progress(0, 100).await;

    let commits = client
        .collect_commits(&owner, &repo, None, None, sink)
        .await?;
    sink.progress(70, 100).await;

    let total_commits = commits.len() as u64;

    // Group by the linked GitHub account; commits whose author e-mail is
    // not mapped to an account are counted in the total only.
    let mut developers: BTreeMap<String, (String, u64)> = BTreeMap::new();
    for commit in &commits {
        let Some(login) = commit.author.as_ref().and_then(|a| a.login.clone()) else {
            continue;
        };

        let display_name = display_name_for(commit, &login);
        let entry = developers.entry(login).or_insert((display_name, 0));
        entry.1 += 1;
    }

    let mut ranked: Vec<(&String, &(String, u64))> = developers.iter().collect();
    ranked.sort_by(|a, b| b.1 .1.cmp(&a.1 .1).then_with(|| a.0.cmp(b.0)));

    let top_developers: Vec<DeveloperStats> = ranked
        .iter()
        .take(top_n as usize)
        .map(|(login, (name, commits))| DeveloperStats {
            login: (*login).clone(),
            name: name.clone(),
            commits: *commits,
            percentage: percentage(*commits, total_commits),
        })
        .collect();

    let activity = DeveloperActivity {
        owner: owner.clone(),
        repo: repo.clone(),
        total_commits,
        unique_developers: developers.len() as u64,
        top_developers,
    };

    let text = render_developer_activity_text(&activity);
    sink.progress(100, 100).await;
    sink.info("Developer activity collected").await;

    Ok(ToolResult::new(text, serde_json::to_value(&activity)?)
        .with_meta("owner", owner)
        .with_meta("repo", repo)
        .with_meta("operation", "get_developer_activity"))
}

fn display_name_for(commit: &CommitEntry, login: &str) -> String {
    commit
        .commit
        .author
        .name
        .clone()
        .unwrap_or_else(|| login.to_string())
}

fn render_developer_activity_text(activity: &DeveloperActivity) -> String {
    let mut lines = vec![
        format!("Developer activity: {}/{}", activity.owner, activity.repo),
        String::new(),
        format!("Commits analyzed: {}", activity.total_commits),
        format!("Unique developers: {}", activity.unique_developers),
    ];

    if !activity.top_developers.is_empty() {
        lines.push(String::new());
        lines.push("Top developers:".to_string());
        for (i, dev) in activity.top_developers.iter().enumerate() {
            lines.push(format!(
                "  {}. {} (@{}): {} commits ({:.1}%)",
                i + 1,
                dev.name,
                dev.login,
                dev.commits,
                dev.percentage
            ));
        }
    }

    lines.join("\n")
}

/// One branch of the analyzed repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub protected: bool,
    pub is_default: bool,
}

/// Branch structure of one repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchAnalysis {
    pub owner: String,
    pub repo: String,
    pub default_branch: String,
    pub total_branches: u64,
    pub protected_count: u64,
    pub branches: Vec<BranchInfo>,
}

/// Analyze the branches of one repository
pub async fn branch_analysis(
    client: &GitHubClient,
    params: &ToolParams,
    sink: &dyn ProgressSink,
) -> Result<ToolResult> {
    let owner = params.required_str("owner")?;
    let repo = params.required_str("repo")?;
    validate_repo_ref(&owner, &repo)?;

    sink.info(&format!("Analyzing branches of {}/{}", owner, repo))
        .await;
    sink.progress(0, 100).await;

    let repository = client.repository(&owner, &repo, sink).await?;
    let default_branch = repository
        .default_branch
        .unwrap_or_else(|| "main".to_string());
    sink.progress(40, 100).await;

    let listing = client.branches(&owner, &repo, sink).await?;
    sink.progress(80, 100).await;

    let branches: Vec<BranchInfo> = listing
        .iter()
        .map(|b| {
            let name = b.name.clone().unwrap_or_default();
            BranchInfo {
                is_default: name == default_branch,
                name,
                protected: b.protected,
            }
        })
        .collect();

    let analysis = BranchAnalysis {
        owner: owner.clone(),
        repo: repo.clone(),
        default_branch,
        total_branches: branches.len() as u64,
        protected_count: branches.iter().filter(|b| b.protected).count() as u64,
        branches,
    };

    let text = render_branch_analysis_text(&analysis);
    sink.progress(100, 100).await;
    sink.info("Branch analysis collected").await;

    Ok(ToolResult::new(text, serde_json::to_value(&analysis)?)
        .with_meta("owner", owner)
        .with_meta("repo", repo)
        .with_meta("operation", "get_branch_analysis"))
}

fn render_branch_analysis_text(analysis: &BranchAnalysis) -> String {
    let mut lines = vec![
        format!("Branch analysis: {}/{}", analysis.owner, analysis.repo),
        String::new(),
        format!("Default branch: {}", analysis.default_branch),
        format!("Branches (first page): {}", analysis.total_branches),
        format!("Protected branches: {}", analysis.protected_count),
    ];

    let protected: Vec<&BranchInfo> = analysis.branches.iter().filter(|b| b.protected).collect();
    if !protected.is_empty() {
        lines.push(String::new());
        lines.push("Protected:".to_string());
        for branch in protected {
            if branch.is_default {
                lines.push(format!("  - {} (default)", branch.name));
            } else {
                lines.push(format!("  - {}", branch.name));
            }
        }
    }

    lines.join("\n")
}
