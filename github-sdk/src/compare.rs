//! Multi-repository comparison
//!
//! The fan-out aggregator: one concurrent snapshot task per target, joined
//! as a group, tolerant of partial failure. A failed target keeps its slot
//! in the report with its error recorded; rankings are derived only from
//! the targets that succeeded.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::client::GitHubClient;
use crate::error::{GitHubError, Result};
use crate::progress::ProgressSink;
use crate::util::{days_ago, parse_github_datetime};

/// Minimum number of comparison targets
pub const MIN_TARGETS: usize = 2;

/// Maximum number of comparison targets
pub const MAX_TARGETS: usize = 5;

/// Metric names reported when the caller does not restrict them
pub const DEFAULT_METRICS: [&str; 6] = [
    "open_issues",
    "open_prs",
    "stars",
    "forks",
    "watchers",
    "last_commit_age",
];

/// Table value for targets whose last-commit age is unknown
const AGE_UNKNOWN: i64 = 9999;

/// One repository submitted for comparison
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComparisonTarget {
    pub owner: String,
    pub repo: String,
}

impl ComparisonTarget {
    /// Create a target from an owner/name pair
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// The `owner/repo` identity used as a key in the report
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Metric bag collected for one target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySnapshot {
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
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Terminal state of one target's snapshot task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetOutcome {
    /// The snapshot was collected
    Succeeded { metrics: RepositorySnapshot },

    /// The target failed; its slot is retained with the error recorded
    Failed { code: String, error: String },
}

impl TargetOutcome {
    /// The snapshot, when this target succeeded
    pub fn metrics(&self) -> Option<&RepositorySnapshot> {
        match self {
            TargetOutcome::Succeeded { metrics } => Some(metrics),
            TargetOutcome::Failed { .. } => None,
        }
    }
}

/// One slot of the aggregate report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetReport {
    #[serde(flatten)]
    pub target: ComparisonTarget,
    #[serde(flatten)]
    pub outcome: TargetOutcome,
}

/// Cross-target rankings, derived from successful targets only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rankings {
    /// Target with the smallest last-commit age
    pub most_active: Option<String>,

    /// Target with the most stars
    pub most_popular: Option<String>,

    /// Target with the most forks
    pub most_forked: Option<String>,
}

/// Aggregate result of one comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Per-target slots in input order, failed targets included
    pub targets: Vec<TargetReport>,

    /// Requested metric tables over the successful targets
    pub metrics: BTreeMap<String, BTreeMap<String, i64>>,

    /// Rankings over the successful targets; empty when none succeeded
    pub rankings: Rankings,

    pub compared_at: DateTime<Utc>,
}

/// Compare 2 to 5 repositories concurrently.
///
/// Target count and distinctness are validated before any network call.
/// Each target resolves independently through its own sequence of resilient
/// calls; one target's failure never delays or aborts the others.
pub async fn compare(
    client: &GitHubClient,
    targets: &[ComparisonTarget],
    metric_names: Option<&[String]>,
    sink: &dyn ProgressSink,
) -> Result<ComparisonReport> {
    validate_targets(targets)?;

    sink.info(&format!(
        "Comparing {} repositories: {}",
        targets.len(),
        targets
            .iter()
            .map(ComparisonTarget::slug)
            .collect::<Vec<_>>()
            .join(", ")
    ))
    .await;
    sink.progress(0, targets.len() as u32).await;

    let tasks = targets.iter().map(|target| async move {
        let outcome = match snapshot_target(client, target, sink).await {
            Ok(metrics) => TargetOutcome::Succeeded { metrics },
            Err(err) => {
                sink.error(&format!("Failed to fetch {}: {}", target.slug(), err))
                    .await;
                TargetOutcome::Failed {
                    code: err.code().to_string(),
                    error: err.to_string(),
                }
            }
        };

        TargetReport {
            target: target.clone(),
            outcome,
        }
    });

    // Joining here guarantees every task reaches a terminal state before
    // the report is assembled; nothing is left detached.
    let reports = join_all(tasks).await;
    sink.progress(targets.len() as u32, targets.len() as u32).await;

    let metrics = build_metric_tables(&reports, metric_names);
    let rankings = build_rankings(&reports);

    let succeeded = reports
        .iter()
        .filter(|r| r.outcome.metrics().is_some())
        .count();
    sink.info(&format!(
        "Comparison finished: {}/{} targets succeeded",
        succeeded,
        reports.len()
    ))
    .await;

    Ok(ComparisonReport {
        targets: reports,
        metrics,
        rankings,
        compared_at: Utc::now(),
    })
}

/// Reject comparisons outside the 2..=5 target range, or with duplicates
fn validate_targets(targets: &[ComparisonTarget]) -> Result<()> {
    if targets.len() < MIN_TARGETS {
        return Err(GitHubError::validation(format!(
            "At least {} repositories are required for a comparison, got {}",
            MIN_TARGETS,
            targets.len()
        )));
    }

    if targets.len() > MAX_TARGETS {
        return Err(GitHubError::validation(format!(
            "At most {} repositories can be compared at once, got {}",
            MAX_TARGETS,
            targets.len()
        )));
    }

    let mut seen = HashSet::new();
    for target in targets {
        crate::tool::validate_repo_ref(&target.owner, &target.repo)?;
        if !seen.insert(target) {
            return Err(GitHubError::validation(format!(
                "Duplicate comparison target: {}",
                target.slug()
            )));
        }
    }

    Ok(())
}

/// Collect the metric bag for one target.
///
/// Metadata is required; the PR-count and latest-commit sub-calls are
/// tolerated individually and fall back to 0 / unknown, matching the
/// behavior callers of the comparison have come to rely on.
async fn snapshot_target(
    client: &GitHubClient,
    target: &ComparisonTarget,
    sink: &dyn ProgressSink,
) -> Result<RepositorySnapshot> {
    let repo = client.repository(&target.owner, &target.repo, sink).await?;

    let open_prs_count = client
        .open_pull_request_count(&target.owner, &target.repo, sink)
        .await
        .unwrap_or(0);

    let last_commit = client
        .latest_commit(&target.owner, &target.repo, sink)
        .await
        .ok()
        .flatten();
    let last_commit_date =
        last_commit.and_then(|c| parse_github_datetime(c.commit.author.date.as_deref()));

    Ok(RepositorySnapshot {
        owner: target.owner.clone(),
        repo: target.repo.clone(),
        open_issues_count: repo.open_issues_count.saturating_sub(open_prs_count),
        open_prs_count,
        stars_count: repo.stargazers_count,
        forks_count: repo.forks_count,
        watchers_count: repo.watchers_count,
        last_commit_date,
        last_commit_age_days: days_ago(last_commit_date),
        language: repo.language,
        is_archived: repo.archived,
        is_disabled: repo.disabled,
        pushed_at: parse_github_datetime(repo.pushed_at.as_deref()),
    })
}

/// Build the requested metric tables over the successful targets.
/// Unknown metric names are dropped from the request.
fn build_metric_tables(
    reports: &[TargetReport],
    metric_names: Option<&[String]>,
) -> BTreeMap<String, BTreeMap<String, i64>> {
    let requested: Vec<&str> = match metric_names {
        Some(names) => DEFAULT_METRICS
            .iter()
            .copied()
            .filter(|known| names.iter().any(|n| n == known))
            .collect(),
        None => DEFAULT_METRICS.to_vec(),
    };

    let mut tables = BTreeMap::new();

    for name in requested {
        let mut table = BTreeMap::new();

        for report in reports {
            let Some(snapshot) = report.outcome.metrics() else {
                continue;
            };

            let value = match name {
                "open_issues" => snapshot.open_issues_count as i64,
                "open_prs" => snapshot.open_prs_count as i64,
                "stars" => snapshot.stars_count as i64,
                "forks" => snapshot.forks_count as i64,
                "watchers" => snapshot.watchers_count as i64,
                "last_commit_age" => snapshot.last_commit_age_days.unwrap_or(AGE_UNKNOWN),
                _ => continue,
            };

            table.insert(report.target.slug(), value);
        }

        tables.insert(name.to_string(), table);
    }

    tables
}

/// Derive rankings from the successful targets, ties broken by input order
fn build_rankings(reports: &[TargetReport]) -> Rankings {
    let successes: Vec<(String, &RepositorySnapshot)> = reports
        .iter()
        .filter_map(|r| r.outcome.metrics().map(|m| (r.target.slug(), m)))
        .collect();

    if successes.is_empty() {
        return Rankings::default();
    }

    let most_popular = successes
        .iter()
        .fold(None::<(&str, u64)>, |best, (slug, snap)| match best {
            Some((_, stars)) if stars >= snap.stars_count => best,
            _ => Some((slug.as_str(), snap.stars_count)),
        })
        .map(|(slug, _)| slug.to_string());

    let most_forked = successes
        .iter()
        .fold(None::<(&str, u64)>, |best, (slug, snap)| match best {
            Some((_, forks)) if forks >= snap.forks_count => best,
            _ => Some((slug.as_str(), snap.forks_count)),
        })
        .map(|(slug, _)| slug.to_string());

    let most_active = successes
        .iter()
        .filter_map(|(slug, snap)| snap.last_commit_age_days.map(|age| (slug.as_str(), age)))
        .fold(None::<(&str, i64)>, |best, (slug, age)| match best {
            Some((_, best_age)) if best_age <= age => best,
            _ => Some((slug, age)),
        })
        .map(|(slug, _)| slug.to_string());

    Rankings {
        most_active,
        most_popular,
        most_forked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(owner: &str, repo: &str, stars: u64, forks: u64, age: Option<i64>) -> TargetReport {
        TargetReport {
            target: ComparisonTarget::new(owner, repo),
            outcome: TargetOutcome::Succeeded {
                metrics: RepositorySnapshot {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    open_issues_count: 0,
                    open_prs_count: 0,
                    stars_count: stars,
                    forks_count: forks,
                    watchers_count: 0,
                    last_commit_date: None,
                    last_commit_age_days: age,
                    language: None,
                    is_archived: false,
                    is_disabled: false,
                    pushed_at: None,
                },
            },
        }
    }

    fn failed(owner: &str, repo: &str) -> TargetReport {
        TargetReport {
            target: ComparisonTarget::new(owner, repo),
            outcome: TargetOutcome::Failed {
                code: "not_found".to_string(),
                error: "Not found".to_string(),
            },
        }
    }

    #[test]
    fn rankings_pick_popularity_and_activity() {
        let reports = vec![
            snapshot("a", "x", 100, 10, Some(2)),
            snapshot("b", "y", 500, 50, Some(30)),
        ];

        let rankings = build_rankings(&reports);
        assert_eq!(rankings.most_popular.as_deref(), Some("b/y"));
        assert_eq!(rankings.most_forked.as_deref(), Some("b/y"));
        assert_eq!(rankings.most_active.as_deref(), Some("a/x"));
    }

    #[test]
    fn ranking_ties_go_to_first_occurrence() {
        let reports = vec![
            snapshot("a", "x", 100, 5, Some(7)),
            snapshot("b", "y", 100, 5, Some(7)),
        ];

        let rankings = build_rankings(&reports);
        assert_eq!(rankings.most_popular.as_deref(), Some("a/x"));
        assert_eq!(rankings.most_forked.as_deref(), Some("a/x"));
        assert_eq!(rankings.most_active.as_deref(), Some("a/x"));
    }

    #[test]
    fn rankings_skip_failed_targets() {
        let reports = vec![
            failed("a", "x"),
            snapshot("b", "y", 10, 1, Some(5)),
            snapshot("c", "z", 20, 2, None),
        ];

        let rankings = build_rankings(&reports);
        assert_eq!(rankings.most_popular.as_deref(), Some("c/z"));
        // Only b/y has a known commit age.
        assert_eq!(rankings.most_active.as_deref(), Some("b/y"));
    }

    #[test]
    fn rankings_empty_when_nothing_succeeded() {
        let reports = vec![failed("a", "x"), failed("b", "y")];

        let rankings = build_rankings(&reports);
        assert!(rankings.most_active.is_none());
        assert!(rankings.most_popular.is_none());
        assert!(rankings.most_forked.is_none());
    }

    #[test]
    fn metric_tables_honor_the_requested_subset() {
        let reports = vec![
            snapshot("a", "x", 100, 10, Some(2)),
            snapshot("b", "y", 500, 50, None),
        ];

        let names = vec!["stars".to_string(), "last_commit_age".to_string(), "bogus".to_string()];
        let tables = build_metric_tables(&reports, Some(&names));

        assert_eq!(tables.len(), 2);
        assert_eq!(tables["stars"]["a/x"], 100);
        assert_eq!(tables["last_commit_age"]["b/y"], AGE_UNKNOWN);
        assert!(!tables.contains_key("bogus"));
    }

    #[test]
    fn target_count_is_validated() {
        let one = vec![ComparisonTarget::new("a", "x")];
        assert!(validate_targets(&one).is_err());

        let six: Vec<_> = (0..6)
            .map(|i| ComparisonTarget::new("o", format!("r{}", i)))
            .collect();
        assert!(validate_targets(&six).is_err());

        let two = vec![
            ComparisonTarget::new("a", "x"),
            ComparisonTarget::new("b", "y"),
        ];
        assert!(validate_targets(&two).is_ok());

        let five: Vec<_> = (0..5)
            .map(|i| ComparisonTarget::new("o", format!("r{}", i)))
            .collect();
        assert!(validate_targets(&five).is_ok());
    }

    #[test]
    fn duplicate_targets_are_rejected() {
        let dupes = vec![
            ComparisonTarget::new("a", "x"),
            ComparisonTarget::new("a", "x"),
        ];

        let err = validate_targets(&dupes).expect_err("duplicates must be rejected");
        assert_eq!(err.code(), "validation");
    }
}
