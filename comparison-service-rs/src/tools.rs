//! Tool implementation of the comparison service
//!
//! The compare tool itself lives in the SDK (it is the fan-out aggregator
//! shared with anything else that needs it); this module resolves the
//! request parameters and renders the report.

use serde::Deserialize;

use github_sdk::compare::{compare, ComparisonReport, ComparisonTarget, TargetOutcome};
use github_sdk::error::Result;
use github_sdk::progress::ProgressSink;
use github_sdk::{GitHubClient, ToolParams, ToolResult};

/// Request body of the compare tool
#[derive(Debug, Deserialize)]
struct CompareRequest {
    repositories: Vec<ComparisonTarget>,
    #[serde(default)]
    metrics: Option<Vec<String>>,
}

/// Compare 2 to 5 repositories and rank them
pub async fn compare_repositories(
    client: &GitHubClient,
    params: &ToolParams,
    sink: &dyn ProgressSink,
) -> Result<ToolResult> {
    let request: CompareRequest = params.parse()?;

    let report = compare(
        client,
        &request.repositories,
        request.metrics.as_deref(),
        sink,
    )
    .await?;

    let repo_names: Vec<String> = report.targets.iter().map(|t| t.target.slug()).collect();
    let metrics_compared: Vec<String> = report.metrics.keys().cloned().collect();

    let text = render_comparison_text(&report);

    Ok(ToolResult::new(text, serde_json::to_value(&report)?)
        .with_meta("operation", "compare_repositories")
        .with_meta("repositories", repo_names.join(","))
        .with_meta("metrics_compared", metrics_compared.join(",")))
}

/// Human-readable label of a metric table
fn metric_label(name: &str) -> &'static str {
    match name {
        "open_issues" => "Open issues",
        "open_prs" => "Open pull requests",
        "stars" => "Stars",
        "forks" => "Forks",
        "watchers" => "Watchers",
        "last_commit_age" => "Last commit age (days)",
        _ => "Metric",
    }
}

fn render_comparison_text(report: &ComparisonReport) -> String {
    let repo_names: Vec<String> = report.targets.iter().map(|t| t.target.slug()).collect();

    let mut lines = vec![
        "Repository comparison".to_string(),
        String::new(),
        format!("Compared repositories: {}", repo_names.join(", ")),
        format!(
            "Compared at: {}",
            report.compared_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
    ];

    let failed: Vec<String> = report
        .targets
        .iter()
        .filter_map(|t| match &t.outcome {
            TargetOutcome::Failed { error, .. } => Some(format!("  - {}: {}", t.target.slug(), error)),
            TargetOutcome::Succeeded { .. } => None,
        })
        .collect();

    if !failed.is_empty() {
        lines.push(String::new());
        lines.push("Unavailable repositories:".to_string());
        lines.extend(failed);
    }

    for (name, table) in &report.metrics {
        lines.push(String::new());
        lines.push(format!("{}:", metric_label(name)));

        for (slug, value) in table {
            if name == "last_commit_age" && *value == 9999 {
                lines.push(format!("  - {}: no data", slug));
            } else {
                lines.push(format!("  - {}: {}", slug, value));
            }
        }
    }

    let rankings = &report.rankings;
    if rankings.most_active.is_some()
        || rankings.most_popular.is_some()
        || rankings.most_forked.is_some()
    {
        lines.push(String::new());
        lines.push("Summary:".to_string());
        if let Some(ref slug) = rankings.most_active {
            lines.push(format!("  Most active: {}", slug));
        }
        if let Some(ref slug) = rankings.most_popular {
            lines.push(format!("  Most popular: {}", slug));
        }
        if let Some(ref slug) = rankings.most_forked {
            lines.push(format!("  Most forked: {}", slug));
        }
    }

    lines.join("\n")
}
