//! Common utility functions shared by the SDK and the tool servers

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Redaction patterns applied before log output leaves the SDK
static REDACTIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)bearer [A-Za-z0-9\-_\.]+", "Bearer [REDACTED]"),
        (r"(?i)token [A-Za-z0-9\-_\.]+", "token [REDACTED]"),
        (r"(?i)gh[pousr]_[A-Za-z0-9]+", "[REDACTED]"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Parse a GitHub API timestamp (ISO 8601, `Z`-suffixed) into a DateTime.
///
/// Returns None for empty or malformed input rather than failing the
/// surrounding operation.
pub fn parse_github_datetime(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?;
    if value.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whole days elapsed between the given instant and now
pub fn days_ago(date: Option<DateTime<Utc>>) -> Option<i64> {
    date.map(|d| (Utc::now() - d).num_days())
}

/// Truncate a string to a maximum length, adding ellipsis if truncated
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    }
}

/// Sanitize a string for logging (redact credential-looking patterns)
pub fn sanitize_for_logging(s: &str) -> String {
    let mut result = s.to_string();
    for (re, replacement) in REDACTIONS.iter() {
        result = re.replace_all(&result, *replacement).to_string();
    }
    result
}

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Share of `part` in `total` as a percentage, rounded to two decimals
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parses_github_timestamps() {
        let dt = parse_github_datetime(Some("2024-03-01T12:30:00Z"));
        assert!(dt.is_some());
        assert_eq!(dt.map(|d| d.timestamp()), Some(1_709_296_200));

        assert!(parse_github_datetime(Some("")).is_none());
        assert!(parse_github_datetime(Some("yesterday")).is_none());
        assert!(parse_github_datetime(None).is_none());
    }

    #[test]
    fn days_ago_counts_whole_days() {
        let three_days = Utc::now() - Duration::days(3);
        assert_eq!(days_ago(Some(three_days)), Some(3));
        assert_eq!(days_ago(None), None);
    }

    #[test]
    fn truncates_long_strings() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("hi", 2), "hi");
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(percentage(75, 100), 75.0);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn redacts_tokens_from_log_output() {
        let input = "Authorization: token ghp_abc123SECRET failed";
        let output = sanitize_for_logging(input);
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("ghp_abc123SECRET"));
    }
}
