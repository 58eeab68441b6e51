//! Mapping of raw GitHub API responses to the normalized error taxonomy
//!
//! Terminal HTTP statuses are translated here into caller-facing errors so
//! that no raw transport detail crosses the SDK boundary.

use reqwest::StatusCode;
use serde_json::Value;

use super::GitHubError;

/// Map a terminal HTTP status and response body to a GitHubError.
///
/// The body is consulted for GitHub's `{"message": ...}` shape; when absent
/// a fixed per-status description is used instead.
pub fn map_status_error(status: StatusCode, body: &str) -> GitHubError {
    let detail = extract_message(body);

    match status {
        StatusCode::UNAUTHORIZED => GitHubError::authentication(
            detail.unwrap_or_else(|| "Authentication failed. Check the GitHub token.".to_string()),
        ),
        StatusCode::FORBIDDEN => GitHubError::authorization(
            detail.unwrap_or_else(|| "Access denied. Check the token's permissions.".to_string()),
        ),
        StatusCode::NOT_FOUND => GitHubError::not_found(
            detail.unwrap_or_else(|| "Resource not found. Check owner and repo.".to_string()),
        ),
        StatusCode::TOO_MANY_REQUESTS => GitHubError::rate_limited(
            detail.unwrap_or_else(|| "GitHub API request quota exhausted.".to_string()),
        ),
        StatusCode::BAD_REQUEST => GitHubError::validation(
            detail.unwrap_or_else(|| "GitHub rejected the request parameters.".to_string()),
        ),
        s if s.is_server_error() => GitHubError::upstream_server(
            detail.unwrap_or_else(|| format!("GitHub API server error (status {})", s.as_u16())),
        ),
        s => GitHubError::unexpected(
            detail.unwrap_or_else(|| format!("Unhandled API status {}", s.as_u16())),
        ),
    }
}

/// Pull GitHub's error message out of a JSON body, if present
fn extract_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body).ok()?;
    json.get("message")
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}
