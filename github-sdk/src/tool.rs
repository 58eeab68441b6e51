//! Tool operation boundary
//!
//! Every tool operation returns a [`ToolResult`]: a human-readable text
//! rendering AND a structured payload, plus an operation-scoped metadata
//! map. Callers rely on both shapes always being present on success.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GitHubError, Result};

/// Dual-shaped result of one tool operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Human-readable rendering
    pub text: String,

    /// Structured payload
    pub data: Value,

    /// Operation-scoped metadata
    pub meta: HashMap<String, String>,
}

impl ToolResult {
    /// Create a result with both shapes populated
    pub fn new(text: impl Into<String>, data: Value) -> Self {
        Self {
            text: text.into(),
            data,
            meta: HashMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Named parameters of an inbound tool request
#[derive(Debug, Clone)]
pub struct ToolParams(Value);

impl ToolParams {
    /// Wrap a JSON parameter object. Anything other than an object or null
    /// is rejected before it reaches a tool.
    pub fn new(value: Value) -> Result<Self> {
        match value {
            Value::Object(_) => Ok(Self(value)),
            Value::Null => Ok(Self(Value::Object(serde_json::Map::new()))),
            other => Err(GitHubError::validation(format!(
                "Tool parameters must be a JSON object, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Deserialize the whole parameter object into a typed request
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.0.clone())
            .map_err(|e| GitHubError::validation(format!("Invalid parameters: {}", e)))
    }

    /// Fetch a required string parameter
    pub fn required_str(&self, key: &str) -> Result<String> {
        match self.0.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::String(_)) => Err(GitHubError::validation(format!(
                "Parameter '{}' must not be empty",
                key
            ))),
            Some(other) => Err(GitHubError::validation(format!(
                "Parameter '{}' must be a string, got {}",
                key,
                type_name(other)
            ))),
            None => Err(GitHubError::validation(format!(
                "Missing required parameter: {}",
                key
            ))),
        }
    }

    /// Fetch an optional string parameter
    pub fn optional_str(&self, key: &str) -> Result<Option<String>> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(GitHubError::validation(format!(
                "Parameter '{}' must be a string, got {}",
                key,
                type_name(other)
            ))),
        }
    }

    /// Fetch an integer parameter with a default
    pub fn u64_or(&self, key: &str, default: u64) -> Result<u64> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Number(n)) => n.as_u64().ok_or_else(|| {
                GitHubError::validation(format!(
                    "Parameter '{}' must be a non-negative integer",
                    key
                ))
            }),
            Some(other) => Err(GitHubError::validation(format!(
                "Parameter '{}' must be an integer, got {}",
                key,
                type_name(other)
            ))),
        }
    }
}

/// HTTP status a tool server responds with for an error of this kind
pub fn http_status_for(err: &GitHubError) -> u16 {
    match err.code() {
        "validation" => 400,
        "authentication" => 401,
        "authorization" => 403,
        "not_found" => 404,
        "rate_limited" => 429,
        "timeout" | "network" | "upstream_server" => 502,
        _ => 500,
    }
}

/// Validate an owner/repository identifier pair
pub fn validate_repo_ref(owner: &str, repo: &str) -> Result<()> {
    for (name, value) in [("owner", owner), ("repo", repo)] {
        if value.is_empty() {
            return Err(GitHubError::validation(format!(
                "Parameter '{}' must not be empty",
                name
            )));
        }

        if value.contains('/') || value.chars().any(char::is_whitespace) {
            return Err(GitHubError::validation(format!(
                "Parameter '{}' contains invalid characters: {}",
                name, value
            )));
        }
    }

    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_must_be_an_object() {
        assert!(ToolParams::new(json!({"owner": "octocat"})).is_ok());
        assert!(ToolParams::new(Value::Null).is_ok());
        assert!(ToolParams::new(json!([1, 2])).is_err());
    }

    #[test]
    fn required_str_rejects_missing_and_empty() {
        let params = ToolParams::new(json!({"owner": "octocat", "repo": ""})).unwrap();

        assert_eq!(params.required_str("owner").unwrap(), "octocat");
        assert!(params.required_str("repo").is_err());
        assert!(params.required_str("absent").is_err());
    }

    #[test]
    fn u64_or_applies_default() {
        let params = ToolParams::new(json!({"top_n": 5})).unwrap();

        assert_eq!(params.u64_or("top_n", 10).unwrap(), 5);
        assert_eq!(params.u64_or("absent", 10).unwrap(), 10);

        let bad = ToolParams::new(json!({"top_n": "five"})).unwrap();
        assert!(bad.u64_or("top_n", 10).is_err());
    }

    #[test]
    fn error_kinds_map_to_http_statuses() {
        assert_eq!(http_status_for(&GitHubError::validation("x")), 400);
        assert_eq!(http_status_for(&GitHubError::authentication("x")), 401);
        assert_eq!(http_status_for(&GitHubError::not_found("x")), 404);
        assert_eq!(http_status_for(&GitHubError::rate_limited("x")), 429);
        assert_eq!(http_status_for(&GitHubError::timeout("x")), 502);
        assert_eq!(http_status_for(&GitHubError::unexpected("x")), 500);
    }

    #[test]
    fn repo_ref_validation() {
        assert!(validate_repo_ref("octocat", "hello-world").is_ok());
        assert!(validate_repo_ref("", "repo").is_err());
        assert!(validate_repo_ref("a/b", "repo").is_err());
        assert!(validate_repo_ref("owner", "re po").is_err());
    }
}
