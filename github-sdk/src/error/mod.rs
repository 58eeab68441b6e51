//! Error handling for the GitHub SDK
//!
//! This module provides the closed error taxonomy surfaced by every call
//! through the SDK:
//! - Categorizes failures by kind (authentication, rate limit, network, etc.)
//! - Attaches request context (endpoint, status, attempts) for debugging
//! - Exposes a stable machine-readable code per kind
//! - Provides a convenient Result type alias

use std::fmt;
use thiserror::Error;

pub mod mapping;

/// Result type for GitHub SDK operations
pub type Result<T> = std::result::Result<T, GitHubError>;

/// Main error type for the GitHub SDK
#[derive(Error, Debug)]
pub enum GitHubError {
    /// Credential missing or rejected (HTTP 401)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Credential lacks access to the resource (HTTP 403)
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Target resource does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream quota exhausted past the local retry budget (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// 5xx persisting past the retry budget
    #[error("Upstream server error: {0}")]
    UpstreamServer(String),

    /// Network timeout persisting past the retry budget
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Connection-level failure persisting past the retry budget
    #[error("Network error: {0}")]
    Network(String),

    /// Caller-supplied arguments failed local precondition checks;
    /// never retried, never sent upstream
    #[error("Validation error: {0}")]
    Validation(String),

    /// Response body could not be decoded
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Fallback catch-all; always carries the underlying description
    #[error("Unexpected error: {0}")]
    Unexpected(String),

    /// Errors with additional request context
    #[error("{inner}")]
    WithContext {
        inner: Box<GitHubError>,
        context: ErrorContext,
    },
}

impl GitHubError {
    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        GitHubError::Authentication(message.into())
    }

    /// Create an authorization error
    pub fn authorization(message: impl Into<String>) -> Self {
        GitHubError::Authorization(message.into())
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        GitHubError::NotFound(message.into())
    }

    /// Create a rate-limited error
    pub fn rate_limited(message: impl Into<String>) -> Self {
        GitHubError::RateLimited(message.into())
    }

    /// Create an upstream server error
    pub fn upstream_server(message: impl Into<String>) -> Self {
        GitHubError::UpstreamServer(message.into())
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        GitHubError::Timeout(message.into())
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        GitHubError::Network(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        GitHubError::Validation(message.into())
    }

    /// Create a parsing error
    pub fn parsing(message: impl Into<String>) -> Self {
        GitHubError::Parsing(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        GitHubError::Configuration(message.into())
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        GitHubError::Unexpected(message.into())
    }

    /// Add context to an existing error
    pub fn with_context(self, context: ErrorContext) -> Self {
        GitHubError::WithContext {
            inner: Box::new(self),
            context,
        }
    }

    /// Stable machine-readable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            GitHubError::Authentication(_) => "authentication",
            GitHubError::Authorization(_) => "authorization",
            GitHubError::NotFound(_) => "not_found",
            GitHubError::RateLimited(_) => "rate_limited",
            GitHubError::UpstreamServer(_) => "upstream_server",
            GitHubError::Timeout(_) => "timeout",
            GitHubError::Network(_) => "network",
            GitHubError::Validation(_) => "validation",
            GitHubError::Parsing(_) => "parsing",
            GitHubError::Configuration(_) => "configuration",
            GitHubError::Unexpected(_) => "unexpected",
            GitHubError::WithContext { inner, .. } => inner.code(),
        }
    }

    /// Get the HTTP status code if context carries one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GitHubError::WithContext { context, .. } => context.status_code,
            _ => None,
        }
    }

    /// Get the endpoint this error was observed on, if recorded
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            GitHubError::WithContext { context, .. } => context.endpoint.as_deref(),
            _ => None,
        }
    }

    /// Check if this is a transient error eligible for retry
    pub fn is_retryable(&self) -> bool {
        match self {
            GitHubError::Network(_) => true,
            GitHubError::Timeout(_) => true,
            GitHubError::RateLimited(_) => true,
            GitHubError::UpstreamServer(_) => true,
            GitHubError::WithContext { inner, .. } => inner.is_retryable(),
            _ => false,
        }
    }

    /// Check if this is a permanent error (not retryable)
    pub fn is_permanent(&self) -> bool {
        !self.is_retryable()
    }
}

/// Request context attached to errors leaving the call primitive
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Endpoint that was called
    pub endpoint: Option<String>,

    /// HTTP status code of the last observed response, if any
    pub status_code: Option<u16>,

    /// Number of attempts performed before the error became terminal
    pub attempts: Option<u32>,

    /// Request ID for correlating log output
    pub request_id: Option<String>,
}

impl ErrorContext {
    /// Create an empty error context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for a specific endpoint
    pub fn for_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    /// Add an HTTP status code
    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Add the attempt count
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    /// Add a request ID
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref endpoint) = self.endpoint {
            write!(f, "endpoint={}", endpoint)?;
        }
        if let Some(status) = self.status_code {
            write!(f, " status={}", status)?;
        }
        if let Some(attempts) = self.attempts {
            write!(f, " attempts={}", attempts)?;
        }
        Ok(())
    }
}

/// Convert reqwest errors to GitHubError
impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GitHubError::timeout(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            GitHubError::network(format!("Connection error: {}", err))
        } else if err.is_decode() {
            GitHubError::parsing(format!("Response decode error: {}", err))
        } else if err.is_request() {
            GitHubError::validation(format!("Invalid request: {}", err))
        } else {
            GitHubError::network(format!("HTTP transport error: {}", err))
        }
    }
}

/// Convert serde_json errors to GitHubError
impl From<serde_json::Error> for GitHubError {
    fn from(err: serde_json::Error) -> Self {
        GitHubError::parsing(format!("JSON error: {}", err))
    }
}
