//! GitHub API client
//!
//! `GitHubClient` is the resilient call primitive every tool operation is
//! built on. Each logical call:
//!
//! 1. acquires a permit from the shared [`RateBudget`](crate::rate_limit::RateBudget)
//!    before any network send,
//! 2. classifies the raw result with the pure
//!    [`RetryPolicy`](crate::resilience::RetryPolicy) decision function,
//! 3. retries transient failures with exponential backoff up to the
//!    attempt budget, and
//! 4. translates terminal failures into the
//!    [`GitHubError`](crate::error::GitHubError) taxonomy before they
//!    reach the caller.

mod api;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use backoff::backoff::Backoff;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::GitHubConfig;
use crate::error::{mapping, ErrorContext, GitHubError, Result};
use crate::progress::ProgressSink;
use crate::rate_limit::RateBudget;
use crate::resilience::{Disposition, RetryPolicy};
use crate::util::{sanitize_for_logging, truncate_string};

/// Media type GitHub expects on every request
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// User agent identifying the tool servers to GitHub
const USER_AGENT: &str = "RepoInsight/0.1.0 (github-sdk)";

/// Remaining-quota level below which an advisory is emitted
const DEFAULT_LOW_QUOTA_WATERMARK: u32 = 100;

/// Successful outcome of one logical call
#[derive(Debug, Clone)]
pub struct CallSuccess {
    /// HTTP status of the final attempt
    pub status: u16,

    /// Parsed JSON payload
    pub payload: Value,

    /// Value of `X-RateLimit-Remaining` on the final response, if present
    pub rate_remaining: Option<u32>,
}

/// Resilient GitHub API client
pub struct GitHubClient {
    http: reqwest::Client,
    config: GitHubConfig,
    policy: RetryPolicy,
    budget: Arc<RateBudget>,
    low_quota_watermark: u32,
}

impl GitHubClient {
    /// Create a new builder for the client
    pub fn builder() -> GitHubClientBuilder {
        GitHubClientBuilder::default()
    }

    /// The configured base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// The shared rate budget backing this client
    pub fn rate_budget(&self) -> &Arc<RateBudget> {
        &self.budget
    }

    /// The retry policy applied to every call
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute a GET request against an API endpoint
    pub async fn get(
        &self,
        endpoint: &str,
        query: Option<HashMap<String, String>>,
        sink: &dyn ProgressSink,
    ) -> Result<CallSuccess> {
        self.execute(Method::GET, endpoint, query, sink).await
    }

    /// Execute a GET request and deserialize the payload
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Option<HashMap<String, String>>,
        sink: &dyn ProgressSink,
    ) -> Result<T> {
        let success = self.get(endpoint, query, sink).await?;
        serde_json::from_value(success.payload).map_err(|e| {
            GitHubError::parsing(format!("Unexpected response shape from {}: {}", endpoint, e))
                .with_context(ErrorContext::for_endpoint(endpoint).status_code(success.status))
        })
    }

    /// Execute a request with the configured attempt budget
    pub async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<HashMap<String, String>>,
        sink: &dyn ProgressSink,
    ) -> Result<CallSuccess> {
        self.execute_with_attempts(method, endpoint, query, self.policy.max_attempts, sink)
            .await
    }

    /// Execute a request, retrying transient failures up to `max_attempts`
    /// total tries. Always returns a terminal outcome.
    pub async fn execute_with_attempts(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<HashMap<String, String>>,
        max_attempts: u32,
        sink: &dyn ProgressSink,
    ) -> Result<CallSuccess> {
        let url = self.endpoint_url(endpoint)?;
        let mut schedule = self.policy.backoff();
        let mut last_failure: Option<GitHubError> = None;
        let mut last_status: Option<u16> = None;

        for attempt in 0..max_attempts {
            // No permit, no call.
            self.budget.acquire().await;

            let mut request = self.http.request(method.clone(), url.clone());
            if let Some(ref q) = query {
                request = request.query(q);
            }

            let failure = match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    match self.policy.classify_status(status.as_u16()) {
                        Disposition::Success => {
                            let remaining = rate_remaining(response.headers());
                            self.advise_low_quota(remaining, sink).await;

                            let payload = response.json::<Value>().await.map_err(|e| {
                                GitHubError::from(e).with_context(
                                    ErrorContext::for_endpoint(endpoint)
                                        .status_code(status.as_u16()),
                                )
                            })?;

                            return Ok(CallSuccess {
                                status: status.as_u16(),
                                payload,
                                rate_remaining: remaining,
                            });
                        }
                        disposition => {
                            last_status = Some(status.as_u16());
                            let body = response.text().await.unwrap_or_default();
                            log::debug!(
                                "GitHub API {} {} -> {}: {}",
                                method,
                                endpoint,
                                status,
                                sanitize_for_logging(&truncate_string(&body, 200))
                            );

                            let err = mapping::map_status_error(status, &body);
                            if disposition == Disposition::Terminal {
                                return Err(err.with_context(
                                    ErrorContext::for_endpoint(endpoint)
                                        .status_code(status.as_u16())
                                        .attempts(attempt + 1),
                                ));
                            }
                            err
                        }
                    }
                }
                Err(transport) => {
                    let disposition = self.policy.classify_transport(&transport);
                    let err = GitHubError::from(transport);

                    if disposition == Disposition::Terminal {
                        return Err(err.with_context(
                            ErrorContext::for_endpoint(endpoint).attempts(attempt + 1),
                        ));
                    }
                    err
                }
            };

            // Transient failure: back off if the budget allows another try.
            if attempt + 1 < max_attempts {
                let delay = schedule
                    .next_backoff()
                    .unwrap_or_else(|| self.policy.delay_for_attempt(attempt));

                sink.info(&format!(
                    "Transient failure on {} ({}), retrying {}/{} in {:.1}s",
                    endpoint,
                    failure.code(),
                    attempt + 2,
                    max_attempts,
                    delay.as_secs_f64()
                ))
                .await;

                last_failure = Some(failure);
                tokio::time::sleep(delay).await;
            } else {
                last_failure = Some(failure);
            }
        }

        // Attempt budget exhausted. The loop always records the failure it
        // observed; the synthesized fallback below can only fire when no
        // attempt ran at all, and still names the endpoint.
        let mut context = ErrorContext::for_endpoint(endpoint).attempts(max_attempts);
        if let Some(status) = last_status {
            context = context.status_code(status);
        }

        match last_failure {
            Some(err) => Err(err.with_context(context)),
            None => Err(GitHubError::unexpected(format!(
                "retry budget exhausted without a recorded failure for {}",
                endpoint
            ))
            .with_context(context)),
        }
    }

    /// Emit the non-fatal remaining-quota advisory. Never affects control
    /// flow.
    async fn advise_low_quota(&self, remaining: Option<u32>, sink: &dyn ProgressSink) {
        if let Some(remaining) = remaining {
            if remaining < self.low_quota_watermark {
                sink.warn(&format!(
                    "{} GitHub API requests remaining before the upstream quota resets",
                    remaining
                ))
                .await;
            }
        }
    }

    /// Resolve an endpoint path against the configured base URL
    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );

        Url::parse(&joined)
            .map_err(|e| GitHubError::configuration(format!("Invalid endpoint URL {}: {}", joined, e)))
    }
}

/// Parse the remaining-quota header, when the upstream response carries one
fn rate_remaining(headers: &HeaderMap) -> Option<u32> {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u32>().ok())
}

/// Builder for the GitHub client
#[derive(Default)]
pub struct GitHubClientBuilder {
    config: Option<GitHubConfig>,
    token: Option<String>,
    base_url: Option<String>,
    timeout_seconds: Option<u64>,
    policy: Option<RetryPolicy>,
    budget: Option<Arc<RateBudget>>,
    low_quota_watermark: Option<u32>,
}

impl GitHubClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded configuration section
    pub fn config(mut self, config: GitHubConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the access token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the per-request timeout in seconds
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Set the retry policy
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Share an externally constructed rate budget.
    ///
    /// Every client built from the same `Arc` draws from one budget, which
    /// is how a process keeps its aggregate call rate bounded.
    pub fn rate_budget(mut self, budget: Arc<RateBudget>) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Override the remaining-quota advisory threshold
    pub fn low_quota_watermark(mut self, watermark: u32) -> Self {
        self.low_quota_watermark = Some(watermark);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<GitHubClient> {
        let mut config = self.config.unwrap_or_default();

        if let Some(token) = self.token {
            config.token = Some(token);
        }
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(timeout) = self.timeout_seconds {
            config.timeout_seconds = timeout;
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));

        if let Some(ref token) = config.token {
            let value = HeaderValue::from_str(&format!("token {}", token))
                .map_err(|e| GitHubError::configuration(format!("Invalid token value: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .build()
            .map_err(|e| {
                GitHubError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        let policy = self.policy.unwrap_or_else(|| config.retry_policy());
        let budget = self.budget.unwrap_or_else(|| {
            Arc::new(RateBudget::new(
                config.rate_permits,
                Duration::from_millis(config.rate_window_ms),
            ))
        });

        Ok(GitHubClient {
            http,
            config,
            policy,
            budget,
            low_quota_watermark: self
                .low_quota_watermark
                .unwrap_or(DEFAULT_LOW_QUOTA_WATERMARK),
        })
    }
}
