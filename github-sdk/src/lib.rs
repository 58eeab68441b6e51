//! # GitHub SDK
//!
//! The shared GitHub API access layer for the RepoInsight tool servers.
//!
//! This crate is the single source of truth for the behavior every tool
//! server needs when talking to GitHub:
//!
//! - A resilient call primitive: rate limiting, bounded exponential-backoff
//!   retry on transient conditions, and translation of terminal failures
//!   into a closed error taxonomy
//! - A fan-out aggregator comparing several repositories concurrently,
//!   tolerant of partial failure
//! - Configuration management, typed payload models, and the dual-shaped
//!   tool result contract shared by every server
//!
//! ## Architecture
//!
//! - `GitHubClient`: the retry + rate-limit + error-translation wrapper
//!   around each upstream request
//! - `RateBudget`: the injected permit source bounding the aggregate
//!   outbound call rate of a process
//! - `RetryPolicy`: the pure transient-vs-terminal decision function and
//!   backoff schedule
//! - `compare`: the concurrent multi-repository comparison
//! - `ProgressSink`: the advisory observability boundary
//! - `ToolResult`: the text + structured + meta result every tool returns

// Re-export the client
pub mod client;
pub use client::{CallSuccess, GitHubClient, GitHubClientBuilder};

// Re-export error handling
pub mod error;
pub use error::{ErrorContext, GitHubError, Result};

// Re-export resilience policy
pub mod resilience;
pub use resilience::{Disposition, RetryPolicy};

// Re-export the rate budget
pub mod rate_limit;
pub use rate_limit::RateBudget;

// Re-export configuration management
pub mod config;
pub use config::{ConfigProvider, ConfigProviderExt, EnvConfigProvider, GitHubConfig, ServerConfig};

// Re-export the comparison aggregator
pub mod compare;

// Payload models and shared tool plumbing
pub mod models;
pub mod progress;
pub mod tool;
pub mod util;

pub use progress::{LogSink, NoopSink, ProgressSink};
pub use tool::{http_status_for, ToolParams, ToolResult};

#[cfg(test)]
mod tests;
