//! Configuration management for the tool servers
//!
//! This module provides utilities for loading and validating configuration
//! from environment variables, with in-memory and composite providers for
//! tests and layered setups.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GitHubError, Result};
use crate::resilience::RetryPolicy;

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get an integer configuration value
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value.parse::<i64>().map_err(|e| {
            GitHubError::configuration(format!("Invalid integer for key {}: {}", key, e))
        })
    }

    /// Get a float configuration value
    fn get_float(&self, key: &str) -> Result<f64> {
        let value = self.get_string(key)?;
        value.parse::<f64>().map_err(|e| {
            GitHubError::configuration(format!("Invalid float for key {}: {}", key, e))
        })
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get an integer configuration value with a default
    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    /// Get a float configuration value with a default
    fn get_float_or(&self, key: &str, default: f64) -> f64 {
        self.get_float(key).unwrap_or(default)
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Format a configuration key as an environment variable
    fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        env_key.push_str(
            &key.to_uppercase()
                .replace(|c: char| !c.is_ascii_alphanumeric(), "_"),
        );

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                GitHubError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => GitHubError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    /// Configuration values
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory config provider with initial values
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values.get(key).cloned().ok_or_else(|| {
            GitHubError::configuration(format!("Configuration key not found: {}", key))
        })
    }
}

/// A composite config provider that tries multiple providers in order
#[derive(Default)]
pub struct CompositeConfigProvider {
    /// Ordered list of config providers to try
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    /// Create a new composite config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider to the chain
    pub fn add_provider(&mut self, provider: impl ConfigProvider + 'static) {
        self.providers.push(Box::new(provider));
    }
}

impl ConfigProvider for CompositeConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        for provider in &self.providers {
            if let Ok(value) = provider.get_string(key) {
                return Ok(value);
            }
        }

        Err(GitHubError::configuration(format!(
            "Configuration key not found in any provider: {}",
            key
        )))
    }
}

/// Trait for validated configuration sections
pub trait ValidatedConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;
}

/// Configuration for the GitHub API client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Personal access token; requests go out unauthenticated when absent
    pub token: Option<String>,

    /// Base URL of the API
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Maximum attempts per logical call
    pub max_attempts: u32,

    /// Base backoff delay between attempts, in milliseconds
    pub retry_base_delay_ms: u64,

    /// Permits granted per rate window
    pub rate_permits: u32,

    /// Rate window length in milliseconds
    pub rate_window_ms: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: "https://api.github.com".to_string(),
            timeout_seconds: 20,
            max_attempts: 3,
            retry_base_delay_ms: 1_000,
            rate_permits: 1,
            rate_window_ms: 1_000,
        }
    }
}

impl GitHubConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            token: provider.get_string("github_token").ok(),
            base_url: provider.get_string_or("github_api_base_url", &defaults.base_url),
            timeout_seconds: provider
                .get_int_or("github_timeout_seconds", defaults.timeout_seconds as i64)
                as u64,
            max_attempts: provider.get_int_or("github_max_attempts", defaults.max_attempts as i64)
                as u32,
            retry_base_delay_ms: provider.get_int_or(
                "github_retry_base_delay_ms",
                defaults.retry_base_delay_ms as i64,
            ) as u64,
            rate_permits: provider.get_int_or("github_rate_permits", defaults.rate_permits as i64)
                as u32,
            rate_window_ms: provider
                .get_int_or("github_rate_window_ms", defaults.rate_window_ms as i64)
                as u64,
        };

        config.validate()?;
        Ok(config)
    }

    /// Build the retry policy described by this configuration
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            ..RetryPolicy::default()
        }
    }
}

impl ValidatedConfig for GitHubConfig {
    fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(GitHubError::configuration("GitHub base URL is required"));
        }

        if self.max_attempts == 0 {
            return Err(GitHubError::configuration(
                "max_attempts must be at least 1",
            ));
        }

        if self.rate_permits == 0 || self.rate_window_ms == 0 {
            return Err(GitHubError::configuration(
                "rate budget requires a non-zero permit count and window",
            ));
        }

        Ok(())
    }
}

/// Bind address configuration for a tool server process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to bind
    pub port: u16,
}

impl ServerConfig {
    /// Load the bind address from a config provider, falling back to the
    /// given default port
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P, default_port: u16) -> Self {
        Self {
            host: provider.get_string_or("host", "0.0.0.0"),
            port: provider.get_int_or("port", default_port as i64) as u16,
        }
    }
}

impl ValidatedConfig for ServerConfig {
    fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(GitHubError::configuration("bind host is required"));
        }

        Ok(())
    }
}
