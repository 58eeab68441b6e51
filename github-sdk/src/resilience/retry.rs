//! Retry policy with exponential backoff for transient failures
//!
//! Classification of a raw attempt result is a pure function over the HTTP
//! status (or transport error), kept separate from the transport layer so
//! the retriable-vs-terminal decision can be tested in isolation.

use std::time::Duration;

use backoff::ExponentialBackoff;

/// HTTP statuses treated as transient
pub const DEFAULT_RETRIABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// What to do with the raw result of a single attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// 2xx response; the logical call is done
    Success,

    /// Transient condition; retry if the attempt budget allows
    Transient,

    /// Terminal condition; surface immediately without retry
    Terminal,
}

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum total attempts per logical call (1 means no retries)
    pub max_attempts: u32,

    /// Backoff before attempt i+1 is `base_delay * 2^i`
    pub base_delay: Duration,

    /// Statuses classified as transient
    pub retriable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            retriable_statuses: DEFAULT_RETRIABLE_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Classify an HTTP status code
    pub fn classify_status(&self, status: u16) -> Disposition {
        if (200..300).contains(&status) {
            Disposition::Success
        } else if self.retriable_statuses.contains(&status) {
            Disposition::Transient
        } else {
            Disposition::Terminal
        }
    }

    /// Classify a transport-level failure. Timeouts and connection errors
    /// are transient; anything else (request construction, decode) is not.
    pub fn classify_transport(&self, err: &reqwest::Error) -> Disposition {
        if err.is_timeout() || err.is_connect() {
            Disposition::Transient
        } else {
            Disposition::Terminal
        }
    }

    /// Build the deterministic backoff schedule for one logical call.
    ///
    /// Randomization is disabled so consecutive delays are exactly
    /// `base_delay`, `base_delay * 2`, `base_delay * 4`, ...
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.base_delay,
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: self.base_delay * 2u32.saturating_pow(self.max_attempts),
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        }
    }

    /// The delay observed between attempt `i` and attempt `i + 1`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}
