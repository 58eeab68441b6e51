//! Resilience policy for upstream API calls
//!
//! This module provides the retry policy applied to every call through the
//! SDK: which raw results count as transient, and how long to back off
//! between attempts.

mod retry;

pub use retry::{Disposition, RetryPolicy, DEFAULT_RETRIABLE_STATUSES};
