//! Shared rate budget for outbound API calls
//!
//! A token-bucket style permit source bounding the aggregate request rate
//! across every concurrently executing call in the process. The budget is
//! constructed once at startup and handed to the client by reference; it is
//! deliberately not a process-wide singleton so tests can build their own
//! instance against a paused clock.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Permit source granting at most `permits` grants per rolling `window`.
///
/// Grant timestamps are tracked explicitly, so the bound holds over any
/// sliding window of the configured length, not just aligned intervals.
/// Permit grants are serialized through an async mutex; a caller with no
/// permit available suspends until the oldest grant leaves the window.
#[derive(Debug)]
pub struct RateBudget {
    permits: u32,
    window: Duration,
    grants: Mutex<VecDeque<Instant>>,
}

impl RateBudget {
    /// Create a budget of `permits` grants per `window`
    pub fn new(permits: u32, window: Duration) -> Self {
        Self {
            permits: permits.max(1),
            window,
            grants: Mutex::new(VecDeque::new()),
        }
    }

    /// Convenience constructor for an N-requests-per-second budget
    pub fn per_second(permits: u32) -> Self {
        Self::new(permits, Duration::from_secs(1))
    }

    /// Acquire one permit, suspending until one is available.
    ///
    /// No underlying request may be sent without a permit; callers await
    /// this immediately before each network send.
    pub async fn acquire(&self) {
        loop {
            let wake_at = {
                let mut grants = self.grants.lock().await;
                let now = Instant::now();

                while grants
                    .front()
                    .map_or(false, |&t| now.duration_since(t) >= self.window)
                {
                    grants.pop_front();
                }

                if (grants.len() as u32) < self.permits {
                    grants.push_back(now);
                    return;
                }

                match grants.front() {
                    Some(&oldest) => oldest + self.window,
                    None => now,
                }
            };

            tokio::time::sleep_until(wake_at).await;
        }
    }

    /// Permits granted per window
    pub fn permits(&self) -> u32 {
        self.permits
    }

    /// Window length
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of grants currently counted against the window
    pub async fn in_use(&self) -> u32 {
        let grants = self.grants.lock().await;
        let now = Instant::now();
        grants
            .iter()
            .filter(|&&t| now.duration_since(t) < self.window)
            .count() as u32
    }
}
