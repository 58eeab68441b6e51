//! Unit and mock-API tests for the GitHub SDK
//!
//! Mock-API tests run against a WireMock server; timing-sensitive rate
//! budget tests run against the paused tokio clock.

pub mod config_tests;
pub mod error_tests;
pub mod github_mock_tests;
pub mod rate_limit_tests;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::progress::ProgressSink;

/// Sink recording every notification for assertions
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded at the given level
    pub async fn messages(&self, level: &str) -> Vec<String> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|(l, _)| l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    async fn record(&self, level: &str, message: String) {
        self.events.lock().await.push((level.to_string(), message));
    }
}

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn info(&self, message: &str) {
        self.record("info", message.to_string()).await;
    }

    async fn warn(&self, message: &str) {
        self.record("warn", message.to_string()).await;
    }

    async fn error(&self, message: &str) {
        self.record("error", message.to_string()).await;
    }

    async fn progress(&self, done: u32, total: u32) {
        self.record("progress", format!("{}/{}", done, total)).await;
    }
}
