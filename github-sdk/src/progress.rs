//! Advisory progress notifications
//!
//! Tool operations report progress and noteworthy conditions to a
//! caller-supplied sink. Notifications are strictly advisory: nothing in
//! the SDK branches on whether, or how, a sink handles them.

use async_trait::async_trait;

/// Caller-supplied notification sink
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Informational message
    async fn info(&self, message: &str);

    /// Non-fatal warning (e.g. the remaining-quota advisory)
    async fn warn(&self, message: &str);

    /// Error description, emitted alongside the returned error value
    async fn error(&self, message: &str);

    /// Progress of the current operation, as done-out-of-total
    async fn progress(&self, done: u32, total: u32);
}

/// Sink that discards every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl ProgressSink for NoopSink {
    async fn info(&self, _message: &str) {}

    async fn warn(&self, _message: &str) {}

    async fn error(&self, _message: &str) {}

    async fn progress(&self, _done: u32, _total: u32) {}
}

/// Sink that forwards notifications to the process log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl ProgressSink for LogSink {
    async fn info(&self, message: &str) {
        log::info!("{}", message);
    }

    async fn warn(&self, message: &str) {
        log::warn!("{}", message);
    }

    async fn error(&self, message: &str) {
        log::error!("{}", message);
    }

    async fn progress(&self, done: u32, total: u32) {
        log::debug!("progress {}/{}", done, total);
    }
}
