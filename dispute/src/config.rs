use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing of a dispute session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisputeConfig {
    /// Interval between timeout checks.
    pub poll_interval_ms: u64,
    /// Delay before retrying a transient failure.
    pub retry_backoff_ms: u64,
    /// Retries per operation; `None` retries forever.
    pub max_retries: Option<usize>,
}

impl Default for DisputeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 3000,
            retry_backoff_ms: 1000,
            max_retries: None,
        }
    }
}

impl DisputeConfig {
    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn with_retry_backoff_ms(mut self, retry_backoff_ms: u64) -> Self {
        self.retry_backoff_ms = retry_backoff_ms;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
