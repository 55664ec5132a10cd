//! Dispatcher configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`BatchDispatcher`](crate::BatchDispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Envelopes processed at the same time (1 = strictly sequential)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Upper bound for a single `process` call, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_timeout_ms: Option<u64>,
    /// Time reserved before the invocation deadline for returning the result
    #[serde(default)]
    pub deadline_margin_ms: u64,
}

fn default_max_concurrency() -> usize { 1 }

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            message_timeout_ms: None,
            deadline_margin_ms: 0,
        }
    }
}

impl DispatchConfig {
    /// One envelope at a time, in batch order.
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Up to `n` envelopes in flight at once.
    pub fn concurrent(n: usize) -> Self {
        Self {
            max_concurrency: n,
            ..Self::default()
        }
    }

    pub fn message_timeout(mut self, timeout: Duration) -> Self {
        self.message_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn deadline_margin(mut self, margin: Duration) -> Self {
        self.deadline_margin_ms = margin.as_millis() as u64;
        self
    }

    /// Effective concurrency; a configured 0 behaves like 1.
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }

    /// Per-message timeout; a configured 0 means no timeout.
    pub fn message_timeout_duration(&self) -> Option<Duration> {
        self.message_timeout_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }

    pub fn deadline_margin_duration(&self) -> Duration {
        Duration::from_millis(self.deadline_margin_ms)
    }
}
