//! Retry policy with exponential backoff and jitter.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Backoff policy for transport-level failures.
///
/// Delays grow as `base * 2^attempt` capped at `max_delay`, with full
/// jitter drawn uniformly from `[0, delay]` so fleets of routers and
/// bridges do not retry in lockstep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay in milliseconds.
    pub base_delay_ms: u64,
    /// Cap on the computed delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 200,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// The jittered delay to sleep before retry number `attempt`
    /// (0-based: the delay after the first failure is `delay_for(0)`).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(16))
            .min(self.max_delay_ms);
        let jittered = rand::thread_rng().gen_range(0..=exp);
        Duration::from_millis(jittered)
    }

    /// Sleep for the jittered delay of the given attempt.
    pub async fn wait(&self, attempt: u32) {
        let delay = self.delay_for(attempt);
        tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Backing off");
        tokio::time::sleep(delay).await;
    }
}
