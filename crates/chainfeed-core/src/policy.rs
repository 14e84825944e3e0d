//! Fixed-delay retry policy for per-block fetches.
//!
//! Retries are bounded *within* a poll tick; across ticks the poll loop
//! itself is the retry. Exhausting the bound demotes a block to a logged
//! skip so the marker never stalls on one bad height.

use std::time::Duration;

/// Bounded fixed-delay retry policy.
#[derive(Debug, Clone)]
pub struct FetchRetryPolicy {
    /// Retry attempts after the first try.
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for FetchRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl FetchRetryPolicy {
    /// Returns the delay before the `attempt`-th retry (1-based), or `None`
    /// once the bound is exhausted.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt > self.max_retries {
            None
        } else {
            Some(self.delay)
        }
    }
}
