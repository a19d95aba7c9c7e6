//! Capped exponential backoff for fetch retries.

use std::time::Duration;

/// Default delay before the first retry
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(100);
/// Default upper bound on any single delay
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Doubles the delay after every consecutive failure, up to `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    attempt: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
            attempt: 0,
        }
    }

    /// Delay to wait before the next retry; advances the attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        // 2^16 * initial already exceeds any sane cap
        let factor = 1u32 << self.attempt.min(16);
        self.attempt = self.attempt.saturating_add(1);
        self.initial.saturating_mul(factor).min(self.max)
    }

    /// Number of consecutive failures seen since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_DELAY, DEFAULT_MAX_DELAY)
    }
}
