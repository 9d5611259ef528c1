use std::time::Duration;

use crate::error::ProviderError;

/// Maximum attempts per provider.
pub const MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff.
pub const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Upper bound on any single delay, including server-requested ones.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Per-provider retry budget with capped exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_backoff: INITIAL_BACKOFF,
            max_backoff: MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// A single attempt with no retries.
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Returns `true` if another attempt may follow the `attempt`-th
    /// (1-based) failure with `error`.
    pub const fn should_retry(&self, attempt: u32, error: &ProviderError) -> bool {
        attempt < self.max_attempts && error.is_retryable()
    }

    /// Backoff after the `attempt`-th failure: 500ms, 1s, 2s, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1 << exponent)
            .min(self.max_backoff)
    }

    /// Delay before retrying. A server `Retry-After` raises the backoff but
    /// never past the cap.
    pub fn delay_for(&self, attempt: u32, error: &ProviderError) -> Duration {
        let backoff = self.backoff(attempt);
        error
            .retry_after()
            .map_or(backoff, |requested| backoff.max(requested))
            .min(self.max_backoff)
    }
}
