//! Retry policy for transient fetch failures
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 5xx | Retry with backoff |
//! | HTTP 429 | Retry with backoff |
//! | Timeout | Retry with backoff |
//! | Network error | Retry with backoff |
//! | Other HTTP 4xx | Give up immediately |

use crate::config::ScraperConfig;
use crate::FetchError;
use std::time::Duration;

/// Upper bound on a single backoff delay
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for `delay`, then try again
    Retry { delay: Duration },

    /// Stop and surface the error
    GiveUp,
}

/// Bounded exponential backoff for transient fetch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per URL, including the first one
    pub max_attempts: u32,

    /// Delay before the first retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_delay),
        )
    }

    /// Decides whether to retry after `attempt` (1-based) failed with `error`
    pub fn decide(&self, error: &FetchError, attempt: u32) -> RetryDecision {
        if !error.is_transient() || attempt >= self.max_attempts {
            return RetryDecision::GiveUp;
        }

        RetryDecision::Retry {
            delay: self.backoff(attempt),
        }
    }

    /// Delay after the given failed attempt: `base * 2^(attempt - 1)`, capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(MAX_BACKOFF)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ScraperConfig::default())
    }
}
