//! Request pacing
//!
//! The pacer enforces a minimum interval between consecutive outbound
//! requests. The coordinator owns one instance and calls [`Pacer::wait`]
//! before every fetch, retries included.

use std::time::{Duration, Instant};

/// Enforces a minimum delay between consecutive requests
#[derive(Debug, Clone)]
pub struct Pacer {
    /// Minimum time between the starts of two requests
    min_interval: Duration,

    /// When the previous request was released
    last_request_time: Option<Instant>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request_time: None,
        }
    }

    /// A pacer that never waits
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed >= self.min_interval {
            None
        } else {
            Some(self.min_interval - elapsed)
        }
    }

    /// Blocks until the minimum interval has passed, then records the request
    pub async fn wait(&mut self) {
        if let Some(delay) = self.time_until_ready(Instant::now()) {
            tracing::trace!("Pacing: sleeping {:?} before next request", delay);
            tokio::time::sleep(delay).await;
        }
        self.record_request(Instant::now());
    }

    /// Records that a request was released at `now`
    pub fn record_request(&mut self, now: Instant) {
        self.last_request_time = Some(now);
    }
}
