//! Dispatch throttling. The loop asks the limiter to wait before every send;
//! production sleeps for real, tests substitute an instant recorder.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Blocks the run for `delay` before the next dispatch.
    async fn wait_before_next(&self, delay: Duration);
}

/// Real elapsed-time wait on the tokio clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepRateLimiter;

#[async_trait]
impl RateLimiter for SleepRateLimiter {
    async fn wait_before_next(&self, delay: Duration) {
        debug!("Rate limiting: waiting {}s before dispatch", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_limiter_waits_the_full_delay() {
        let start = tokio::time::Instant::now();
        SleepRateLimiter
            .wait_before_next(Duration::from_secs(20))
            .await;
        assert!(start.elapsed() >= Duration::from_secs(20));
    }
}
