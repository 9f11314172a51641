//! Retry of transient contract reads.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::UploadError;

/// How often and how patiently idempotent reads are retried.
///
/// Only reads go through this policy. Chunk writes are never retried
/// automatically, since a resend would consume a second nonce.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between attempts (backoff cap).
    pub max_delay: Duration,
    /// Multiplier for each subsequent retry.
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_delay(Duration::from_secs(3))
    }
}

impl RetryPolicy {
    /// One retry after a fixed `delay`.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            max_attempts: 2,
            initial_delay: delay,
            max_delay: delay,
            backoff_factor: 1.0,
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(63) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exp);
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }

    /// Runs `op` until it succeeds or the attempts are used up.
    ///
    /// `what` names the read in log output.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, UploadError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, UploadError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts.max(1) => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(read = what, attempt, ?delay, "read failed, retrying: {e}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
