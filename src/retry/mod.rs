//! Bounded retry with exponential backoff and a per-attempt timeout.
//!
//! Every network call of the crate goes through [`retry_with_timeout`], so the worst case
//! latency of a lookup is `timeout * (max_retries + 1)` plus the backoff sleeps.

mod error;

pub use error::RetryError;

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Retry schedule: `max_retries` extra attempts after the first one, sleeping
/// `initial_delay * backoff_factor^n` before retry `n`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub timeout: Duration,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_millis(5_000),
            initial_delay: Duration::from_millis(1_000),
            backoff_factor: 1.5,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, timeout: Duration, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            timeout,
            initial_delay,
            ..Self::default()
        }
    }

    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        if factor.is_finite() && factor >= 1.0 {
            self.backoff_factor = factor;
        }
        self
    }

    /// Sleep applied before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        self.initial_delay
            .mul_f64(self.backoff_factor.powi(exponent))
    }

    /// Total attempts, first one included.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Runs `operation` until it succeeds or the policy is exhausted.
///
/// Each attempt races the operation against `policy.timeout`. A timed-out attempt is
/// dropped, so a late answer from the abandoned future is never observed by the caller.
/// The operation must therefore be safe to start again.
pub async fn retry_with_timeout<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retry = 0;
    loop {
        let failure = match tokio::time::timeout(policy.timeout, operation()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => RetryError::Failed(err),
            Err(_) => RetryError::TimedOut {
                timeout: policy.timeout,
            },
        };

        if retry >= policy.max_retries {
            return Err(failure);
        }

        let delay = policy.delay_for(retry);
        debug!(
            attempt = retry + 1,
            delay_ms = delay.as_millis() as u64,
            error = %failure,
            "attempt failed, backing off"
        );
        tokio::time::sleep(delay).await;
        retry += 1;
    }
}
