//! Exponential backoff for gateway calls.
//!
//! An operation is attempted once and then retried up to `max_retries`
//! times, but only while it keeps failing with a transient error. Before
//! retry `i` (zero-based) the executor waits `initial_delay * 2^i`, so the
//! default policy waits 1s, 2s and 4s. Non-transient errors are returned
//! immediately without waiting.
//!
//! There is no overall deadline: the worst case is the sum of the delays
//! plus `max_retries + 1` times the operation's own latency.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::ports::GatewayError;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

/// Errors that can tell whether retrying may help.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for GatewayError {
    fn is_transient(&self) -> bool {
        GatewayError::is_transient(self)
    }
}

/// Retry budget and delay schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// Delay before retry `retry` (zero-based). Saturates instead of overflowing.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }
}

/// Suspends the current task. Injected so tests can run without real delays.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs operations under a `RetryPolicy`.
#[derive(Clone)]
pub struct BackoffExecutor {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl BackoffExecutor {
    pub fn new(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    /// Executor using real timers.
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self::new(policy, Arc::new(TokioSleeper))
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `operation` until it succeeds, fails with a non-transient error,
    /// or the retry budget is spent. The last error is returned as-is.
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        E: Transient + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retry = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_transient() || retry >= self.policy.max_retries {
                        return Err(err);
                    }

                    let delay = self.policy.delay_for(retry);
                    tracing::warn!(
                        attempt = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient failure, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    retry += 1;
                }
            }
        }
    }
}

impl Default for BackoffExecutor {
    fn default() -> Self {
        Self::with_policy(RetryPolicy::default())
    }
}
