//! Bounded exponential-backoff retry for single remote calls
//!
//! Every failure is retried the same way unless `fail_fast_on_permanent` is
//! enabled, in which case not-found and other 4xx style failures are returned
//! after the first attempt.

use crate::config::RetryConfig;
use crate::domain::{ExamGenError, Result};
use crate::log_retry_attempt;
use std::future::Future;
use std::time::Duration;

/// Backoff parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts including the first one
    pub max_attempts: u32,
    /// Sleep before the first retry
    pub initial_delay: Duration,
    /// Growth factor between consecutive sleeps
    pub multiplier: f64,
    /// Upper bound for a single sleep
    pub max_delay: Duration,
    /// Stop at the first permanent failure
    pub fail_fast_on_permanent: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            multiplier: config.backoff_multiplier,
            max_delay: Duration::from_millis(config.max_delay_ms),
            fail_fast_on_permanent: config.fail_fast_on_permanent,
        }
    }

    /// Sleep after the `failed_attempt`-th failure (1-based): 1s, 2s, 4s, ...
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(63) as i32;
        let millis = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    fn gives_up_early(&self, err: &ExamGenError) -> bool {
        if !self.fail_fast_on_permanent {
            return false;
        }
        match err {
            ExamGenError::Remote(remote) => remote.is_permanent(),
            _ => true,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Runs one remote operation with retry
///
/// The sleep is `tokio::time::sleep`, so only the task performing the call is
/// suspended.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invokes `op` until it succeeds or the attempt budget is spent
    ///
    /// `operation` names the call in log output.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt >= max_attempts || self.policy.gives_up_early(&e) {
                        tracing::error!(
                            operation = operation,
                            attempts = attempt,
                            error = %e,
                            "Operation failed"
                        );
                        return Err(e);
                    }

                    let delay = self.policy.delay_for(attempt);
                    log_retry_attempt!(operation, attempt, max_attempts, delay, e);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
