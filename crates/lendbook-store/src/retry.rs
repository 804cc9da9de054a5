//! Retry policies for backend calls.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::BackendError;

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// No delay between retries.
    None,
    /// Fixed delay between retries.
    Fixed(Duration),
    /// Delay grows by `base` with each failed attempt: `base * n`.
    Linear(Duration),
    /// Exponential backoff with base and max.
    Exponential {
        /// Initial delay.
        base: Duration,
        /// Maximum delay.
        max: Duration,
    },
}

impl BackoffStrategy {
    /// Delay before the retry that follows failed attempt `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(d) => *d,
            Self::Linear(base) => base.saturating_mul(attempt),
            Self::Exponential { base, max } => {
                let multiplier = 2u32.saturating_pow(attempt - 1);
                std::cmp::min(base.saturating_mul(multiplier), *max)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Linear(Duration::from_millis(1000))
    }
}

/// Backoff choice as written in configuration.
///
/// The delays themselves come from the store configuration's base and cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    None,
    Fixed,
    #[default]
    Linear,
    Exponential,
}

impl BackoffKind {
    /// Build the strategy for a base delay, capping exponential growth at `max`.
    pub fn strategy(self, base: Duration, max: Duration) -> BackoffStrategy {
        match self {
            Self::None => BackoffStrategy::None,
            Self::Fixed => BackoffStrategy::Fixed(base),
            Self::Linear => BackoffStrategy::Linear(base),
            Self::Exponential => BackoffStrategy::Exponential { base, max },
        }
    }
}

/// Which failures are retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryMode {
    /// Retry only transient failures; permanent ones fail after one attempt.
    #[default]
    TransientOnly,
    /// Retry every failure regardless of its kind.
    Always,
}

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Backoff strategy.
    pub backoff: BackoffStrategy,
    /// Which failures trigger a retry.
    pub mode: RetryMode,
}

impl RetryPolicy {
    /// Create a policy with linear one-second backoff that retries transient failures.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: BackoffStrategy::default(),
            mode: RetryMode::default(),
        }
    }

    /// Set backoff strategy.
    pub fn with_backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff = strategy;
        self
    }

    /// Set retry mode.
    pub fn with_mode(mut self, mode: RetryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Check if a failure on attempt `attempt` (1-based) should be retried.
    pub fn should_retry(&self, error: &BackendError, attempt: u32) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        match self.mode {
            RetryMode::Always => true,
            RetryMode::TransientOnly => error.is_transient(),
        }
    }

    /// Run `op` until it succeeds, the failure is not retryable, or attempts run out.
    ///
    /// The last failure is returned unchanged; callers cannot tell whether
    /// retries happened.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, BackendError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !self.should_retry(&error, attempt) {
                        if attempt > 1 || error.is_transient() {
                            tracing::error!(
                                operation,
                                attempts = attempt,
                                kind = ?error.kind,
                                error = %error,
                                "backend call failed"
                            );
                        }
                        return Err(error);
                    }

                    let delay = self.backoff.delay_for_attempt(attempt);
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "backend call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_linear_delays() {
        let backoff = BackoffStrategy::Linear(Duration::from_millis(1000));
        assert_eq!(backoff.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_millis(2000));
        assert_eq!(backoff.delay_for_attempt(3), Duration::from_millis(3000));
    }

    #[test]
    fn test_exponential_delays_capped() {
        let backoff = BackoffStrategy::Exponential {
            base: Duration::from_millis(50),
            max: Duration::from_millis(300),
        };
        assert_eq!(backoff.delay_for_attempt(1), Duration::from_millis(50));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_millis(100));
        assert_eq!(backoff.delay_for_attempt(3), Duration::from_millis(200));
        assert_eq!(backoff.delay_for_attempt(4), Duration::from_millis(300));
    }

    #[test]
    fn test_fixed_and_none() {
        assert_eq!(
            BackoffStrategy::Fixed(Duration::from_millis(5)).delay_for_attempt(7),
            Duration::from_millis(5)
        );
        assert_eq!(BackoffStrategy::None.delay_for_attempt(3), Duration::ZERO);
    }

    #[test]
    fn test_backoff_kind_builds_strategy() {
        let base = Duration::from_millis(100);
        let max = Duration::from_millis(250);
        assert_eq!(BackoffKind::None.strategy(base, max), BackoffStrategy::None);
        assert_eq!(BackoffKind::Fixed.strategy(base, max), BackoffStrategy::Fixed(base));
        assert_eq!(BackoffKind::default().strategy(base, max), BackoffStrategy::Linear(base));
        assert_eq!(
            BackoffKind::Exponential.strategy(base, max).delay_for_attempt(3),
            max
        );

        let kind: BackoffKind = serde_json::from_str(r#""exponential""#).unwrap();
        assert_eq!(kind, BackoffKind::Exponential);
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0).max_attempts, 1);
    }

    #[test]
    fn test_should_retry_transient_only() {
        let policy = RetryPolicy::new(3);
        let transient = BackendError::transient("503");
        let permanent = BackendError::permanent("403");

        assert!(policy.should_retry(&transient, 1));
        assert!(policy.should_retry(&transient, 2));
        assert!(!policy.should_retry(&transient, 3));
        assert!(!policy.should_retry(&permanent, 1));
    }

    #[test]
    fn test_should_retry_always() {
        let policy = RetryPolicy::new(3).with_mode(RetryMode::Always);
        assert!(policy.should_retry(&BackendError::permanent("403"), 1));
        assert!(!policy.should_retry(&BackendError::permanent("403"), 3));
    }

    #[test]
    fn test_retry_mode_serde() {
        let mode: RetryMode = serde_json::from_str(r#""always""#).unwrap();
        assert_eq!(mode, RetryMode::Always);
        let mode: RetryMode = serde_json::from_str(r#""transient_only""#).unwrap();
        assert_eq!(mode, RetryMode::TransientOnly);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_succeeds_on_third_attempt() {
        let policy = RetryPolicy::new(3);
        let attempts = Cell::new(0);
        let start = tokio::time::Instant::now();

        let result = policy
            .run("test", || {
                attempts.set(attempts.get() + 1);
                let n = attempts.get();
                async move {
                    if n < 3 {
                        Err(BackendError::transient("unavailable"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(attempts.get(), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exhausts_attempts() {
        let policy = RetryPolicy::new(3);
        let attempts = Cell::new(0);

        let result: Result<(), _> = policy
            .run("test", || {
                attempts.set(attempts.get() + 1);
                let n = attempts.get();
                async move { Err(BackendError::transient(format!("failure {}", n))) }
            })
            .await;

        assert_eq!(result.unwrap_err().message, "failure 3");
        assert_eq!(attempts.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_permanent_fails_fast() {
        let policy = RetryPolicy::new(3);
        let attempts = Cell::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<(), _> = policy
            .run("test", || {
                attempts.set(attempts.get() + 1);
                async { Err(BackendError::permanent("permission denied")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.get(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_always_retries_permanent() {
        let policy = RetryPolicy::new(3).with_mode(RetryMode::Always);
        let attempts = Cell::new(0);

        let result: Result<(), _> = policy
            .run("test", || {
                attempts.set(attempts.get() + 1);
                async { Err(BackendError::permanent("permission denied")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.get(), 3);
    }
}
