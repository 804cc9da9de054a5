//! Accessor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::retry::{BackoffKind, RetryMode, RetryPolicy};

/// Configuration for one [`RecordStore`](crate::RecordStore).
///
/// Fixed at construction. The same struct doubles as the `[store]` section of
/// a config file, where `table` is left empty and filled per collection with
/// [`StoreConfig::for_table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend collection name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub table: String,

    /// Maximum attempts per operation, including the first.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base retry delay in milliseconds. With linear backoff, retry `n` waits
    /// `n` times this.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// How the delay grows between retries.
    #[serde(default)]
    pub backoff: BackoffKind,

    /// Upper bound on a single delay under exponential backoff, in milliseconds.
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,

    /// Cache time-to-live in milliseconds. Zero disables the cache.
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Which failures are retried.
    #[serde(default)]
    pub retry_mode: RetryMode,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_max_retry_delay_ms() -> u64 {
    30_000
}

fn default_cache_ttl_ms() -> u64 {
    5 * 60 * 1000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: String::new(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            backoff: BackoffKind::default(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            cache_ttl_ms: default_cache_ttl_ms(),
            retry_mode: RetryMode::default(),
        }
    }
}

impl StoreConfig {
    /// Create a configuration for `table` with default retry and cache settings.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Copy these settings onto another table.
    pub fn for_table(&self, table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..self.clone()
        }
    }

    /// Set the maximum number of attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base retry delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set the backoff strategy.
    pub fn with_backoff(mut self, backoff: BackoffKind) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the exponential backoff cap.
    pub fn with_max_retry_delay(mut self, max: Duration) -> Self {
        self.max_retry_delay_ms = max.as_millis() as u64;
        self
    }

    /// Set the cache time-to-live, at millisecond precision.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_ms = ttl.as_millis() as u64;
        self
    }

    /// Set the retry mode.
    pub fn with_retry_mode(mut self, mode: RetryMode) -> Self {
        self.retry_mode = mode;
        self
    }

    /// Base retry delay.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Cache time-to-live.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// The retry policy described by this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        let max = Duration::from_millis(self.max_retry_delay_ms);
        RetryPolicy::new(self.max_retries)
            .with_backoff(self.backoff.strategy(self.retry_delay(), max))
            .with_mode(self.retry_mode)
    }

    /// Check the configuration is usable by an accessor.
    pub fn validate(&self) -> StoreResult<()> {
        if self.table.trim().is_empty() {
            return Err(StoreError::Config("table name is required".to_string()));
        }
        if self.max_retries == 0 {
            return Err(StoreError::Config(
                "max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::BackoffStrategy;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::new("borrowers");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay(), Duration::from_millis(1000));
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.retry_mode, RetryMode::TransientOnly);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_policy_is_linear() {
        let policy = StoreConfig::new("borrowers")
            .with_max_retries(5)
            .with_retry_delay(Duration::from_millis(200))
            .retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(
            policy.backoff,
            BackoffStrategy::Linear(Duration::from_millis(200))
        );
    }

    #[test]
    fn test_retry_policy_follows_backoff_kind() {
        let policy = StoreConfig::new("borrowers")
            .with_retry_delay(Duration::from_millis(100))
            .with_backoff(BackoffKind::Exponential)
            .with_max_retry_delay(Duration::from_millis(400))
            .retry_policy();
        assert_eq!(
            policy.backoff,
            BackoffStrategy::Exponential {
                base: Duration::from_millis(100),
                max: Duration::from_millis(400),
            }
        );
    }

    #[test]
    fn test_sub_second_cache_ttl_kept() {
        let config = StoreConfig::new("borrowers").with_cache_ttl(Duration::from_millis(500));
        assert_eq!(config.cache_ttl_ms, 500);
        assert_eq!(config.cache_ttl(), Duration::from_millis(500));
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = StoreConfig::new("  ").validate().unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let err = StoreConfig::new("borrowers")
            .with_max_retries(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_deserialize_partial_section() {
        let config: StoreConfig = serde_json::from_str(r#"{"max_retries": 5}"#).unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay_ms, 1000);
        assert_eq!(config.cache_ttl_ms, 300_000);
        assert_eq!(config.backoff, BackoffKind::Linear);
        assert!(config.table.is_empty());

        let borrowers = config.for_table("borrowers");
        assert_eq!(borrowers.table, "borrowers");
        assert_eq!(borrowers.max_retries, 5);
    }
}
