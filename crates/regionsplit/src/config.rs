//! Retry tuning constants and scan configuration.

use crate::error::{Error, Result};
use regionsplit_core::retry::RetryTuning;
use serde::Deserialize;
use std::time::Duration;

/// Retrying region splits.
pub const SPLIT_RETRY: RetryTuning =
    RetryTuning::new(32, Duration::from_millis(50), Duration::from_secs(4));

/// Polling until a split has taken effect.
pub const SPLIT_CHECK: RetryTuning =
    RetryTuning::new(64, Duration::from_millis(8), Duration::from_secs(1));

/// Polling until a scatter operation has finished.
pub const SCATTER_WAIT: RetryTuning =
    RetryTuning::new(64, Duration::from_millis(50), Duration::from_secs(1));

/// Overall upper bound on waiting for scatter.
pub const SCATTER_WAIT_UPPER_INTERVAL: Duration = Duration::from_secs(180);

/// Polling until stores stop rejecting writes.
pub const REJECT_STORE_CHECK: RetryTuning =
    RetryTuning::new(64, Duration::from_millis(100), Duration::from_secs(2));

/// Waiting for region scans to become consistent.
pub const WAIT_REGION_ONLINE: RetryTuning =
    RetryTuning::new(1800, Duration::from_millis(10), Duration::from_secs(2));

/// Default page size for paginated region scans.
pub const SCAN_REGION_PAGINATION_LIMIT: usize = 128;

/// Configuration for [`RegionScanner`](crate::RegionScanner).
///
/// Missing fields fall back to their defaults when deserializing:
///
/// ```rust
/// use regionsplit::ScanConfig;
///
/// let config: ScanConfig = toml::from_str(
///     r#"
///     pagination_limit = 64
///
///     [batch_backoff]
///     retry_times = 20
///     interval_ms = 10
///     max_interval_ms = 500
///     "#,
/// )
/// .unwrap();
///
/// assert_eq!(config.pagination_limit, 64);
/// assert_eq!(config.batch_backoff.retry_times, 20);
/// assert_eq!(config.paginate_backoff.retry_times, 1800);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Page size for paginated scans.
    pub pagination_limit: usize,

    /// Retry budget and delays for paginated scans.
    pub paginate_backoff: RetryTuning,

    /// Retry budget and delays for single-batch scans.
    pub batch_backoff: RetryTuning,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            pagination_limit: SCAN_REGION_PAGINATION_LIMIT,
            paginate_backoff: WAIT_REGION_ONLINE,
            batch_backoff: WAIT_REGION_ONLINE,
        }
    }
}

impl ScanConfig {
    /// Set the page size for paginated scans.
    pub fn with_pagination_limit(mut self, limit: usize) -> Self {
        self.pagination_limit = limit;
        self
    }

    /// Set the retry tuning for paginated scans.
    pub fn with_paginate_backoff(mut self, tuning: RetryTuning) -> Self {
        self.paginate_backoff = tuning;
        self
    }

    /// Set the retry tuning for single-batch scans.
    pub fn with_batch_backoff(mut self, tuning: RetryTuning) -> Self {
        self.batch_backoff = tuning;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// This will look for:
    /// - `REGIONSPLIT_SCAN_LIMIT` for the pagination limit
    /// - `REGIONSPLIT_PAGINATE_RETRY_TIMES` for the paginated scan budget
    /// - `REGIONSPLIT_BATCH_RETRY_TIMES` for the single-batch scan budget
    ///
    /// Unset variables keep their defaults. A variable that is set but not a
    /// number is a [`Error::Config`]. The result is validated.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(limit) = env_number::<usize>("REGIONSPLIT_SCAN_LIMIT")? {
            config.pagination_limit = limit;
        }
        if let Some(times) = env_number::<u32>("REGIONSPLIT_PAGINATE_RETRY_TIMES")? {
            config.paginate_backoff = config.paginate_backoff.with_retry_times(times);
        }
        if let Some(times) = env_number::<u32>("REGIONSPLIT_BATCH_RETRY_TIMES")? {
            config.batch_backoff = config.batch_backoff.with_retry_times(times);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.pagination_limit == 0 {
            return Err(Error::Config(
                "pagination_limit must be greater than zero".to_string(),
            ));
        }
        validate_tuning("paginate_backoff", &self.paginate_backoff)?;
        validate_tuning("batch_backoff", &self.batch_backoff)?;
        Ok(())
    }
}

fn validate_tuning(name: &str, tuning: &RetryTuning) -> Result<()> {
    if tuning.retry_times == 0 {
        return Err(Error::Config(format!(
            "{name}.retry_times must be greater than zero"
        )));
    }
    if tuning.interval > tuning.max_interval {
        return Err(Error::Config(format!(
            "{name}.interval_ms ({}) exceeds max_interval_ms ({})",
            tuning.interval.as_millis(),
            tuning.max_interval.as_millis()
        )));
    }
    Ok(())
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{name} is not a valid number: {value:?}"))),
        Err(_) => Ok(None),
    }
}
