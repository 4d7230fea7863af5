//! Named backoff tuning triples.

use super::exponential::{ExponentialBackoffer, RetryState};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A `{retry_times, interval, max_interval}` triple describing one retry
/// class.
///
/// Every retry class shares the same exponential shape and differs only in
/// these three numbers. Durations (de)serialize as whole milliseconds under
/// `interval_ms` and `max_interval_ms`.
///
/// # Examples
///
/// ```rust
/// use regionsplit_core::retry::RetryTuning;
/// use std::time::Duration;
///
/// const SPLIT_CHECK: RetryTuning =
///     RetryTuning::new(64, Duration::from_millis(8), Duration::from_secs(1));
///
/// let state = SPLIT_CHECK.retry_state();
/// assert_eq!(state.attempt(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryTuning {
    /// Attempt budget.
    pub retry_times: u32,

    /// Delay before the first retry.
    #[serde(rename = "interval_ms", with = "duration_ms")]
    pub interval: Duration,

    /// Upper bound on any single delay.
    #[serde(rename = "max_interval_ms", with = "duration_ms")]
    pub max_interval: Duration,
}

impl RetryTuning {
    /// Create a tuning triple.
    pub const fn new(retry_times: u32, interval: Duration, max_interval: Duration) -> Self {
        Self {
            retry_times,
            interval,
            max_interval,
        }
    }

    /// Return a copy with a different attempt budget.
    pub const fn with_retry_times(mut self, retry_times: u32) -> Self {
        self.retry_times = retry_times;
        self
    }

    /// A fresh retry state for one retry loop.
    pub fn retry_state(&self) -> RetryState {
        RetryState::new(self.retry_times, self.interval, self.max_interval)
    }

    /// A fresh retry-everything backoffer for one retry loop.
    pub fn backoffer(&self) -> ExponentialBackoffer {
        ExponentialBackoffer::new(*self)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::Backoffer;

    #[test]
    fn test_deserialize_from_toml_millis() {
        let tuning: RetryTuning = toml::from_str(
            r#"
            retry_times = 32
            interval_ms = 50
            max_interval_ms = 4000
            "#,
        )
        .unwrap();

        assert_eq!(
            tuning,
            RetryTuning::new(32, Duration::from_millis(50), Duration::from_secs(4))
        );
    }

    #[test]
    fn test_serialize_uses_millis() {
        let tuning = RetryTuning::new(64, Duration::from_millis(100), Duration::from_secs(2));
        let text = toml::to_string(&tuning).unwrap();

        assert!(text.contains("interval_ms = 100"));
        assert!(text.contains("max_interval_ms = 2000"));
    }

    #[test]
    fn test_with_retry_times_keeps_intervals() {
        let tuning = RetryTuning::new(1800, Duration::from_millis(10), Duration::from_secs(2))
            .with_retry_times(3);

        assert_eq!(tuning.retry_times, 3);
        assert_eq!(tuning.interval, Duration::from_millis(10));
        assert_eq!(tuning.max_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_backoffer_uses_tuning() {
        let mut bo = RetryTuning::new(2, Duration::from_millis(8), Duration::from_millis(10))
            .backoffer();
        assert_eq!(bo.next_backoff(&"pending"), Duration::from_millis(8));
        assert_eq!(bo.next_backoff(&"pending"), Duration::from_millis(10));
        assert_eq!(Backoffer::<&str>::attempt(&bo), 0);
    }
}
