//! Backoff policy for waiting on region scans to converge.

use crate::config::WAIT_REGION_ONLINE;
use crate::error::Error;
use regionsplit_core::retry::{Backoffer, RetryState, RetryTuning};
use std::time::Duration;

/// Backoffer used while waiting for the placement service to report a
/// consistent view of a range.
///
/// Scan errors ([`ErrorKind::ScanRegion`](crate::ErrorKind::ScanRegion))
/// back off exponentially from the configured interval; anything else stops
/// the retry loop at once.
///
/// The backoffer also remembers how many regions the previous completed
/// attempt returned. [`observe_region_count`](Self::observe_region_count)
/// refunds one retry whenever that number changes.
#[derive(Debug, Clone)]
pub struct WaitRegionOnlineBackoffer {
    state: RetryState,
    last_region_count: Option<usize>,
}

impl WaitRegionOnlineBackoffer {
    /// Create a backoffer from retry tuning.
    pub fn new(tuning: RetryTuning) -> Self {
        Self {
            state: tuning.retry_state(),
            last_region_count: None,
        }
    }

    /// The underlying retry state.
    pub fn state(&self) -> &RetryState {
        &self.state
    }

    /// Refund one consumed retry, saturating at zero.
    pub fn reduce_retry(&mut self) {
        self.state.reduce_retry();
    }

    /// Record the region count of a completed attempt, refunding one retry
    /// when it differs from the previous completed attempt.
    ///
    /// Returns whether a retry was refunded. The first observation never
    /// refunds.
    pub fn observe_region_count(&mut self, count: usize) -> bool {
        let changed = self.last_region_count.is_some_and(|last| last != count);
        self.last_region_count = Some(count);
        if changed {
            self.state.reduce_retry();
        }
        changed
    }

    pub(crate) fn forget_region_count(&mut self) {
        self.last_region_count = None;
    }

    /// Number of retries consumed so far.
    pub fn retry_times(&self) -> u32 {
        self.state.retry_times()
    }

    /// Whether the budget is exhausted or the retry loop was stopped.
    pub fn is_stopped(&self) -> bool {
        !self.state.should_retry()
    }
}

impl Default for WaitRegionOnlineBackoffer {
    fn default() -> Self {
        Self::new(WAIT_REGION_ONLINE)
    }
}

impl Backoffer<Error> for WaitRegionOnlineBackoffer {
    fn next_backoff(&mut self, err: &Error) -> Duration {
        if err.is_retryable() {
            return self.state.exponential_backoff();
        }
        self.state.stop_retry();
        Duration::ZERO
    }

    fn attempt(&self) -> u32 {
        self.state.attempt()
    }
}
