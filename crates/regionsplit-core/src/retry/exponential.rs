//! Exponential retry state and the retry-everything backoffer.

use super::strategy::Backoffer;
use super::tuning::RetryTuning;
use std::time::Duration;

/// Mutable exponential backoff counter.
///
/// Each call to [`exponential_backoff`](RetryState::exponential_backoff)
/// consumes one attempt and returns the current delay; the following delay is
/// doubled and capped at `max_backoff`. The consumed count can be refunded
/// with [`reduce_retry`](RetryState::reduce_retry), which is how callers keep
/// an attempt budget from running out while the remote side is visibly making
/// progress.
///
/// # Formula
///
/// For the `n`-th backoff (0-indexed):
/// ```text
/// delay(n)  = min(initial * 2^n, max_backoff)
/// jittered  = delay(n) + random(-delay(n) * jitter, +delay(n) * jitter), capped at max_backoff
/// ```
///
/// Jitter is off by default, which makes the delay sequence non-decreasing.
///
/// # Examples
///
/// ```rust
/// use regionsplit_core::retry::RetryState;
/// use std::time::Duration;
///
/// let mut state = RetryState::new(3, Duration::from_millis(10), Duration::from_secs(2));
/// assert_eq!(state.attempt(), 3);
///
/// assert_eq!(state.exponential_backoff(), Duration::from_millis(10));
/// assert_eq!(state.attempt(), 2);
///
/// state.reduce_retry();
/// assert_eq!(state.attempt(), 3);
///
/// state.stop_retry();
/// assert!(!state.should_retry());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryState {
    max_retry: u32,
    retry_times: u32,
    next_backoff: Duration,
    max_backoff: Duration,
    jitter: f64,
}

impl RetryState {
    /// Create a state allowing `max_retry` attempts, starting at
    /// `initial_backoff` and never waiting longer than `max_backoff`.
    pub fn new(max_retry: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_retry,
            retry_times: 0,
            next_backoff: initial_backoff.min(max_backoff),
            max_backoff,
            jitter: 0.0,
        }
    }

    /// Create a builder for configuring a retry state.
    pub fn builder() -> RetryStateBuilder {
        RetryStateBuilder::default()
    }

    /// Whether any attempt is left.
    pub fn should_retry(&self) -> bool {
        self.retry_times < self.max_retry
    }

    /// Remaining attempts.
    pub fn attempt(&self) -> u32 {
        self.max_retry.saturating_sub(self.retry_times)
    }

    /// Consumed attempts.
    pub fn retry_times(&self) -> u32 {
        self.retry_times
    }

    /// Total attempt budget.
    pub fn max_retry(&self) -> u32 {
        self.max_retry
    }

    /// Exhaust the budget immediately.
    pub fn stop_retry(&mut self) {
        self.retry_times = self.max_retry;
    }

    /// Refund one consumed attempt. Never goes below zero consumed.
    pub fn reduce_retry(&mut self) {
        self.retry_times = self.retry_times.saturating_sub(1);
    }

    /// Consume one attempt without computing a delay.
    pub fn record_retry(&mut self) {
        self.retry_times = self.retry_times.saturating_add(1);
    }

    /// Consume one attempt and return the delay to wait before it.
    pub fn exponential_backoff(&mut self) -> Duration {
        self.record_retry();
        let backoff = self.next_backoff;
        self.next_backoff = self.next_backoff.saturating_mul(2).min(self.max_backoff);
        self.apply_jitter(backoff)
    }

    fn apply_jitter(&self, delay: Duration) -> Duration {
        if self.jitter <= 0.0 {
            return delay;
        }
        let base = delay.as_secs_f64();
        let jitter_amount = base * self.jitter * (rand::random::<f64>() - 0.5) * 2.0;
        Duration::from_secs_f64((base + jitter_amount).max(0.0)).min(self.max_backoff)
    }
}

impl From<RetryTuning> for RetryState {
    fn from(tuning: RetryTuning) -> Self {
        Self::new(tuning.retry_times, tuning.interval, tuning.max_interval)
    }
}

/// Builder for [`RetryState`].
///
/// Unset values fall back to 3 attempts, 10ms initial and 2s maximum delay,
/// without jitter.
///
/// # Examples
///
/// ```rust
/// use regionsplit_core::retry::RetryState;
/// use std::time::Duration;
///
/// let state = RetryState::builder()
///     .max_retry(64)
///     .initial_backoff(Duration::from_millis(50))
///     .max_backoff(Duration::from_secs(1))
///     .jitter(0.1)
///     .build();
/// assert_eq!(state.attempt(), 64);
/// ```
#[derive(Debug, Default)]
pub struct RetryStateBuilder {
    max_retry: Option<u32>,
    initial_backoff: Option<Duration>,
    max_backoff: Option<Duration>,
    jitter: Option<f64>,
}

impl RetryStateBuilder {
    /// Set the attempt budget.
    pub fn max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = Some(max_retry);
        self
    }

    /// Set the first delay.
    pub fn initial_backoff(mut self, delay: Duration) -> Self {
        self.initial_backoff = Some(delay);
        self
    }

    /// Set the delay cap.
    pub fn max_backoff(mut self, delay: Duration) -> Self {
        self.max_backoff = Some(delay);
        self
    }

    /// Set the jitter factor, clamped to `0.0..=1.0`.
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter.clamp(0.0, 1.0));
        self
    }

    /// Build the state.
    pub fn build(self) -> RetryState {
        let mut state = RetryState::new(
            self.max_retry.unwrap_or(3),
            self.initial_backoff.unwrap_or(Duration::from_millis(10)),
            self.max_backoff.unwrap_or(Duration::from_secs(2)),
        );
        state.jitter = self.jitter.unwrap_or(0.0);
        state
    }
}

/// A backoffer that retries every error with exponential delays until its
/// budget runs out.
///
/// Used for retry classes that have no error classification of their own
/// (split, split-check, scatter-wait, reject-store checks).
///
/// # Examples
///
/// ```rust
/// use regionsplit_core::retry::{Backoffer, ExponentialBackoffer, RetryTuning};
/// use std::time::Duration;
///
/// let mut bo = ExponentialBackoffer::new(RetryTuning::new(
///     2,
///     Duration::from_millis(8),
///     Duration::from_secs(1),
/// ));
/// let err = std::io::Error::other("not yet");
/// assert_eq!(bo.next_backoff(&err), Duration::from_millis(8));
/// assert_eq!(bo.next_backoff(&err), Duration::from_millis(16));
/// assert_eq!(Backoffer::<std::io::Error>::attempt(&bo), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialBackoffer {
    state: RetryState,
}

impl ExponentialBackoffer {
    /// Create a backoffer from a tuning triple.
    pub fn new(tuning: RetryTuning) -> Self {
        Self::from_state(tuning.retry_state())
    }

    /// Wrap an existing retry state.
    pub fn from_state(state: RetryState) -> Self {
        Self { state }
    }

    /// The underlying retry state.
    pub fn state(&self) -> &RetryState {
        &self.state
    }

    /// Mutable access to the underlying retry state.
    pub fn state_mut(&mut self) -> &mut RetryState {
        &mut self.state
    }
}

impl<E: ?Sized> Backoffer<E> for ExponentialBackoffer {
    fn next_backoff(&mut self, _err: &E) -> Duration {
        self.state.exponential_backoff()
    }

    fn attempt(&self) -> u32 {
        self.state.attempt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exponential_delay_doubles_until_cap() {
        let mut state = RetryState::new(10, Duration::from_millis(100), Duration::from_secs(1));

        assert_eq!(state.exponential_backoff(), Duration::from_millis(100));
        assert_eq!(state.exponential_backoff(), Duration::from_millis(200));
        assert_eq!(state.exponential_backoff(), Duration::from_millis(400));
        assert_eq!(state.exponential_backoff(), Duration::from_millis(800));
        assert_eq!(state.exponential_backoff(), Duration::from_secs(1));
        assert_eq!(state.exponential_backoff(), Duration::from_secs(1));
        assert_eq!(state.retry_times(), 6);
        assert_eq!(state.attempt(), 4);
    }

    #[test]
    fn test_initial_backoff_above_cap_is_capped() {
        let mut state = RetryState::new(2, Duration::from_secs(5), Duration::from_secs(2));
        assert_eq!(state.exponential_backoff(), Duration::from_secs(2));
    }

    #[test]
    fn test_stop_retry_exhausts_budget() {
        let mut state = RetryState::new(1800, Duration::from_millis(10), Duration::from_secs(2));
        state.stop_retry();

        assert!(!state.should_retry());
        assert_eq!(state.attempt(), 0);
        assert_eq!(state.retry_times(), state.max_retry());
    }

    #[test]
    fn test_reduce_retry_saturates_at_zero() {
        let mut state = RetryState::new(3, Duration::from_millis(10), Duration::from_secs(2));
        state.reduce_retry();
        assert_eq!(state.retry_times(), 0);
        assert_eq!(state.attempt(), 3);

        state.record_retry();
        state.record_retry();
        state.reduce_retry();
        assert_eq!(state.retry_times(), 1);
    }

    #[test]
    fn test_attempt_never_underflows() {
        let mut state = RetryState::new(1, Duration::from_millis(1), Duration::from_millis(1));
        state.exponential_backoff();
        state.exponential_backoff();
        assert_eq!(state.attempt(), 0);
    }

    #[test]
    fn test_builder_defaults() {
        let state = RetryState::builder().build();

        assert_eq!(state.max_retry(), 3);
        assert_eq!(state.next_backoff, Duration::from_millis(10));
        assert_eq!(state.max_backoff, Duration::from_secs(2));
        assert_eq!(state.jitter, 0.0);
    }

    #[test]
    fn test_jitter_clamped() {
        assert_eq!(RetryState::builder().jitter(2.0).build().jitter, 1.0);
        assert_eq!(RetryState::builder().jitter(-0.5).build().jitter, 0.0);
    }

    #[test]
    fn test_jitter_stays_within_range_and_cap() {
        let template = RetryState::builder()
            .max_retry(100)
            .initial_backoff(Duration::from_secs(1))
            .max_backoff(Duration::from_secs(60))
            .jitter(0.5)
            .build();

        let mut delays = Vec::new();
        for _ in 0..20 {
            let mut state = template.clone();
            delays.push(state.exponential_backoff());
        }

        for delay in &delays {
            let millis = delay.as_millis();
            assert!(
                (500..=1500).contains(&millis),
                "delay with 50% jitter should be in [500ms, 1500ms], got {}ms",
                millis
            );
        }
        let all_same = delays.windows(2).all(|w| w[0] == w[1]);
        assert!(!all_same, "with randomization, delays should vary");
    }

    #[test]
    fn test_from_tuning() {
        let tuning = RetryTuning::new(64, Duration::from_millis(8), Duration::from_secs(1));
        let state = RetryState::from(tuning);
        assert_eq!(state, tuning.retry_state());
        assert_eq!(state.attempt(), 64);
    }

    #[test]
    fn test_exponential_backoffer_retries_everything() {
        let mut bo = ExponentialBackoffer::new(RetryTuning::new(
            3,
            Duration::from_millis(50),
            Duration::from_secs(4),
        ));

        let err = std::io::Error::other("split not finished");
        assert_eq!(bo.next_backoff(&err), Duration::from_millis(50));
        assert_eq!(bo.next_backoff(&err), Duration::from_millis(100));
        assert_eq!(Backoffer::<std::io::Error>::attempt(&bo), 1);
        assert_eq!(bo.state().retry_times(), 2);

        bo.state_mut().stop_retry();
        assert_eq!(Backoffer::<std::io::Error>::attempt(&bo), 0);
    }

    proptest! {
        /// Without jitter, delays never decrease and never exceed the cap.
        #[test]
        fn prop_delays_non_decreasing_and_capped(
            initial_ms in 1u64..500,
            cap_ms in 1u64..5_000,
            steps in 1usize..64,
        ) {
            let cap = Duration::from_millis(cap_ms);
            let mut state = RetryState::new(u32::MAX, Duration::from_millis(initial_ms), cap);
            let mut previous = Duration::ZERO;
            for _ in 0..steps {
                let delay = state.exponential_backoff();
                prop_assert!(delay >= previous);
                prop_assert!(delay <= cap);
                previous = delay;
            }
        }
    }
}
