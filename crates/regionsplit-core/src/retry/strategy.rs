//! The backoff policy abstraction consumed by the retry driver.

use std::time::Duration;

/// A policy deciding how long to wait after a failed attempt, and whether to
/// keep trying at all.
///
/// A backoffer is exclusively owned by one retry loop. It is told about every
/// failure through [`next_backoff`](Backoffer::next_backoff) and is asked for
/// the remaining budget through [`attempt`](Backoffer::attempt); the driver
/// stops as soon as the budget reaches zero.
///
/// # Design Philosophy
///
/// Classification lives in the backoffer rather than in the driver, so the
/// same driver serves policies that retry everything as well as policies that
/// only retry one error kind and stop on anything else.
///
/// # Examples
///
/// ```rust
/// use regionsplit_core::retry::{Backoffer, RetryState};
/// use std::time::Duration;
///
/// /// Retries "busy" errors only.
/// struct BusyOnly {
///     state: RetryState,
/// }
///
/// impl Backoffer<std::io::Error> for BusyOnly {
///     fn next_backoff(&mut self, err: &std::io::Error) -> Duration {
///         if err.to_string().contains("busy") {
///             self.state.exponential_backoff()
///         } else {
///             self.state.stop_retry();
///             Duration::ZERO
///         }
///     }
///
///     fn attempt(&self) -> u32 {
///         self.state.attempt()
///     }
/// }
///
/// let mut bo = BusyOnly {
///     state: RetryState::new(5, Duration::from_millis(1), Duration::from_millis(8)),
/// };
/// assert_eq!(bo.next_backoff(&std::io::Error::other("server busy")), Duration::from_millis(1));
/// assert_eq!(bo.attempt(), 4);
/// assert_eq!(bo.next_backoff(&std::io::Error::other("denied")), Duration::ZERO);
/// assert_eq!(bo.attempt(), 0);
/// ```
pub trait Backoffer<E: ?Sized>: Send {
    /// Record a failure and return how long to wait before the next attempt.
    ///
    /// A policy that refuses to retry `err` must leave
    /// [`attempt`](Backoffer::attempt) at zero and should return
    /// [`Duration::ZERO`].
    fn next_backoff(&mut self, err: &E) -> Duration;

    /// Remaining attempts. Zero means the driver must stop.
    fn attempt(&self) -> u32;
}

impl<E: ?Sized, B: Backoffer<E> + ?Sized> Backoffer<E> for Box<B> {
    fn next_backoff(&mut self, err: &E) -> Duration {
        (**self).next_backoff(err)
    }

    fn attempt(&self) -> u32 {
        (**self).attempt()
    }
}
