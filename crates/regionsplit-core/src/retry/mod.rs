//! Retry state, backoff policies and the retry driver.
//!
//! # Key Types
//!
//! - [`RetryState`] - exponential backoff counter with a refundable budget
//! - [`Backoffer`] - error classification plus next-delay computation
//! - [`ExponentialBackoffer`] - a backoffer that retries every error
//! - [`with_retry`] - drives an async operation under a backoffer
//! - [`with_retry_inspect`] - the same, with a hook that sees each failure
//!   before the next delay is computed
//!
//! # Examples
//!
//! ```rust
//! use regionsplit_core::retry::{RetryState, RetryTuning};
//! use std::time::Duration;
//!
//! let mut state = RetryTuning::new(4, Duration::from_millis(10), Duration::from_millis(25))
//!     .retry_state();
//!
//! assert_eq!(state.exponential_backoff(), Duration::from_millis(10));
//! assert_eq!(state.exponential_backoff(), Duration::from_millis(20));
//! assert_eq!(state.exponential_backoff(), Duration::from_millis(25));
//! assert_eq!(state.attempt(), 1);
//! ```

mod driver;
mod exponential;
mod strategy;
mod tuning;

pub use driver::{with_retry, with_retry_inspect};
pub use exponential::{ExponentialBackoffer, RetryState, RetryStateBuilder};
pub use strategy::Backoffer;
pub use tuning::RetryTuning;
