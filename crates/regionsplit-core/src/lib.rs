#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Retry primitives for the regionsplit workspace.
//!
//! This crate holds the domain-free half of region scanning:
//!
//! - **[`RetryState`](retry::RetryState)**: an exponential backoff counter that
//!   can be stopped, refunded and queried for remaining attempts
//! - **[`Backoffer`](retry::Backoffer)**: a policy that turns an observed error
//!   into the next wait (or a stop)
//! - **[`with_retry`](retry::with_retry)**: the driver that re-runs an async
//!   operation under a backoffer until success, exhaustion or cancellation
//! - **[`RetryTuning`](retry::RetryTuning)**: a named `{retry_times, interval,
//!   max_interval}` triple from which states and backoffers are built
//!
//! # Examples
//!
//! ```rust
//! use regionsplit_core::prelude::*;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), std::io::Error> {
//! let cancel = CancellationToken::new();
//! let mut backoffer = ExponentialBackoffer::new(RetryTuning::new(
//!     3,
//!     Duration::from_millis(10),
//!     Duration::from_millis(100),
//! ));
//!
//! let value = with_retry(&cancel, &mut backoffer, || async { Ok::<_, std::io::Error>(42) })
//!     .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

pub mod retry;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use regionsplit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::retry::{
        Backoffer, ExponentialBackoffer, RetryState, RetryStateBuilder, RetryTuning, with_retry,
        with_retry_inspect,
    };
}
