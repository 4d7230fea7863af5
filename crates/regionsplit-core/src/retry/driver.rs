//! The generic retry driver.

use super::strategy::Backoffer;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run `operation` until it succeeds, the backoffer runs out of attempts, or
/// `cancel` fires.
///
/// After each failure the backoffer is asked for the next delay. If it has no
/// attempts left the failure is returned as is; otherwise the driver sleeps
/// for the delay, racing the sleep against `cancel`. The operation is always
/// invoked at least once, even with an exhausted budget or an already
/// cancelled token.
///
/// Cancellation is only observed between attempts. An attempt that is already
/// running completes before the driver notices.
///
/// The error returned on exhaustion or cancellation is the last error the
/// operation produced; no wrapper is added.
///
/// # Examples
///
/// ```rust
/// use regionsplit_core::retry::{ExponentialBackoffer, RetryTuning, with_retry};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let cancel = CancellationToken::new();
/// let mut bo = ExponentialBackoffer::new(RetryTuning::new(
///     5,
///     Duration::from_millis(1),
///     Duration::from_millis(4),
/// ));
///
/// let calls = Arc::new(AtomicU32::new(0));
/// let result = with_retry(&cancel, &mut bo, || {
///     let calls = Arc::clone(&calls);
///     async move {
///         let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
///         if call < 3 {
///             Err(std::io::Error::other("not ready"))
///         } else {
///             Ok(call)
///         }
///     }
/// })
/// .await;
///
/// assert_eq!(result.unwrap(), 3);
/// # }
/// ```
pub async fn with_retry<T, E, B, F, Fut>(
    cancel: &CancellationToken,
    backoffer: &mut B,
    operation: F,
) -> Result<T, E>
where
    B: Backoffer<E> + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send,
{
    with_retry_inspect(cancel, backoffer, operation, |_, _| {}).await
}

/// Like [`with_retry`], but hands the backoffer and the error to `inspect`
/// after every failed attempt, before the next delay is computed.
///
/// A caller uses this to adjust the budget based on what the failed attempt
/// observed, for example refunding a retry while the remote side is visibly
/// making progress.
///
/// # Examples
///
/// ```rust
/// use regionsplit_core::retry::{ExponentialBackoffer, RetryTuning, with_retry_inspect};
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let cancel = CancellationToken::new();
/// let mut bo = ExponentialBackoffer::new(RetryTuning::new(
///     2,
///     Duration::from_millis(1),
///     Duration::from_millis(1),
/// ));
///
/// let mut remaining = 4;
/// let result = with_retry_inspect(
///     &cancel,
///     &mut bo,
///     || {
///         remaining -= 1;
///         let left = remaining;
///         async move { if left > 0 { Err(left) } else { Ok("done") } }
///     },
///     // Less work left than last time: do not charge this failure.
///     |bo: &mut ExponentialBackoffer, _left: &i32| bo.state_mut().reduce_retry(),
/// )
/// .await;
///
/// assert_eq!(result, Ok("done"));
/// # }
/// ```
pub async fn with_retry_inspect<T, E, B, F, Fut, I>(
    cancel: &CancellationToken,
    backoffer: &mut B,
    mut operation: F,
    mut inspect: I,
) -> Result<T, E>
where
    B: Backoffer<E> + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send,
    I: FnMut(&mut B, &E),
{
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        inspect(&mut *backoffer, &err);
        let delay = backoffer.next_backoff(&err);
        if backoffer.attempt() == 0 {
            #[cfg(feature = "tracing")]
            tracing::debug!("retry budget exhausted, giving up");
            return Err(err);
        }
        if cancel.is_cancelled() {
            return Err(err);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            delay_ms = delay.as_millis() as u64,
            remaining = backoffer.attempt(),
            "attempt failed, backing off"
        );

        tokio::select! {
            _ = cancel.cancelled() => return Err(err),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
