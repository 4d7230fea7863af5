//! Example: driving an operation with `with_retry`
//!
//! This example demonstrates:
//! 1. Retrying a flaky operation with an exponential backoffer
//! 2. A custom backoffer that stops on non-retryable errors
//! 3. Refunding budget from the inspect hook
//!
//! Run with:
//! ```bash
//! cargo run -p regionsplit-core --example retry_example
//! ```

use regionsplit_core::prelude::*;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// A simulated service that needs a few calls before it is ready.
struct SlowService {
    calls: u32,
    ready_after: u32,
}

impl SlowService {
    fn new(ready_after: u32) -> Self {
        Self {
            calls: 0,
            ready_after,
        }
    }

    fn call(&mut self) -> Result<&'static str, std::io::Error> {
        self.calls += 1;
        if self.calls <= self.ready_after {
            println!("  Call {}: not ready", self.calls);
            Err(std::io::Error::other(format!("not ready on call {}", self.calls)))
        } else {
            println!("  Call {}: ready", self.calls);
            Ok("ready")
        }
    }
}

/// Example 1: retry everything
async fn example_simple_retry(cancel: &CancellationToken) -> Result<(), std::io::Error> {
    println!("\n=== Example 1: Exponential backoff ===\n");

    let mut backoffer = RetryTuning::new(5, Duration::from_millis(50), Duration::from_millis(400))
        .backoffer();
    let mut service = SlowService::new(2);

    let start = Instant::now();
    let result = with_retry(cancel, &mut backoffer, || {
        let outcome = service.call();
        async move { outcome }
    })
    .await?;

    println!("\nResult: {} after {:?}", result, start.elapsed());
    println!("Consumed attempts: {}", backoffer.state().retry_times());
    Ok(())
}

/// Example 2: stop on errors that will never succeed
struct NotReadyOnly {
    state: RetryState,
}

impl Backoffer<std::io::Error> for NotReadyOnly {
    fn next_backoff(&mut self, err: &std::io::Error) -> Duration {
        if err.to_string().contains("not ready") {
            self.state.exponential_backoff()
        } else {
            self.state.stop_retry();
            Duration::ZERO
        }
    }

    fn attempt(&self) -> u32 {
        self.state.attempt()
    }
}

async fn example_classifying_backoffer(cancel: &CancellationToken) {
    println!("\n=== Example 2: Classifying backoffer ===\n");

    let mut backoffer = NotReadyOnly {
        state: RetryState::new(10, Duration::from_millis(10), Duration::from_millis(80)),
    };
    let mut calls = 0;

    let result = with_retry(cancel, &mut backoffer, || {
        calls += 1;
        println!("  Call {}: permission denied", calls);
        async { Err::<(), _>(std::io::Error::other("permission denied")) }
    })
    .await;

    println!("\nResult: {:?} after {} call(s)", result, calls);
}

/// Example 3: refund budget while progress is visible
async fn example_progress_refund(cancel: &CancellationToken) {
    println!("\n=== Example 3: Progress refund ===\n");

    let mut backoffer = RetryTuning::new(2, Duration::from_millis(5), Duration::from_millis(20))
        .backoffer();
    let mut remaining_work = 6;

    let result = with_retry_inspect(
        cancel,
        &mut backoffer,
        || {
            remaining_work -= 1;
            let left = remaining_work;
            async move {
                if left > 0 {
                    println!("  {} unit(s) left, retrying", left);
                    Err(std::io::Error::other("still converging"))
                } else {
                    Ok("converged")
                }
            }
        },
        // Work shrank since the last attempt, so this failure is free.
        |bo: &mut ExponentialBackoffer, _err: &std::io::Error| bo.state_mut().reduce_retry(),
    )
    .await;

    println!("\nResult: {:?} with a budget of only 2 attempts", result);
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let cancel = CancellationToken::new();

    example_simple_retry(&cancel).await?;
    example_classifying_backoffer(&cancel).await;
    example_progress_refund(&cancel).await;

    Ok(())
}
