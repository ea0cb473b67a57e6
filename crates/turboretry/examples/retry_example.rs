//! Example: retrying a flaky call
//!
//! This example demonstrates:
//! 1. Simple retry with exponential backoff
//! 2. Custom retry predicate (only retry network errors)
//! 3. Global timeout and cancellation
//!
//! Run with:
//! ```bash
//! RUST_LOG=turboretry=debug cargo run -p turboretry --example retry_example
//! ```

use anyhow::Result;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use turboretry::prelude::*;

/// A simulated API that fails the first few times
struct UnreliableApi {
    attempts: Arc<AtomicU32>,
    fail_count: u32,
}

impl UnreliableApi {
    fn new(fail_count: u32) -> Self {
        Self {
            attempts: Arc::new(AtomicU32::new(0)),
            fail_count,
        }
    }

    async fn call(&self, attempt: u32) -> Result<String, io::Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if attempt < self.fail_count {
            println!("  Attempt {}: FAILED (connection reset)", attempt + 1);
            Err(io::Error::from(io::ErrorKind::ConnectionReset))
        } else {
            println!("  Attempt {}: SUCCESS", attempt + 1);
            Ok("API response data".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

/// Example 1: Simple retry with exponential backoff
async fn example_simple_retry() -> Result<()> {
    println!("\n=== Example 1: Simple Retry with Exponential Backoff ===\n");

    let options = RetryOptions::<io::Error>::new()
        .max_retries(3)
        .base_delay(Duration::from_millis(100))
        .jitter(false) // No jitter for predictable output
        .on_retry(|err, retry, delay| println!("  Retry #{retry} in {delay:?} after: {err}"));

    let api = UnreliableApi::new(2);

    println!("Calling unreliable API (will fail 2 times before succeeding)...");
    let start = Instant::now();

    let result = execute_with_retry(
        |attempt| {
            let api = &api;
            async move { api.call(attempt).await }
        },
        options,
    )
    .await?;

    println!("\nResult: {}", result);
    println!("Total attempts: {}", api.total_attempts());
    println!("Total time: {:?}", start.elapsed());
    println!("Expected delays: 100ms + 200ms = ~300ms");

    Ok(())
}

/// Example 2: Custom retry predicate (only retry network errors)
async fn example_custom_predicate() -> Result<()> {
    println!("\n=== Example 2: Custom Retry Predicate (Network Errors Only) ===\n");

    let network_only = |err: &io::Error, _attempt: u32| {
        matches!(
            err.kind(),
            io::ErrorKind::ConnectionReset | io::ErrorKind::TimedOut
        )
    };
    let options = RetryOptions::new()
        .max_retries(3)
        .base_delay(Duration::from_millis(10))
        .retry_on(network_only);

    println!("Test 1: Auth error (should NOT retry)");
    let result = execute_with_retry(
        |_| async {
            Err::<(), _>(io::Error::new(io::ErrorKind::PermissionDenied, "auth failed"))
        },
        options.clone(),
    )
    .await;
    match result {
        Err(RetryError::Rejected(err)) => println!("  Rejected as-is: {err}"),
        other => anyhow::bail!("expected a rejection, got {other:?}"),
    }

    println!("\nTest 2: Network error (should retry)");
    let api = UnreliableApi::new(2);
    let value = execute_with_retry(
        |attempt| {
            let api = &api;
            async move { api.call(attempt).await }
        },
        options,
    )
    .await?;
    println!("  Got {value:?} after {} attempts", api.total_attempts());

    Ok(())
}

/// Example 3: Timeout and cancellation
async fn example_timeout_and_cancel() -> Result<()> {
    println!("\n=== Example 3: Timeout and Cancellation ===\n");

    let slow_failure = |_attempt: u32| async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Err::<(), _>(io::Error::from(io::ErrorKind::TimedOut))
    };

    let options = RetryOptions::new()
        .max_retries(10)
        .base_delay(Duration::from_millis(1000))
        .timeout(Duration::from_millis(500));
    let err = execute_with_retry(slow_failure, options)
        .await
        .expect_err("should time out");
    println!("Timeout: {err}");

    let signal = CancellationSignal::new();
    let canceller = signal.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        canceller.cancel_with_reason("user pressed ctrl-c");
    });

    let options = RetryOptions::new()
        .max_retries(10)
        .base_delay(Duration::from_millis(1000))
        .jitter(false)
        .cancellation(signal);
    let err = execute_with_retry(slow_failure, options)
        .await
        .expect_err("should be cancelled");
    println!("Cancelled: {err}");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("==============================================");
    println!("   TurboRetry: Retry Examples");
    println!("==============================================");

    example_simple_retry().await?;
    example_custom_predicate().await?;
    example_timeout_and_cancel().await?;

    println!("\n==============================================");
    println!("   All examples completed successfully!");
    println!("==============================================\n");

    Ok(())
}
