//! The retry loop.
//!
//! [`Retry`] runs an operation until it succeeds, the retry policy rejects an
//! error, the global timeout runs out, the cancellation signal fires, or every
//! permitted attempt has failed.
//!
//! Timeout and cancellation are checked before every attempt and again after
//! every failed attempt. Delays are clamped so the loop never sleeps past the
//! deadline, and the sleep itself is interrupted by cancellation.

use crate::backoff::ExponentialBackoff;
use crate::cancel::CancellationSignal;
use crate::classify::RetryPolicy;
use crate::clock::Clock;
use crate::config::{ConfigError, OnRetry, RetryOptions};
use crate::error::{FailureKind, RetryError, RetryFailure, RetryMetadata};
use crate::timer;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Run `operation` with retries.
///
/// `operation` receives the 0-based attempt index. Options are validated on
/// the first poll, before the operation is invoked or anything is awaited.
///
/// # Examples
///
/// ```rust
/// use turboretry::{RetryOptions, execute_with_retry};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = RetryOptions::new()
///     .max_retries(3)
///     .base_delay(Duration::from_millis(10))
///     .jitter(false);
///
/// let value = execute_with_retry(
///     |attempt| async move {
///         if attempt < 2 {
///             Err(std::io::Error::from(std::io::ErrorKind::ConnectionReset))
///         } else {
///             Ok(attempt)
///         }
///     },
///     options,
/// )
/// .await?;
///
/// assert_eq!(value, 2);
/// # Ok(())
/// # }
/// ```
pub async fn execute_with_retry<F, Fut, T, E>(
    operation: F,
    options: RetryOptions<E>,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let retry = Retry::new(options)?;
    retry.run(operation).await
}

/// A validated retry configuration, ready to run operations.
///
/// A `Retry` can run any number of operations, concurrently or not; each
/// [`Retry::run`] call keeps its own attempt counter and start time.
///
/// # Examples
///
/// ```rust
/// use turboretry::{Retry, RetryOptions};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let retry = Retry::new(
///     RetryOptions::<std::io::Error>::new()
///         .max_retries(0)
///         .base_delay(Duration::from_millis(10)),
/// )
/// .unwrap();
///
/// let err = retry
///     .run(|_| async { Err::<(), _>(std::io::Error::other("nope")) })
///     .await
///     .unwrap_err();
///
/// assert!(err.is_exhausted());
/// assert_eq!(err.metadata().unwrap().total_attempts, 1);
/// # }
/// ```
pub struct Retry<E> {
    max_retries: u32,
    backoff: ExponentialBackoff,
    timeout: Option<Duration>,
    retry_on: Arc<dyn RetryPolicy<E>>,
    on_retry: Option<OnRetry<E>>,
    cancellation: Option<CancellationSignal>,
    clock: Arc<dyn Clock>,
}

impl<E> Retry<E> {
    /// Validate `options`.
    ///
    /// Fails synchronously on the first violated constraint.
    pub fn new(options: RetryOptions<E>) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            max_retries: options.max_retries,
            backoff: ExponentialBackoff::new(options.base_delay, options.max_delay, options.jitter),
            timeout: options.timeout,
            retry_on: options.retry_on,
            on_retry: options.on_retry,
            cancellation: options.cancellation,
            clock: options.clock,
        })
    }

    /// Retries allowed after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Backoff parameters.
    pub fn backoff(&self) -> ExponentialBackoff {
        self.backoff
    }

    /// Global time budget, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run `operation` until it succeeds or the loop gives up.
    ///
    /// On success the value is returned as-is. When the retry policy declines
    /// an error, that error is returned unchanged in [`RetryError::Rejected`].
    /// Every other failure is a [`RetryFailure`] with attempts and elapsed
    /// time attached.
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let start = self.clock.now();
        let mut last_error: Option<E> = None;

        if self.is_cancelled() {
            return Err(self.fail(FailureKind::Cancelled, start, 0, None));
        }

        let mut attempt: u32 = 0;
        loop {
            if self.deadline_passed(start) {
                return Err(self.fail(FailureKind::Timeout, start, attempt, last_error));
            }
            if self.is_cancelled() {
                return Err(self.fail(FailureKind::Cancelled, start, attempt, last_error));
            }

            let err = match operation(attempt).await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            attempts = attempt.saturating_add(1),
                            "Operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };
            let attempts = attempt.saturating_add(1);

            if attempt >= self.max_retries {
                return Err(self.fail(FailureKind::Exhausted, start, attempts, Some(err)));
            }

            if !self.retry_on.should_retry(&err, attempt) {
                debug!(attempt, error = %err, "Error is not retryable");
                return Err(RetryError::Rejected(err));
            }

            if self.deadline_passed(start) {
                return Err(self.fail(FailureKind::Timeout, start, attempts, Some(err)));
            }
            if self.is_cancelled() {
                return Err(self.fail(FailureKind::Cancelled, start, attempts, Some(err)));
            }

            let delay = self.backoff.delay(attempt);
            let delay = match self.remaining(start) {
                Some(remaining) if remaining.is_zero() => {
                    return Err(self.fail(FailureKind::Timeout, start, attempts, Some(err)));
                }
                Some(remaining) => delay.min(remaining),
                None => delay,
            };

            debug!(
                attempt,
                retry = attempts,
                delay_ms = millis(delay),
                error = %err,
                "Retrying after failure"
            );
            if let Some(hook) = &self.on_retry {
                hook(&err, attempts, delay);
            }
            last_error = Some(err);

            if timer::sleep(delay, self.cancellation.as_ref()).await.is_err() {
                return Err(self.fail(FailureKind::Cancelled, start, attempts, last_error));
            }

            attempt = attempts;
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationSignal::is_cancelled)
    }

    /// Budget left, or `None` without a timeout.
    fn remaining(&self, start: Instant) -> Option<Duration> {
        self.timeout
            .map(|timeout| timeout.saturating_sub(self.clock.elapsed_since(start)))
    }

    fn deadline_passed(&self, start: Instant) -> bool {
        self.remaining(start).is_some_and(|remaining| remaining.is_zero())
    }

    fn fail(
        &self,
        kind: FailureKind,
        start: Instant,
        total_attempts: u32,
        cause: Option<E>,
    ) -> RetryError<E> {
        let metadata = RetryMetadata {
            total_attempts,
            total_elapsed: self.clock.elapsed_since(start),
        };
        debug!(
            kind = %kind,
            attempts = total_attempts,
            elapsed_ms = millis(metadata.total_elapsed),
            "Retry loop stopped"
        );

        let mut failure = RetryFailure::new(kind, metadata, cause);
        if kind == FailureKind::Cancelled {
            failure = failure.with_reason(self.cancellation.as_ref().and_then(|s| s.reason()));
        }
        failure.into()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl<E> Clone for Retry<E> {
    fn clone(&self) -> Self {
        Self {
            max_retries: self.max_retries,
            backoff: self.backoff,
            timeout: self.timeout,
            retry_on: Arc::clone(&self.retry_on),
            on_retry: self.on_retry.clone(),
            cancellation: self.cancellation.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<E> fmt::Debug for Retry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .field("timeout", &self.timeout)
            .field("on_retry", &self.on_retry.is_some())
            .field("cancellation", &self.cancellation)
            .finish_non_exhaustive()
    }
}
