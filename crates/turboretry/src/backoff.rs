//! Exponential backoff with full jitter.

use rand::Rng;
use std::time::Duration;

/// Compute the un-jittered delay before retry number `retry_index`.
///
/// `retry_index` 0 is the delay before the *first* retry. The delay grows as
/// `base * 2^retry_index` and is capped at `cap`.
///
/// # Mathematical Formula
///
/// ```text
/// delay = min(cap, base * 2^retry_index)
/// ```
///
/// When the exponential term no longer fits in a [`Duration`] the result is
/// `cap`, never a wrapped or saturated intermediate.
///
/// # Examples
///
/// ```rust
/// use turboretry::backoff::compute_backoff;
/// use std::time::Duration;
///
/// let base = Duration::from_millis(100);
/// let cap = Duration::from_secs(5);
///
/// assert_eq!(compute_backoff(0, base, cap), Duration::from_millis(100));
/// assert_eq!(compute_backoff(3, base, cap), Duration::from_millis(800));
/// assert_eq!(compute_backoff(200, base, cap), cap);
/// ```
pub fn compute_backoff(retry_index: u32, base: Duration, cap: Duration) -> Duration {
    2u32.checked_pow(retry_index)
        .and_then(|factor| base.checked_mul(factor))
        .map_or(cap, |delay| delay.min(cap))
}

/// Randomize `delay` uniformly into `[0, delay)`.
///
/// Returns [`Duration::ZERO`] when `delay` is zero.
pub fn apply_full_jitter(delay: Duration) -> Duration {
    apply_full_jitter_with(delay, &mut rand::thread_rng())
}

/// Same as [`apply_full_jitter`] with a caller-supplied random source.
pub fn apply_full_jitter_with<R: Rng + ?Sized>(delay: Duration, rng: &mut R) -> Duration {
    let nanos = u64::try_from(delay.as_nanos()).unwrap_or(u64::MAX);
    if nanos == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(rng.gen_range(0..nanos))
}

/// Exponential backoff parameters for one retry run.
///
/// Holds already-validated values; see [`crate::config::RetryOptions`] for the
/// user-facing knobs.
///
/// # Performance Characteristics
///
/// - **Memory**: O(1), `Copy`
/// - **CPU**: O(1) per retry, one checked multiply plus at most one random draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    base: Duration,
    cap: Duration,
    jitter: bool,
}

impl ExponentialBackoff {
    /// Create a backoff from a base delay, a cap and a jitter switch.
    pub fn new(base: Duration, cap: Duration, jitter: bool) -> Self {
        Self { base, cap, jitter }
    }

    /// Base delay before the first retry.
    pub fn base(&self) -> Duration {
        self.base
    }

    /// Upper bound on any single delay.
    pub fn cap(&self) -> Duration {
        self.cap
    }

    /// Whether full jitter is applied.
    pub fn jitter(&self) -> bool {
        self.jitter
    }

    /// Delay before retry number `retry_index` (0-based).
    ///
    /// The exponential delay is always computed first and jittered second.
    pub fn delay(&self, retry_index: u32) -> Duration {
        let delay = compute_backoff(retry_index, self.base, self.cap);
        if self.jitter {
            apply_full_jitter(delay)
        } else {
            delay
        }
    }
}
