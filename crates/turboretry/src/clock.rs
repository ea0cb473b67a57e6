//! Time source used to measure elapsed time across a retry run.

use std::fmt::Debug;
use std::time::Duration;
use tokio::time::Instant;

/// A monotonic time source.
///
/// The retry loop reads the clock once at entry and again at each timeout
/// check point, so a substitute clock fully controls timeout behavior.
pub trait Clock: Send + Sync + Debug {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Time elapsed since `start`, saturating at zero.
    fn elapsed_since(&self, start: Instant) -> Duration {
        self.now().saturating_duration_since(start)
    }
}

/// Clock backed by [`tokio::time::Instant`].
///
/// Follows tokio's paused/auto-advancing time, which gives tests a virtual
/// clock shared with [`crate::timer::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
