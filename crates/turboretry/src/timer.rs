//! Sleep that can be interrupted by a [`CancellationSignal`].

use crate::cancel::{CancelReason, CancellationSignal};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

/// The wait ended because the signal was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("wait cancelled")]
pub struct Cancelled {
    /// Reason reported by the signal, if any.
    pub reason: Option<CancelReason>,
}

impl Cancelled {
    fn from_signal(signal: &CancellationSignal) -> Self {
        Self {
            reason: signal.reason(),
        }
    }
}

/// Suspend for `duration`, or until `signal` is cancelled, whichever is first.
///
/// - An already-cancelled signal settles on the first poll without arming a
///   timer or registering a listener.
/// - The timer and the cancellation listener are released on every exit:
///   elapsed, cancelled, or the returned future being dropped.
///
/// # Examples
///
/// ```rust
/// use turboretry::cancel::CancellationSignal;
/// use turboretry::timer;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let signal = CancellationSignal::new();
/// signal.cancel_with_reason("stop");
///
/// let err = timer::sleep(Duration::from_secs(60), Some(&signal))
///     .await
///     .unwrap_err();
/// assert_eq!(err.reason.unwrap().as_str(), "stop");
/// # }
/// ```
pub async fn sleep(
    duration: Duration,
    signal: Option<&CancellationSignal>,
) -> Result<(), Cancelled> {
    let Some(signal) = signal else {
        tokio::time::sleep(duration).await;
        return Ok(());
    };

    let (tx, rx) = oneshot::channel::<()>();
    // `None` means the signal is already cancelled
    let Some(_guard) = signal.register(move || {
        let _ = tx.send(());
    }) else {
        return Err(Cancelled::from_signal(signal));
    };

    tokio::select! {
        biased;
        _ = rx => Err(Cancelled::from_signal(signal)),
        () = tokio::time::sleep(duration) => Ok(()),
    }
}
