//! Cooperative cancellation.
//!
//! A [`CancellationSignal`] is a cloneable handle to shared cancellation
//! state. Waiters register one-shot callbacks and hold the returned
//! [`ListenerGuard`] for as long as they wait; dropping the guard removes the
//! callback, so no listener outlives the wait that installed it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use thiserror::Error;
use tokio::sync::oneshot;

/// Why a signal was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("{0}")]
pub struct CancelReason(Arc<str>);

impl CancelReason {
    /// Create a reason from any message.
    pub fn new(message: impl Into<Arc<str>>) -> Self {
        Self(message.into())
    }

    /// The reason text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CancelReason {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for CancelReason {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

type Listener = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct State {
    cancelled: bool,
    reason: Option<CancelReason>,
    next_id: u64,
    listeners: HashMap<u64, Listener>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// External cancellation handle shared between a caller and a retry run.
///
/// Cancelling is idempotent: the first call wins, later calls (and later
/// reasons) are ignored. Registered listeners run exactly once, on the
/// cancelling thread, after the internal lock is released.
///
/// # Examples
///
/// ```rust
/// use turboretry::cancel::CancellationSignal;
///
/// let signal = CancellationSignal::new();
/// let observer = signal.clone();
///
/// signal.cancel_with_reason("shutting down");
///
/// assert!(observer.is_cancelled());
/// assert_eq!(observer.reason().unwrap().as_str(), "shutting down");
/// ```
#[derive(Clone, Default)]
pub struct CancellationSignal {
    inner: Arc<Inner>,
}

impl CancellationSignal {
    /// Create a signal that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel without a reason.
    pub fn cancel(&self) {
        self.trigger(None);
    }

    /// Cancel with a reason that is reported to waiters.
    pub fn cancel_with_reason(&self, reason: impl Into<CancelReason>) {
        self.trigger(Some(reason.into()));
    }

    fn trigger(&self, reason: Option<CancelReason>) {
        let listeners = {
            let mut state = self.inner.lock();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            state.reason = reason;
            std::mem::take(&mut state.listeners)
        };

        tracing::trace!(listeners = listeners.len(), "Cancellation signalled");
        for (_, listener) in listeners {
            listener();
        }
    }

    /// Whether the signal has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.lock().cancelled
    }

    /// The reason given at cancellation, if any.
    pub fn reason(&self) -> Option<CancelReason> {
        self.inner.lock().reason.clone()
    }

    /// Register a one-shot callback fired on cancellation.
    ///
    /// Returns `None`, without calling `listener`, when the signal is already
    /// cancelled. Otherwise the callback stays registered until it fires or
    /// the returned guard is dropped, whichever comes first.
    #[must_use = "dropping the guard deregisters the listener immediately"]
    pub fn register<F>(&self, listener: F) -> Option<ListenerGuard>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.inner.lock();
        if state.cancelled {
            return None;
        }
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.insert(id, Box::new(listener));
        tracing::trace!(listener = id, "Cancellation listener registered");

        Some(ListenerGuard {
            inner: Arc::downgrade(&self.inner),
            id,
        })
    }

    /// Number of callbacks currently registered.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Wait until the signal is cancelled.
    ///
    /// Completes immediately when already cancelled. Dropping the returned
    /// future deregisters its listener.
    pub async fn cancelled(&self) {
        let (tx, rx) = oneshot::channel();
        let Some(_guard) = self.register(move || {
            let _ = tx.send(());
        }) else {
            return;
        };
        let _ = rx.await;
    }
}

impl fmt::Debug for CancellationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("CancellationSignal")
            .field("cancelled", &state.cancelled)
            .field("reason", &state.reason)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

/// Keeps a cancellation callback registered; deregisters it on drop.
#[must_use = "dropping the guard deregisters the listener immediately"]
pub struct ListenerGuard {
    inner: Weak<Inner>,
    id: u64,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade()
            && inner.lock().listeners.remove(&self.id).is_some()
        {
            tracing::trace!(listener = self.id, "Cancellation listener removed");
        }
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}
