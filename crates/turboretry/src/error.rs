//! Outcome types for a retry run.
//!
//! A run ends in exactly one of: the operation's success value, a
//! configuration error, the operation's own error handed back unchanged
//! (policy rejection), or a [`RetryFailure`] tagged with a [`FailureKind`].

use crate::cancel::CancelReason;
use crate::config::ConfigError;
use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Result type alias for retry runs.
pub type Result<T, E> = std::result::Result<T, RetryError<E>>;

/// Why the retry loop gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The global time budget ran out.
    Timeout,
    /// The cancellation signal fired.
    Cancelled,
    /// Every permitted attempt failed.
    Exhausted,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Exhausted => "exhausted",
        };
        f.write_str(name)
    }
}

/// Bookkeeping attached to every [`RetryFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryMetadata {
    /// Number of times the operation was actually invoked.
    pub total_attempts: u32,
    /// Wall-clock time since the run started.
    pub total_elapsed: Duration,
}

impl RetryMetadata {
    /// Elapsed time in whole milliseconds.
    pub fn total_elapsed_ms(&self) -> u128 {
        self.total_elapsed.as_millis()
    }
}

/// A terminal failure produced by the retry loop itself.
///
/// Carries the last error observed from the operation (if any) as its
/// `cause`, and for cancellations the reason given to the signal.
#[derive(Debug)]
pub struct RetryFailure<E> {
    kind: FailureKind,
    metadata: RetryMetadata,
    cause: Option<E>,
    reason: Option<CancelReason>,
}

impl<E> RetryFailure<E> {
    pub(crate) fn new(kind: FailureKind, metadata: RetryMetadata, cause: Option<E>) -> Self {
        Self {
            kind,
            metadata,
            cause,
            reason: None,
        }
    }

    pub(crate) fn with_reason(mut self, reason: Option<CancelReason>) -> Self {
        self.reason = reason;
        self
    }

    /// Which terminal condition was reached.
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Attempts made and time spent.
    pub fn metadata(&self) -> RetryMetadata {
        self.metadata
    }

    /// The last error returned by the operation.
    ///
    /// Always present for [`FailureKind::Exhausted`]; absent when a timeout or
    /// cancellation happened before any attempt failed.
    pub fn cause(&self) -> Option<&E> {
        self.cause.as_ref()
    }

    /// Take ownership of the last operation error.
    pub fn into_cause(self) -> Option<E> {
        self.cause
    }

    /// The cancellation reason, for [`FailureKind::Cancelled`].
    pub fn cancel_reason(&self) -> Option<&CancelReason> {
        self.reason.as_ref()
    }
}

impl<E: fmt::Display> fmt::Display for RetryFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attempts = self.metadata.total_attempts;
        let elapsed = self.metadata.total_elapsed_ms();
        match self.kind {
            FailureKind::Timeout => {
                write!(f, "retry timed out after {attempts} attempt(s) in {elapsed}ms")?
            }
            FailureKind::Cancelled => {
                write!(f, "retry cancelled after {attempts} attempt(s) in {elapsed}ms")?;
                if let Some(reason) = &self.reason {
                    write!(f, " ({reason})")?;
                }
            }
            FailureKind::Exhausted => {
                write!(f, "retry exhausted after {attempts} attempt(s) in {elapsed}ms")?
            }
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl<E: Error + 'static> Error for RetryFailure<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match (&self.cause, &self.reason) {
            (Some(cause), _) => Some(cause),
            (None, Some(reason)) => Some(reason),
            (None, None) => None,
        }
    }
}

/// Error returned by a retry run.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The options were invalid; no attempt was made.
    Config(ConfigError),
    /// The retry policy declined to retry; this is the operation's own error,
    /// untouched.
    Rejected(E),
    /// The loop stopped on timeout, cancellation, or exhaustion.
    Failed(RetryFailure<E>),
}

impl<E> RetryError<E> {
    /// Failure kind, when the loop itself gave up.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            RetryError::Failed(failure) => Some(failure.kind()),
            _ => None,
        }
    }

    /// Metadata, present on every loop failure.
    pub fn metadata(&self) -> Option<RetryMetadata> {
        match self {
            RetryError::Failed(failure) => Some(failure.metadata()),
            _ => None,
        }
    }

    /// The terminal failure, if the loop gave up.
    pub fn as_failure(&self) -> Option<&RetryFailure<E>> {
        match self {
            RetryError::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// The operation's error when the retry policy rejected it.
    pub fn into_rejected(self) -> Option<E> {
        match self {
            RetryError::Rejected(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the global time budget ran out.
    pub fn is_timeout(&self) -> bool {
        self.kind() == Some(FailureKind::Timeout)
    }

    /// Whether the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.kind() == Some(FailureKind::Cancelled)
    }

    /// Whether all attempts were used up.
    pub fn is_exhausted(&self) -> bool {
        self.kind() == Some(FailureKind::Exhausted)
    }
}

impl<E> From<ConfigError> for RetryError<E> {
    fn from(err: ConfigError) -> Self {
        RetryError::Config(err)
    }
}

impl<E> From<RetryFailure<E>> for RetryError<E> {
    fn from(failure: RetryFailure<E>) -> Self {
        RetryError::Failed(failure)
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Config(err) => write!(f, "invalid retry configuration: {err}"),
            RetryError::Rejected(err) => fmt::Display::fmt(err, f),
            RetryError::Failed(failure) => fmt::Display::fmt(failure, f),
        }
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetryError::Config(err) => Some(err),
            RetryError::Rejected(err) => err.source(),
            RetryError::Failed(failure) => failure.source(),
        }
    }
}
