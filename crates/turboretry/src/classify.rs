//! Retryability classification.
//!
//! The default policy looks at two things an error can expose through
//! [`RetryableError`]: a transport-level error code and an HTTP status.
//! Anything it does not recognize is treated as transient.

use std::io;
use std::sync::Arc;

/// Transport error codes that indicate a transient network fault.
pub const TRANSIENT_NETWORK_CODES: &[&str] = &[
    "ECONNRESET",
    "ECONNREFUSED",
    "ECONNABORTED",
    "ETIMEDOUT",
    "EPIPE",
    "ENOTFOUND",
    "EAI_AGAIN",
    "ENETUNREACH",
    "EHOSTUNREACH",
    "ENETDOWN",
];

/// Details the default retry policy inspects on an error.
///
/// Every method defaults to `None`, so an empty impl is valid and makes the
/// default policy retry the error.
///
/// # Examples
///
/// ```rust
/// use turboretry::classify::{RetryableError, is_retryable_http_status};
///
/// #[derive(Debug)]
/// struct ApiError {
///     status: u16,
/// }
///
/// impl RetryableError for ApiError {
///     fn status(&self) -> Option<u16> {
///         Some(self.status)
///     }
/// }
///
/// assert!(is_retryable_http_status(&ApiError { status: 503 }));
/// assert!(!is_retryable_http_status(&ApiError { status: 404 }));
/// ```
pub trait RetryableError {
    /// Transport error code such as `"ECONNRESET"`.
    fn network_code(&self) -> Option<&str> {
        None
    }

    /// HTTP status carried directly by the error.
    fn status(&self) -> Option<u16> {
        None
    }

    /// HTTP status of a response nested inside the error.
    fn response_status(&self) -> Option<u16> {
        None
    }
}

impl RetryableError for io::Error {
    fn network_code(&self) -> Option<&str> {
        let code = match self.kind() {
            io::ErrorKind::ConnectionReset => "ECONNRESET",
            io::ErrorKind::ConnectionRefused => "ECONNREFUSED",
            io::ErrorKind::ConnectionAborted => "ECONNABORTED",
            io::ErrorKind::TimedOut => "ETIMEDOUT",
            io::ErrorKind::BrokenPipe => "EPIPE",
            io::ErrorKind::NetworkUnreachable => "ENETUNREACH",
            io::ErrorKind::HostUnreachable => "EHOSTUNREACH",
            io::ErrorKind::NetworkDown => "ENETDOWN",
            _ => return None,
        };
        Some(code)
    }
}

impl<T: RetryableError + ?Sized> RetryableError for &T {
    fn network_code(&self) -> Option<&str> {
        (**self).network_code()
    }

    fn status(&self) -> Option<u16> {
        (**self).status()
    }

    fn response_status(&self) -> Option<u16> {
        (**self).response_status()
    }
}

impl<T: RetryableError + ?Sized> RetryableError for Box<T> {
    fn network_code(&self) -> Option<&str> {
        (**self).network_code()
    }

    fn status(&self) -> Option<u16> {
        (**self).status()
    }

    fn response_status(&self) -> Option<u16> {
        (**self).response_status()
    }
}

impl<T: RetryableError + ?Sized> RetryableError for Arc<T> {
    fn network_code(&self) -> Option<&str> {
        (**self).network_code()
    }

    fn status(&self) -> Option<u16> {
        (**self).status()
    }

    fn response_status(&self) -> Option<u16> {
        (**self).response_status()
    }
}

/// Whether the error carries one of the [`TRANSIENT_NETWORK_CODES`].
pub fn is_transient_network_error<E: RetryableError + ?Sized>(error: &E) -> bool {
    error
        .network_code()
        .is_some_and(|code| TRANSIENT_NETWORK_CODES.contains(&code))
}

/// HTTP status of the error itself, falling back to its nested response.
pub fn http_status<E: RetryableError + ?Sized>(error: &E) -> Option<u16> {
    error.status().or_else(|| error.response_status())
}

/// `true` for 429 and every 5xx status, `false` otherwise (including when
/// the error has no status at all).
pub fn is_retryable_http_status<E: RetryableError + ?Sized>(error: &E) -> bool {
    matches!(http_status(error), Some(429 | 500..=599))
}

/// Built-in retry decision.
///
/// In order:
/// 1. transient network code: retry
/// 2. HTTP 429 or 5xx: retry, any other 4xx: stop
/// 3. nothing recognized: retry
pub fn default_should_retry<E: RetryableError + ?Sized>(error: &E, _attempt: u32) -> bool {
    if is_transient_network_error(error) {
        return true;
    }
    match http_status(error) {
        Some(429) => true,
        Some(500..=599) => true,
        Some(400..=499) => false,
        _ => true,
    }
}

/// Decides whether a failed attempt should be retried.
///
/// `attempt` is the 0-based index of the attempt that just failed. The
/// returned verdict is final; a custom policy is never merged with
/// [`DefaultRetryPolicy`].
///
/// Any `Fn(&E, u32) -> bool + Send + Sync` closure is a policy.
pub trait RetryPolicy<E>: Send + Sync {
    /// Return `true` to retry, `false` to hand the error back unchanged.
    fn should_retry(&self, error: &E, attempt: u32) -> bool;
}

impl<E, F> RetryPolicy<E> for F
where
    F: Fn(&E, u32) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E, attempt: u32) -> bool {
        self(error, attempt)
    }
}

/// The policy used when no custom predicate is configured.
///
/// See [`default_should_retry`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRetryPolicy;

impl<E: RetryableError> RetryPolicy<E> for DefaultRetryPolicy {
    fn should_retry(&self, error: &E, attempt: u32) -> bool {
        default_should_retry(error, attempt)
    }
}
