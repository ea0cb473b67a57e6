#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Retry orchestration for fallible async operations.
//!
//! `turboretry` runs an operation repeatedly until it succeeds or a terminal
//! condition is reached:
//!
//! - **Capped exponential backoff** with optional full jitter
//! - **Retryability classification** of network codes and HTTP statuses,
//!   replaceable by any closure
//! - **Global timeout** checked before and after every attempt
//! - **Cooperative cancellation** that also interrupts the backoff sleep
//! - **Structured failures** carrying attempt count, elapsed time and the
//!   last error
//!
//! # Examples
//!
//! ```rust
//! use turboretry::prelude::*;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = RetryOptions::new()
//!     .max_retries(3)
//!     .base_delay(Duration::from_millis(5))
//!     .timeout(Duration::from_secs(2));
//!
//! let body = execute_with_retry(
//!     |_attempt| async { Ok::<_, std::io::Error>("payload") },
//!     options,
//! )
//! .await?;
//!
//! assert_eq!(body, "payload");
//! # Ok(())
//! # }
//! ```
//!
//! Loading the options from TOML:
//!
//! ```rust
//! use turboretry::{Retry, RetrySettings};
//!
//! let settings = RetrySettings::from_toml_str(
//!     r#"
//!     max_retries = 5
//!     base_delay_ms = 100
//!     timeout_ms = 10000
//!     "#,
//! )
//! .unwrap();
//!
//! let options = settings.into_options::<std::io::Error>().unwrap();
//! assert!(Retry::new(options).is_ok());
//! ```

pub mod backoff;
pub mod cancel;
pub mod classify;
pub mod clock;
pub mod config;
pub mod error;
pub mod retry;
pub mod timer;


pub use backoff::{ExponentialBackoff, apply_full_jitter, compute_backoff};
pub use cancel::{CancelReason, CancellationSignal};
pub use classify::{RetryPolicy, RetryableError, is_retryable_http_status};
pub use config::{ConfigError, RetryOptions, RetrySettings};
pub use error::{FailureKind, RetryError, RetryFailure, RetryMetadata};
pub use retry::{Retry, execute_with_retry};

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use turboretry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cancel::CancellationSignal;
    pub use crate::classify::{RetryPolicy, RetryableError};
    pub use crate::config::{RetryOptions, RetrySettings};
    pub use crate::error::{FailureKind, RetryError};
    pub use crate::retry::{Retry, execute_with_retry};
}
