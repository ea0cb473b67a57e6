//! Retry configuration.
//!
//! [`RetrySettings`] holds the plain numeric knobs and can be loaded from
//! TOML, JSON (through serde) or the environment. [`RetryOptions`] adds the
//! injected behavior: retry policy, retry hook, cancellation signal and
//! clock. Validation happens once, when a [`crate::Retry`] is built.

use crate::cancel::CancellationSignal;
use crate::classify::{DefaultRetryPolicy, RetryPolicy, RetryableError};
use crate::clock::{Clock, TokioClock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(300);
/// Default upper bound on any single delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(5000);

/// Invalid retry configuration, or configuration that could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `max_retries` was below zero.
    #[error("max_retries must be non-negative, got {0}")]
    NegativeMaxRetries(i64),

    /// `max_retries` does not fit in a `u32`.
    #[error("max_retries must be at most 4294967295, got {0}")]
    MaxRetriesTooLarge(i64),

    /// The base delay was zero or negative.
    #[error("base delay must be positive, got {0}ms")]
    NonPositiveBaseDelay(i64),

    /// The max delay was smaller than the base delay.
    #[error("max delay ({max_ms}ms) must not be below base delay ({base_ms}ms)")]
    MaxDelayBelowBase {
        /// Configured base delay in milliseconds
        base_ms: i64,
        /// Configured max delay in milliseconds
        max_ms: i64,
    },

    /// The global timeout was zero or negative.
    #[error("timeout must be positive when set, got {0}ms")]
    NonPositiveTimeout(i64),

    /// An environment variable held an unparseable value.
    #[error("invalid value {value:?} for environment variable {var}")]
    InvalidEnv {
        /// Variable name
        var: String,
        /// Raw value
        value: String,
    },

    /// TOML could not be parsed.
    #[error("failed to parse retry settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Settings file could not be read.
    #[error("failed to read retry settings: {0}")]
    Io(#[from] std::io::Error),
}

/// Numeric retry settings with their defaults.
///
/// Fields are signed so values coming from files or the environment can be
/// validated as given rather than rejected by the parser.
///
/// # Examples
///
/// ```rust
/// use turboretry::config::RetrySettings;
///
/// let settings = RetrySettings::from_toml_str(
///     r#"
///     max_retries = 5
///     base_delay_ms = 100
///     timeout_ms = 2000
///     "#,
/// )
/// .unwrap();
///
/// assert_eq!(settings.max_retries, 5);
/// assert_eq!(settings.max_delay_ms, 5000); // default
/// assert!(settings.jitter); // default
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the first attempt (total attempts = 1 + `max_retries`).
    pub max_retries: i64,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: i64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: i64,
    /// Apply full jitter to every delay.
    pub jitter: bool,
    /// Global time budget across all attempts and delays, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<i64>,
}

impl Default for RetrySettings {
    /// Defaults:
    /// - `max_retries`: 3
    /// - `base_delay_ms`: 300
    /// - `max_delay_ms`: 5000
    /// - `jitter`: true
    /// - `timeout_ms`: none
    fn default() -> Self {
        Self {
            max_retries: i64::from(DEFAULT_MAX_RETRIES),
            base_delay_ms: millis(DEFAULT_BASE_DELAY),
            max_delay_ms: millis(DEFAULT_MAX_DELAY),
            jitter: true,
            timeout_ms: None,
        }
    }
}

impl RetrySettings {
    /// Parse settings from a TOML document. Missing keys take defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Read settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load settings from environment variables over the defaults.
    ///
    /// This will look for:
    /// - `TURBORETRY_MAX_RETRIES`
    /// - `TURBORETRY_BASE_DELAY_MS`
    /// - `TURBORETRY_MAX_DELAY_MS`
    /// - `TURBORETRY_JITTER` (`true`/`false`)
    /// - `TURBORETRY_TIMEOUT_MS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// Overwrite every field whose environment variable is present.
    ///
    /// Unset variables leave the current value alone, so an explicit value
    /// that equals the default still wins over a file setting.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use turboretry::RetrySettings;
    ///
    /// let settings = RetrySettings::from_file("retry.toml")?.apply_env()?;
    /// # Ok::<(), turboretry::ConfigError>(())
    /// ```
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Some(value) = env_var("TURBORETRY_MAX_RETRIES")? {
            self.max_retries = value;
        }
        if let Some(value) = env_var("TURBORETRY_BASE_DELAY_MS")? {
            self.base_delay_ms = value;
        }
        if let Some(value) = env_var("TURBORETRY_MAX_DELAY_MS")? {
            self.max_delay_ms = value;
        }
        if let Some(value) = env_var("TURBORETRY_JITTER")? {
            self.jitter = value;
        }
        if let Some(value) = env_var("TURBORETRY_TIMEOUT_MS")? {
            self.timeout_ms = Some(value);
        }

        Ok(self)
    }

    /// Merge these settings with another, with the other taking precedence
    /// for every field it sets to a non-default value.
    ///
    /// A field of `other` equal to its default is treated as unset. To layer
    /// the environment over a file, use [`RetrySettings::apply_env`].
    pub fn merge(mut self, other: RetrySettings) -> Self {
        let defaults = Self::default();
        if other.max_retries != defaults.max_retries {
            self.max_retries = other.max_retries;
        }
        if other.base_delay_ms != defaults.base_delay_ms {
            self.base_delay_ms = other.base_delay_ms;
        }
        if other.max_delay_ms != defaults.max_delay_ms {
            self.max_delay_ms = other.max_delay_ms;
        }
        if other.jitter != defaults.jitter {
            self.jitter = other.jitter;
        }
        if other.timeout_ms.is_some() {
            self.timeout_ms = other.timeout_ms;
        }
        self
    }

    /// Check every constraint, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries < 0 {
            return Err(ConfigError::NegativeMaxRetries(self.max_retries));
        }
        if self.max_retries > i64::from(u32::MAX) {
            return Err(ConfigError::MaxRetriesTooLarge(self.max_retries));
        }
        if self.base_delay_ms <= 0 {
            return Err(ConfigError::NonPositiveBaseDelay(self.base_delay_ms));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(ConfigError::MaxDelayBelowBase {
                base_ms: self.base_delay_ms,
                max_ms: self.max_delay_ms,
            });
        }
        if let Some(timeout_ms) = self.timeout_ms
            && timeout_ms <= 0
        {
            return Err(ConfigError::NonPositiveTimeout(timeout_ms));
        }
        Ok(())
    }

    /// Validate and build options with the default retry policy.
    pub fn into_options<E>(self) -> Result<RetryOptions<E>, ConfigError>
    where
        E: RetryableError + 'static,
    {
        RetryOptions::new().with_settings(self)
    }
}

fn env_var<T: std::str::FromStr>(var: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Hook invoked before each retry sleep with the error, the 1-based retry
/// number and the delay about to be slept.
pub type OnRetry<E> = Arc<dyn Fn(&E, u32, Duration) + Send + Sync>;

/// Full configuration for a retry run.
///
/// # Examples
///
/// ```rust
/// use turboretry::config::RetryOptions;
/// use std::time::Duration;
///
/// let options = RetryOptions::<std::io::Error>::new()
///     .max_retries(5)
///     .base_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(2))
///     .timeout(Duration::from_secs(10))
///     .on_retry(|err, retry, delay| eprintln!("retry #{retry} in {delay:?}: {err}"));
/// ```
pub struct RetryOptions<E> {
    pub(crate) max_retries: u32,
    pub(crate) base_delay: Duration,
    pub(crate) max_delay: Duration,
    pub(crate) jitter: bool,
    pub(crate) timeout: Option<Duration>,
    pub(crate) retry_on: Arc<dyn RetryPolicy<E>>,
    pub(crate) on_retry: Option<OnRetry<E>>,
    pub(crate) cancellation: Option<CancellationSignal>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl<E: RetryableError + 'static> RetryOptions<E> {
    /// Options with defaults and the built-in retry policy.
    pub fn new() -> Self {
        Self::with_policy(DefaultRetryPolicy)
    }
}

impl<E: RetryableError + 'static> Default for RetryOptions<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RetryOptions<E> {
    /// Options with defaults and a custom retry policy.
    ///
    /// Use this for error types that do not implement [`RetryableError`].
    pub fn with_policy<P>(policy: P) -> Self
    where
        P: RetryPolicy<E> + 'static,
    {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter: true,
            timeout: None,
            retry_on: Arc::new(policy),
            on_retry: None,
            cancellation: None,
            clock: Arc::new(TokioClock),
        }
    }

    /// Set the number of retries after the first attempt.
    ///
    /// Default: 3
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry.
    ///
    /// Default: 300ms
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the upper bound on any single delay.
    ///
    /// Default: 5s
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Enable or disable full jitter.
    ///
    /// Default: enabled
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set a global time budget spanning all attempts and delays.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the retry policy with a predicate over the error and the
    /// 0-based index of the attempt that just failed.
    ///
    /// The predicate is authoritative; it is never combined with the
    /// built-in policy.
    pub fn retry_on<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E, u32) -> bool + Send + Sync + 'static,
    {
        self.retry_on = Arc::new(predicate);
        self
    }

    /// Replace the retry policy with any [`RetryPolicy`] implementor.
    pub fn policy<P>(mut self, policy: P) -> Self
    where
        P: RetryPolicy<E> + 'static,
    {
        self.retry_on = Arc::new(policy);
        self
    }

    /// Install a hook called before each retry sleep.
    ///
    /// The hook runs synchronously. A panic inside it is not caught and
    /// aborts the run.
    pub fn on_retry<F>(mut self, hook: F) -> Self
    where
        F: Fn(&E, u32, Duration) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(hook));
        self
    }

    /// Observe an external cancellation signal.
    pub fn cancellation(mut self, signal: CancellationSignal) -> Self {
        self.cancellation = Some(signal);
        self
    }

    /// Replace the time source used for timeout accounting.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Apply validated [`RetrySettings`] onto these options.
    ///
    /// Policy, hook, cancellation and clock are kept.
    pub fn with_settings(mut self, settings: RetrySettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        self.max_retries = u32::try_from(settings.max_retries)
            .map_err(|_| ConfigError::MaxRetriesTooLarge(settings.max_retries))?;
        self.base_delay = Duration::from_millis(settings.base_delay_ms.unsigned_abs());
        self.max_delay = Duration::from_millis(settings.max_delay_ms.unsigned_abs());
        self.jitter = settings.jitter;
        self.timeout = settings
            .timeout_ms
            .map(|ms| Duration::from_millis(ms.unsigned_abs()));
        Ok(self)
    }

    /// Check the typed constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_delay.is_zero() {
            return Err(ConfigError::NonPositiveBaseDelay(0));
        }
        if self.max_delay < self.base_delay {
            return Err(ConfigError::MaxDelayBelowBase {
                base_ms: millis(self.base_delay),
                max_ms: millis(self.max_delay),
            });
        }
        if let Some(timeout) = self.timeout
            && timeout.is_zero()
        {
            return Err(ConfigError::NonPositiveTimeout(0));
        }
        Ok(())
    }
}

impl<E> Clone for RetryOptions<E> {
    fn clone(&self) -> Self {
        Self {
            max_retries: self.max_retries,
            base_delay: self.base_delay,
            max_delay: self.max_delay,
            jitter: self.jitter,
            timeout: self.timeout,
            retry_on: Arc::clone(&self.retry_on),
            on_retry: self.on_retry.clone(),
            cancellation: self.cancellation.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<E> fmt::Debug for RetryOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("jitter", &self.jitter)
            .field("timeout", &self.timeout)
            .field("on_retry", &self.on_retry.is_some())
            .field("cancellation", &self.cancellation)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_settings_defaults() {
        let settings = RetrySettings::default();
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.base_delay_ms, 300);
        assert_eq!(settings.max_delay_ms, 5000);
        assert!(settings.jitter);
        assert_eq!(settings.timeout_ms, None);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation_errors() {
        let negative = RetrySettings {
            max_retries: -1,
            ..Default::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(ConfigError::NegativeMaxRetries(-1))
        ));

        let zero_base = RetrySettings {
            base_delay_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_base.validate(),
            Err(ConfigError::NonPositiveBaseDelay(0))
        ));

        let inverted = RetrySettings {
            base_delay_ms: 1000,
            max_delay_ms: 500,
            ..Default::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::MaxDelayBelowBase {
                base_ms: 1000,
                max_ms: 500
            })
        ));

        let zero_timeout = RetrySettings {
            timeout_ms: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            zero_timeout.validate(),
            Err(ConfigError::NonPositiveTimeout(0))
        ));

        let negative_timeout = RetrySettings {
            timeout_ms: Some(-5),
            ..Default::default()
        };
        assert!(matches!(
            negative_timeout.validate(),
            Err(ConfigError::NonPositiveTimeout(-5))
        ));
    }

    #[test]
    fn test_validation_messages_are_distinct() {
        let messages = [
            ConfigError::NegativeMaxRetries(-1).to_string(),
            ConfigError::MaxRetriesTooLarge(1 << 40).to_string(),
            ConfigError::NonPositiveBaseDelay(0).to_string(),
            ConfigError::MaxDelayBelowBase {
                base_ms: 10,
                max_ms: 5,
            }
            .to_string(),
            ConfigError::NonPositiveTimeout(0).to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_settings_from_toml() {
        let settings = RetrySettings::from_toml_str(
            r#"
            max_retries = 6
            base_delay_ms = 50
            max_delay_ms = 800
            jitter = false
            timeout_ms = 3000
            "#,
        )
        .unwrap();

        assert_eq!(
            settings,
            RetrySettings {
                max_retries: 6,
                base_delay_ms: 50,
                max_delay_ms: 800,
                jitter: false,
                timeout_ms: Some(3000),
            }
        );
    }

    #[test]
    fn test_settings_from_toml_partial_uses_defaults() {
        let settings = RetrySettings::from_toml_str("jitter = false").unwrap();
        assert_eq!(
            settings,
            RetrySettings {
                jitter: false,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_settings_from_toml_rejects_bad_types() {
        let result = RetrySettings::from_toml_str("max_retries = \"many\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retry.toml");
        std::fs::write(&path, "max_retries = 1\nbase_delay_ms = 10\n").unwrap();

        let settings = RetrySettings::from_file(&path).unwrap();
        assert_eq!(settings.max_retries, 1);
        assert_eq!(settings.base_delay_ms, 10);

        let missing = RetrySettings::from_file(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_settings_json_round_trip() {
        let settings: RetrySettings =
            serde_json::from_str(r#"{"max_retries": 2, "timeout_ms": 750}"#).unwrap();
        assert_eq!(settings.max_retries, 2);
        assert_eq!(settings.timeout_ms, Some(750));

        let json = serde_json::to_value(RetrySettings::default()).unwrap();
        assert!(json.get("timeout_ms").is_none());
        assert_eq!(json["base_delay_ms"], 300);
    }

    #[test]
    fn test_settings_from_env() {
        temp_env::with_vars(
            [
                ("TURBORETRY_MAX_RETRIES", Some("7")),
                ("TURBORETRY_BASE_DELAY_MS", Some("25")),
                ("TURBORETRY_MAX_DELAY_MS", None),
                ("TURBORETRY_JITTER", Some("false")),
                ("TURBORETRY_TIMEOUT_MS", Some(" 1200 ")),
            ],
            || {
                let settings = RetrySettings::from_env().unwrap();
                assert_eq!(settings.max_retries, 7);
                assert_eq!(settings.base_delay_ms, 25);
                assert_eq!(settings.max_delay_ms, 5000);
                assert!(!settings.jitter);
                assert_eq!(settings.timeout_ms, Some(1200));
            },
        );
    }

    #[test]
    fn test_apply_env_keeps_values_equal_to_defaults() {
        let file = RetrySettings::from_toml_str("max_retries = 1\njitter = false").unwrap();

        temp_env::with_vars(
            [
                ("TURBORETRY_MAX_RETRIES", Some("3")),
                ("TURBORETRY_BASE_DELAY_MS", None),
                ("TURBORETRY_MAX_DELAY_MS", None),
                ("TURBORETRY_JITTER", Some("true")),
                ("TURBORETRY_TIMEOUT_MS", None),
            ],
            || {
                let settings = file.clone().apply_env().unwrap();
                assert_eq!(settings.max_retries, 3);
                assert!(settings.jitter);
                assert_eq!(settings.base_delay_ms, 300);
                assert_eq!(settings.timeout_ms, None);
            },
        );
    }

    #[test]
    fn test_apply_env_without_variables_is_identity() {
        let file = RetrySettings::from_toml_str("max_retries = 9\ntimeout_ms = 50").unwrap();

        temp_env::with_vars_unset(
            [
                "TURBORETRY_MAX_RETRIES",
                "TURBORETRY_BASE_DELAY_MS",
                "TURBORETRY_MAX_DELAY_MS",
                "TURBORETRY_JITTER",
                "TURBORETRY_TIMEOUT_MS",
            ],
            || {
                assert_eq!(file.clone().apply_env().unwrap(), file);
            },
        );
    }

    #[test]
    fn test_settings_from_env_invalid_value() {
        temp_env::with_var("TURBORETRY_MAX_RETRIES", Some("lots"), || {
            let err = RetrySettings::from_env().unwrap_err();
            match err {
                ConfigError::InvalidEnv { var, value } => {
                    assert_eq!(var, "TURBORETRY_MAX_RETRIES");
                    assert_eq!(value, "lots");
                }
                other => panic!("Expected InvalidEnv, got {other:?}"),
            }
        });
    }

    #[test]
    fn test_settings_merge() {
        let base = RetrySettings {
            max_retries: 10,
            timeout_ms: Some(100),
            ..Default::default()
        };
        let overlay = RetrySettings {
            base_delay_ms: 20,
            jitter: false,
            ..Default::default()
        };

        let merged = base.merge(overlay);
        assert_eq!(merged.max_retries, 10);
        assert_eq!(merged.base_delay_ms, 20);
        assert!(!merged.jitter);
        assert_eq!(merged.timeout_ms, Some(100));
    }

    #[test]
    fn test_options_defaults() {
        let options = RetryOptions::<io::Error>::new();
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.base_delay, Duration::from_millis(300));
        assert_eq!(options.max_delay, Duration::from_secs(5));
        assert!(options.jitter);
        assert_eq!(options.timeout, None);
        assert!(options.on_retry.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_typed_validation() {
        let zero_base = RetryOptions::<io::Error>::new().base_delay(Duration::ZERO);
        assert!(matches!(
            zero_base.validate(),
            Err(ConfigError::NonPositiveBaseDelay(0))
        ));

        let inverted = RetryOptions::<io::Error>::new()
            .base_delay(Duration::from_secs(2))
            .max_delay(Duration::from_secs(1));
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::MaxDelayBelowBase {
                base_ms: 2000,
                max_ms: 1000
            })
        ));

        let zero_timeout = RetryOptions::<io::Error>::new().timeout(Duration::ZERO);
        assert!(matches!(
            zero_timeout.validate(),
            Err(ConfigError::NonPositiveTimeout(0))
        ));
    }

    #[test]
    fn test_options_with_settings_keeps_policy() {
        struct Opaque;
        let options = RetryOptions::<Opaque>::with_policy(|_: &Opaque, _: u32| false)
            .with_settings(RetrySettings {
                max_retries: 1,
                base_delay_ms: 40,
                max_delay_ms: 40,
                jitter: false,
                timeout_ms: Some(90),
            })
            .unwrap();

        assert_eq!(options.max_retries, 1);
        assert_eq!(options.base_delay, Duration::from_millis(40));
        assert_eq!(options.timeout, Some(Duration::from_millis(90)));
        assert!(!options.retry_on.should_retry(&Opaque, 0));
    }

    #[test]
    fn test_max_retries_beyond_u32_is_rejected() {
        let huge = RetrySettings {
            max_retries: 5_000_000_000,
            ..Default::default()
        };
        assert!(matches!(
            huge.validate(),
            Err(ConfigError::MaxRetriesTooLarge(5_000_000_000))
        ));
        assert!(matches!(
            huge.into_options::<io::Error>(),
            Err(ConfigError::MaxRetriesTooLarge(5_000_000_000))
        ));

        let largest = RetrySettings {
            max_retries: i64::from(u32::MAX),
            ..Default::default()
        };
        let options = largest.into_options::<io::Error>().unwrap();
        assert_eq!(options.max_retries, u32::MAX);
    }

    #[test]
    fn test_into_options_rejects_invalid_settings() {
        let result = RetrySettings {
            max_retries: -3,
            ..Default::default()
        }
        .into_options::<io::Error>();
        assert!(matches!(result, Err(ConfigError::NegativeMaxRetries(-3))));
    }
}
