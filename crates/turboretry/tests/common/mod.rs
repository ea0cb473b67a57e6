//! Common test utilities and helpers

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use turboretry::clock::Clock;
use turboretry::RetryableError;

/// Error type with the knobs the default policy looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestError {
    pub id: u32,
    pub status: Option<u16>,
    pub code: Option<&'static str>,
}

#[allow(dead_code)]
impl TestError {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            status: None,
            code: None,
        }
    }

    pub fn status(id: u32, status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::new(id)
        }
    }

    pub fn network(id: u32, code: &'static str) -> Self {
        Self {
            code: Some(code),
            ..Self::new(id)
        }
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "test error #{}", self.id)
    }
}

impl std::error::Error for TestError {}

impl RetryableError for TestError {
    fn network_code(&self) -> Option<&str> {
        self.code
    }

    fn status(&self) -> Option<u16> {
        self.status
    }
}

/// Clock that only moves when told to.
#[allow(dead_code)]
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_ms: AtomicU64,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

/// Route `tracing` output to the test harness.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("turboretry=debug")),
        )
        .with_test_writer()
        .try_init();
}
