//! # Time Sources

use crate::domain::entities::Timestamp;
use crate::ports::outbound::TimeSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default time source using system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        self.now_millis() / 1_000
    }

    fn now_millis(&self) -> u64 {
        // A clock before UNIX_EPOCH reads as 0, which expires everything
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to.
///
/// Lets expiry be tested without sleeping.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    millis: AtomicU64,
}

impl ManualTimeSource {
    /// Start at `now` Unix seconds.
    pub fn new(now: Timestamp) -> Self {
        Self {
            millis: AtomicU64::new(now.saturating_mul(1_000)),
        }
    }

    /// Jump to `now` Unix seconds.
    pub fn set(&self, now: Timestamp) {
        self.millis.store(now.saturating_mul(1_000), Ordering::SeqCst);
    }

    /// Move forward by `secs` seconds.
    pub fn advance(&self, secs: u64) {
        self.millis
            .fetch_add(secs.saturating_mul(1_000), Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.now_millis() / 1_000
    }

    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}
