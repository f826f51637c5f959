//! Time Source
//!
//! Admission windows and credential expiry are computed against an injected
//! [`Clock`] so both can be driven deterministically under test.

use chrono::Utc;

/// Wall-clock time source in Unix milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;

    /// Current time in whole Unix seconds (credential `exp` resolution)
    fn now_secs(&self) -> i64 {
        self.now_ms().div_euclid(1000)
    }
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[cfg(any(test, feature = "testing"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "testing"))]
mod manual {
    use super::Clock;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::time::Duration;

    /// Manually advanced clock; clones share the same instant
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        now_ms: Arc<AtomicI64>,
    }

    impl ManualClock {
        pub fn new(start_ms: i64) -> Self {
            Self {
                now_ms: Arc::new(AtomicI64::new(start_ms)),
            }
        }

        pub fn advance(&self, by: Duration) {
            self.now_ms
                .fetch_add(by.as_millis() as i64, Ordering::SeqCst);
        }

        pub fn set_ms(&self, now_ms: i64) {
            self.now_ms.store(now_ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.now_ms.load(Ordering::SeqCst)
        }
    }
}
