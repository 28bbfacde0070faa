//! Clock implementations
//!
//! `SystemClock` is what the ledger uses by default. `ManualClock` hands out
//! whatever time it was last set to, which makes time-range queries testable
//! down to the exact boundary.

use super::traits::Clock;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Wall-clock UTC time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to `time`
    pub fn set(&self, time: DateTime<Utc>) {
        *self.now.lock() = time;
    }

    /// Move forward by `step` and return the new time
    pub fn advance(&self, step: Duration) -> DateTime<Utc> {
        let mut now = self.now.lock();
        *now += step;
        *now
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
