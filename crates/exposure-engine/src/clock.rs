use std::{sync::Mutex, time::Duration};

use chrono::{DateTime, Utc};

/// Source of the current time, injectable so cache expiry can be tested deterministically.
pub trait Clock: Send + Sync {
    #[allow(missing_docs)]
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    #[allow(missing_docs)]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).expect("Duration should fit in a TimeDelta");
        let mut now = self.now.lock().expect("Mutex is not poisoned");
        *now = now
            .checked_add_signed(by)
            .expect("Clock should not overflow");
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("Mutex is not poisoned")
    }
}
