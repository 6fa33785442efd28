//! Shared helpers for unit tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

/// Clock whose time only moves when told to.
#[derive(Debug, Clone)]
pub struct MutableClock(Arc<Mutex<DateTime<Utc>>>);

impl MutableClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(start)))
    }

    /// Clock starting at a whole minute, 2026-01-01T00:00:00Z.
    pub fn at_minute_boundary() -> Self {
        Self::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut guard = self.0.lock().expect("clock mutex");
        *guard += delta;
    }

    pub fn advance_secs(&self, seconds: i64) {
        self.advance(TimeDelta::seconds(seconds));
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex")
    }
}
