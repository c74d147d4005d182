// src/exam/clock.rs

use chrono::{DateTime, Utc};

/// Source of wall-clock timestamps. Injected so submission times and login
/// times are controllable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
