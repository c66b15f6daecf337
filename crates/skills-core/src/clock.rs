use std::sync::Mutex;

use chrono::{DateTime, Duration, DurationRound, Utc};

/// Hands out microsecond timestamps that strictly increase, so that
/// `created_at` totally orders inserts even within one clock tick.
pub struct MonotonicClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        let now = truncate_micros(Utc::now());
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let next = match *last {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

pub fn truncate_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(Duration::microseconds(1)).unwrap_or(ts)
}
