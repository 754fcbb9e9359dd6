/// Minimum-interval gate for upstream calls.
///
/// Each sensor owns one `Throttle`, so calls to the same station are spaced
/// at least `min_interval` apart. The attempt time is recorded when the gate
/// opens, before the call runs, so a failing call is throttled like a
/// successful one.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last_call: Option<DateTime<Utc>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn last_call(&self) -> Option<DateTime<Utc>> {
        self.last_call
    }

    /// Opens the gate if `min_interval` has elapsed since the last call,
    /// recording `now` as the new call time.
    pub fn try_acquire(&mut self, now: DateTime<Utc>) -> bool {
        match self.last_call {
            Some(last) if now - last < self.min_interval => false,
            _ => {
                self.last_call = Some(now);
                true
            }
        }
    }

    /// Earliest time the gate will open again.
    pub fn next_allowed(&self) -> Option<DateTime<Utc>> {
        self.last_call.map(|last| last + self.min_interval)
    }
}
