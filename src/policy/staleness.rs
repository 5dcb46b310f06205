use chrono::{DateTime, Utc};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Fractional days elapsed between `timestamp` and `now`.
/// Negative when `timestamp` lies in the future.
pub fn days_since(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - timestamp).num_milliseconds() as f64 / MS_PER_DAY
}

/// True once at least `max_days_since_update` days have passed.
pub fn is_stale(last_activity: DateTime<Utc>, now: DateTime<Utc>, max_days_since_update: f64) -> bool {
    days_since(last_activity, now) >= max_days_since_update
}
