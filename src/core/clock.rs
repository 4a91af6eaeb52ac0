//! Clock abstraction so expiration arithmetic can be tested deterministically.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current calendar day (UTC).
    fn today(&self) -> NaiveDate {
        self.now_utc().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a given instant, advanced only explicitly.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// Create a clock frozen at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Create a clock frozen at noon UTC on `date`.
    #[must_use]
    pub fn on_date(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        Self {
            now: noon.and_utc(),
        }
    }

    /// Move the clock forward.
    pub fn advance(&mut self, duration: Duration) {
        self.now += duration;
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now
    }
}
