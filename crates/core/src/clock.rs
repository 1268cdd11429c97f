//! Time source for policy checks and audit stamps.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Supplies "today" and "now" to the workflow services.
pub trait Clock: Send + Sync {
    /// Today's calendar date in the plan's local time zone.
    fn today(&self) -> NaiveDate;

    /// Current instant, for audit timestamps.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    /// Creates a clock that always reports `today`.
    #[must_use]
    pub const fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
