//! Clock abstraction: where "today" comes from.

use chrono::{Datelike, Local, NaiveDate};

use crate::cycle::DayOfMonth;

pub trait Clock {
    fn today(&self) -> NaiveDate;

    fn day_of_month(&self) -> DayOfMonth {
        self.today().day() as DayOfMonth
    }
}

/// Local calendar date of the running machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date. Used for `--today` overrides and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_day_of_month() {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2026, 2, 18).unwrap());
        assert_eq!(clock.day_of_month(), 18);
    }
}
