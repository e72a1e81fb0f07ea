//! Time source abstraction.
//!
//! Every date-based rule (question reset, streak calculation, entry dates)
//! reads the current instant through a [`Clock`], so tests can move the
//! calendar without waiting for real days to pass.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::sync::RwLock;

pub trait Clock: Send + Sync {
    /// Current instant, carrying the device's local UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Current calendar day in local time.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock of the host machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Clock pinned to `hh:mm` UTC on the given day.
    pub fn at(date: NaiveDate, hour: u32, minute: u32) -> Self {
        Self::new(utc_instant(date, hour, minute))
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        match self.now.write() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    /// Jump to `hh:mm` UTC on another day.
    pub fn set_date(&self, date: NaiveDate, hour: u32, minute: u32) {
        self.set(utc_instant(date, hour, minute));
    }

    pub fn advance(&self, by: chrono::Duration) {
        let next = self.now() + by;
        self.set(next);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

fn utc_instant(date: NaiveDate, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    let time = chrono::NaiveTime::from_hms_opt(hour.min(23), minute.min(59), 0)
        .unwrap_or(chrono::NaiveTime::MIN);
    Utc.from_utc_datetime(&NaiveDateTime::new(date, time))
        .fixed_offset()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fixed_clock_reports_its_day() {
        let clock = FixedClock::at(day(2024, 1, 1), 9, 30);
        assert_eq!(clock.today(), day(2024, 1, 1));
    }

    #[test]
    fn test_fixed_clock_advance_crosses_midnight() {
        let clock = FixedClock::at(day(2024, 1, 1), 23, 50);
        clock.advance(chrono::Duration::minutes(20));
        assert_eq!(clock.today(), day(2024, 1, 2));
    }

    #[test]
    fn test_local_offset_decides_calendar_day() {
        // 23:30 UTC is already the next morning at UTC+9
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let instant = tokyo.from_utc_datetime(&day(2024, 1, 1).and_hms_opt(23, 30, 0).unwrap());
        let clock = FixedClock::new(instant);
        assert_eq!(clock.today(), day(2024, 1, 2));
    }
}
