//! Calendar-aware date.

use chrono::{Datelike, NaiveDate, TimeDelta};

use crate::calendar::Calendar;
use crate::error::CalendarError;

/// A date in one of the CF calendars.
///
/// The date does not carry its calendar; every operation that depends on
/// month lengths takes the [`Calendar`] explicitly. Ordering is
/// chronological (year, then month, then day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CfDate {
    year: i32,
    month: u8,
    day: u8,
}

impl CfDate {
    /// Creates a new `CfDate`, validating month and day against `calendar`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError`] if the month or day is invalid for the
    /// given calendar and year.
    pub fn new(year: i32, month: u8, day: u8, calendar: Calendar) -> Result<Self, CalendarError> {
        let max_day = calendar.days_in_month(year, month)?;
        if day == 0 || day > max_day {
            return Err(CalendarError::InvalidDay {
                day,
                month,
                max_day,
            });
        }
        Ok(Self { year, month, day })
    }

    /// Returns the year.
    pub fn year(self) -> i32 {
        self.year
    }

    /// Returns the month (1..=12).
    pub fn month(self) -> u8 {
        self.month
    }

    /// Returns the day within the month (1..=31).
    pub fn day(self) -> u8 {
        self.day
    }

    /// Returns the 1-based day of the year in `calendar`.
    pub fn day_of_year(self, calendar: Calendar) -> u16 {
        let before: u16 = (1..self.month)
            .map(|m| month_length(calendar, self.year, m) as u16)
            .sum();
        before + self.day as u16
    }

    /// Returns the following day.
    pub fn next(self, calendar: Calendar) -> Self {
        if self.day < month_length(calendar, self.year, self.month) {
            Self {
                day: self.day + 1,
                ..self
            }
        } else if self.month < 12 {
            Self {
                year: self.year,
                month: self.month + 1,
                day: 1,
            }
        } else {
            Self {
                year: self.year + 1,
                month: 1,
                day: 1,
            }
        }
    }

    /// Returns the date `days` days after (or before, if negative) `self`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::DateOverflow`] if the result leaves the
    /// representable year range.
    pub fn add_days(self, days: i64, calendar: Calendar) -> Result<Self, CalendarError> {
        match calendar.fixed_year_length() {
            Some(year_len) => self.add_days_fixed(days, year_len, calendar),
            None => self.add_days_gregorian(days),
        }
    }

    fn add_days_fixed(
        self,
        days: i64,
        year_len: i64,
        calendar: Calendar,
    ) -> Result<Self, CalendarError> {
        let doy0 = (self.day_of_year(calendar) - 1) as i64;
        let total = (self.year as i64)
            .checked_mul(year_len)
            .and_then(|v| v.checked_add(doy0))
            .and_then(|v| v.checked_add(days))
            .ok_or_else(|| overflow(self, days))?;

        let year = i32::try_from(total.div_euclid(year_len)).map_err(|_| overflow(self, days))?;
        let mut remaining = total.rem_euclid(year_len);

        let mut month = 1u8;
        loop {
            let len = month_length(calendar, year, month) as i64;
            if remaining < len || month == 12 {
                break;
            }
            remaining -= len;
            month += 1;
        }

        Ok(Self {
            year,
            month,
            day: (remaining + 1) as u8,
        })
    }

    fn add_days_gregorian(self, days: i64) -> Result<Self, CalendarError> {
        let start = NaiveDate::from_ymd_opt(self.year, self.month as u32, self.day as u32)
            .ok_or_else(|| overflow(self, days))?;
        let delta = TimeDelta::try_days(days).ok_or_else(|| overflow(self, days))?;
        let end = start
            .checked_add_signed(delta)
            .ok_or_else(|| overflow(self, days))?;

        Ok(Self {
            year: end.year(),
            month: end.month() as u8,
            day: end.day() as u8,
        })
    }
}

/// Month length for an already-validated month.
fn month_length(calendar: Calendar, year: i32, month: u8) -> u8 {
    calendar.days_in_month(year, month).unwrap_or(30)
}

fn overflow(date: CfDate, days: i64) -> CalendarError {
    CalendarError::DateOverflow {
        reason: format!(
            "adding {days} days to {}-{:02}-{:02}",
            date.year, date.month, date.day
        ),
    }
}
