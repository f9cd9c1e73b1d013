//! CF calendar kinds and month-length tables.

use std::fmt;
use std::str::FromStr;

use crate::error::CalendarError;

/// Month lengths of a 365-day year.
const NOLEAP_MONTHS: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Month lengths of a 366-day year.
const LEAP_MONTHS: [u8; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Calendars used by the CF conventions for model time axes.
///
/// `Standard` covers `standard`, `gregorian` and `proleptic_gregorian`; the
/// Julian/Gregorian switch in 1582 is ignored because climate records start
/// long after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Calendar {
    /// Gregorian leap-year rules.
    #[default]
    Standard,
    /// Every year has 365 days (`noleap`, `365_day`).
    NoLeap,
    /// Every year has 366 days (`all_leap`, `366_day`).
    AllLeap,
    /// Twelve 30-day months (`360_day`).
    Day360,
}

impl Calendar {
    /// Parses a CF `calendar` attribute value (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::UnknownCalendar`] for unsupported names.
    pub fn parse(name: &str) -> Result<Self, CalendarError> {
        match name.trim().to_lowercase().as_str() {
            "standard" | "gregorian" | "proleptic_gregorian" => Ok(Self::Standard),
            "noleap" | "no_leap" | "365_day" => Ok(Self::NoLeap),
            "all_leap" | "366_day" => Ok(Self::AllLeap),
            "360_day" => Ok(Self::Day360),
            _ => Err(CalendarError::UnknownCalendar {
                name: name.to_string(),
            }),
        }
    }

    /// Returns the canonical CF name of this calendar.
    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::NoLeap => "noleap",
            Self::AllLeap => "all_leap",
            Self::Day360 => "360_day",
        }
    }

    /// Returns `true` if `year` has a February 29 in this calendar.
    pub fn is_leap_year(self, year: i32) -> bool {
        match self {
            Self::Standard => (year % 4 == 0 && year % 100 != 0) || year % 400 == 0,
            Self::NoLeap | Self::Day360 => false,
            Self::AllLeap => true,
        }
    }

    /// Returns the number of days in `month` of `year`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidMonth`] if `month` is outside 1..=12.
    pub fn days_in_month(self, year: i32, month: u8) -> Result<u8, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth { month });
        }
        let idx = (month - 1) as usize;
        Ok(match self {
            Self::Day360 => 30,
            _ if self.is_leap_year(year) => LEAP_MONTHS[idx],
            _ => NOLEAP_MONTHS[idx],
        })
    }

    /// Returns the number of days in `year`.
    pub fn days_in_year(self, year: i32) -> u16 {
        match self {
            Self::Day360 => 360,
            _ if self.is_leap_year(year) => 366,
            _ => 365,
        }
    }

    /// Returns the fixed year length for calendars where every year has the
    /// same number of days, or `None` for [`Calendar::Standard`].
    pub(crate) fn fixed_year_length(self) -> Option<i64> {
        match self {
            Self::Standard => None,
            Self::NoLeap => Some(365),
            Self::AllLeap => Some(366),
            Self::Day360 => Some(360),
        }
    }
}

impl FromStr for Calendar {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
