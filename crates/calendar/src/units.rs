//! CF time-unit parsing and offset decoding.

use crate::calendar::Calendar;
use crate::date::CfDate;
use crate::error::CalendarError;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Tolerance (in days) applied before flooring a decoded offset, so that
/// values like `0.99999999` produced by float round-off land on the
/// intended day.
const DAY_TOLERANCE: f64 = 1e-6;

/// Unit of a numeric time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    /// Days.
    Days,
    /// Hours.
    Hours,
    /// Minutes.
    Minutes,
    /// Seconds.
    Seconds,
}

impl TimeUnit {
    fn parse(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "days" | "day" | "d" => Some(Self::Days),
            "hours" | "hour" | "hrs" | "hr" | "h" => Some(Self::Hours),
            "minutes" | "minute" | "mins" | "min" => Some(Self::Minutes),
            "seconds" | "second" | "secs" | "sec" | "s" => Some(Self::Seconds),
            _ => None,
        }
    }

    /// Number of seconds in one unit.
    pub fn seconds(self) -> f64 {
        match self {
            Self::Days => SECONDS_PER_DAY,
            Self::Hours => 3_600.0,
            Self::Minutes => 60.0,
            Self::Seconds => 1.0,
        }
    }
}

/// A parsed CF `units` attribute such as `"days since 1850-01-01 00:00:00"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    unit: TimeUnit,
    base: CfDate,
    /// Time of day of the reference instant, in seconds.
    base_seconds: f64,
}

impl TimeUnits {
    /// Parses a CF time-units string.
    ///
    /// Accepts `<unit> since <date>[ T<time>][Z]` where `<date>` is
    /// `YYYY-M-D` (zero padding optional) and `<time>` is `HH[:MM[:SS]]`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidUnits`] if the string is malformed, or
    /// a date validation error if the reference date does not exist in
    /// `calendar`.
    pub fn parse(units: &str, calendar: Calendar) -> Result<Self, CalendarError> {
        let invalid = |reason: &str| CalendarError::InvalidUnits {
            units: units.to_string(),
            reason: reason.to_string(),
        };

        let mut words = units.split_whitespace();
        let unit_word = words.next().ok_or_else(|| invalid("empty string"))?;
        let unit = TimeUnit::parse(unit_word).ok_or_else(|| invalid("unrecognised unit"))?;

        match words.next() {
            Some(w) if w.eq_ignore_ascii_case("since") => {}
            _ => return Err(invalid("expected '<unit> since <date>'")),
        }

        let rest: Vec<&str> = words.collect();
        let stamp = rest.join(" ");
        if stamp.is_empty() {
            return Err(invalid("missing reference date"));
        }

        let (date_part, time_part) = match stamp.split_once(['T', ' ']) {
            Some((d, t)) => (d, Some(t)),
            None => (stamp.as_str(), None),
        };

        let fields: Vec<&str> = date_part.split('-').collect();
        if fields.len() != 3 {
            return Err(invalid("reference date must be YYYY-MM-DD"));
        }
        let year: i32 = fields[0].parse().map_err(|_| invalid("bad year"))?;
        let month: u8 = fields[1].parse().map_err(|_| invalid("bad month"))?;
        let day: u8 = fields[2].parse().map_err(|_| invalid("bad day"))?;
        let base = CfDate::new(year, month, day, calendar)?;

        let base_seconds = match time_part {
            Some(t) => parse_time_of_day(t).ok_or_else(|| invalid("bad time of day"))?,
            None => 0.0,
        };

        Ok(Self {
            unit,
            base,
            base_seconds,
        })
    }

    /// Returns the unit of the axis.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Returns the reference date.
    pub fn base(&self) -> CfDate {
        self.base
    }

    /// Decodes one offset into the calendar date it falls on.
    ///
    /// Sub-day parts are floored, so an offset of `0.5` days (noon) maps to
    /// the reference date itself.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NonFiniteOffset`] for NaN/infinite offsets
    /// and [`CalendarError::DateOverflow`] if the date is out of range.
    pub fn decode(&self, offset: f64, calendar: Calendar) -> Result<CfDate, CalendarError> {
        if !offset.is_finite() {
            return Err(CalendarError::NonFiniteOffset { offset });
        }
        let days = (offset * self.unit.seconds() + self.base_seconds) / SECONDS_PER_DAY;
        let whole = (days + DAY_TOLERANCE).floor();
        if whole.abs() > i64::MAX as f64 / 2.0 {
            return Err(CalendarError::DateOverflow {
                reason: format!("offset {offset} is too large"),
            });
        }
        self.base.add_days(whole as i64, calendar)
    }

    /// Decodes a whole time axis.
    ///
    /// # Errors
    ///
    /// Fails on the first offset that cannot be decoded.
    pub fn decode_all(
        &self,
        offsets: &[f64],
        calendar: Calendar,
    ) -> Result<Vec<CfDate>, CalendarError> {
        offsets.iter().map(|&o| self.decode(o, calendar)).collect()
    }
}

/// Parses `HH[:MM[:SS[.fff]]]`, optionally suffixed with `Z`, into seconds.
fn parse_time_of_day(s: &str) -> Option<f64> {
    let s = s.trim().trim_end_matches('Z');
    if s.is_empty() {
        return Some(0.0);
    }
    let mut seconds = 0.0;
    for (i, part) in s.split(':').enumerate() {
        let scale = match i {
            0 => 3_600.0,
            1 => 60.0,
            2 => 1.0,
            _ => return None,
        };
        let v: f64 = part.parse().ok()?;
        seconds += v * scale;
    }
    Some(seconds)
}
