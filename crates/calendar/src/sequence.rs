//! Daily date sequence generation.

use crate::calendar::Calendar;
use crate::date::CfDate;

/// Generates a contiguous daily sequence of dates in `calendar`.
///
/// Starting from `start`, produces exactly `n_days` consecutive dates by
/// repeatedly advancing to the next day. Month and year boundaries follow
/// the calendar's month lengths.
///
/// # Example
///
/// ```ignore
/// let start = CfDate::new(2000, 2, 28, Calendar::Standard).unwrap();
/// let dates = daily_sequence(start, 3, Calendar::Standard);
/// // Feb 28, Feb 29, Mar 1
/// ```
pub fn daily_sequence(start: CfDate, n_days: usize, calendar: Calendar) -> Vec<CfDate> {
    let mut dates = Vec::with_capacity(n_days);
    if n_days == 0 {
        return dates;
    }
    dates.push(start);
    let mut current = start;
    for _ in 1..n_days {
        current = current.next(calendar);
        dates.push(current);
    }
    dates
}
