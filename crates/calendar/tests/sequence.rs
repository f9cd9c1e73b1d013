use pluvio_calendar::{Calendar, CfDate, daily_sequence};

#[test]
fn full_year_month_boundaries_noleap() {
    let start = CfDate::new(2000, 1, 1, Calendar::NoLeap).unwrap();
    let dates = daily_sequence(start, 365, Calendar::NoLeap);
    assert_eq!(dates.len(), 365);

    // Index 30: Jan 31
    assert_eq!((dates[30].month(), dates[30].day()), (1, 31));

    // Index 58: Feb 28, index 59: Mar 1 (no leap day)
    assert_eq!((dates[58].month(), dates[58].day()), (2, 28));
    assert_eq!((dates[59].month(), dates[59].day()), (3, 1));

    // Last: Dec 31 of the same year
    assert_eq!(dates[364].year(), 2000);
    assert_eq!((dates[364].month(), dates[364].day()), (12, 31));
}

#[test]
fn year_lengths_per_calendar() {
    for (cal, len) in [
        (Calendar::NoLeap, 365usize),
        (Calendar::AllLeap, 366),
        (Calendar::Day360, 360),
    ] {
        let start = CfDate::new(2001, 1, 1, cal).unwrap();
        let dates = daily_sequence(start, len + 1, cal);
        assert_eq!(dates[len - 1].year(), 2001, "{cal}");
        assert_eq!(dates[len].year(), 2002, "{cal}");
        assert_eq!((dates[len].month(), dates[len].day()), (1, 1), "{cal}");
    }
}

#[test]
fn standard_calendar_follows_leap_years() {
    let start = CfDate::new(2000, 1, 1, Calendar::Standard).unwrap();
    let dates = daily_sequence(start, 366 + 365, Calendar::Standard);
    assert_eq!(dates[365].year(), 2000); // Dec 31 2000 (leap)
    assert_eq!(dates[366].year(), 2001);
    assert_eq!(dates[366 + 364].year(), 2001);
}

#[test]
fn sequence_is_strictly_increasing() {
    let start = CfDate::new(1999, 12, 1, Calendar::Day360).unwrap();
    let dates = daily_sequence(start, 1000, Calendar::Day360);
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
}
