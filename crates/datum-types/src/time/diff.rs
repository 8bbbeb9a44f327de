use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{DateFields, Time, MICROS_PER_SEC};
use crate::error::TypeError;

/// Units accepted by [`timestamp_diff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeUnit {
    Microsecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Microsecond => "MICROSECOND",
            TimeUnit::Second => "SECOND",
            TimeUnit::Minute => "MINUTE",
            TimeUnit::Hour => "HOUR",
            TimeUnit::Day => "DAY",
            TimeUnit::Week => "WEEK",
            TimeUnit::Month => "MONTH",
            TimeUnit::Quarter => "QUARTER",
            TimeUnit::Year => "YEAR",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [TimeUnit; 9] = [
            TimeUnit::Microsecond,
            TimeUnit::Second,
            TimeUnit::Minute,
            TimeUnit::Hour,
            TimeUnit::Day,
            TimeUnit::Week,
            TimeUnit::Month,
            TimeUnit::Quarter,
            TimeUnit::Year,
        ];
        ALL.into_iter()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TypeError::malformed("time unit", s))
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day number counted from year 0, as MySQL's `TO_DAYS` computes it. The zero
/// date maps to 0.
fn day_number(year: u32, month: u32, day: u32) -> i64 {
    let (mut y, m, d) = (i64::from(year), i64::from(month), i64::from(day));
    if y == 0 && m == 0 {
        return 0;
    }
    let mut days = 365 * y + 31 * (m - 1) + d;
    if m <= 2 {
        y -= 1;
    } else {
        days -= (m * 4 + 23) / 10;
    }
    let century_leaps = ((y / 100 + 1) * 3) / 4;
    days + y / 4 - century_leaps
}

fn seconds_of_day(f: &DateFields) -> i64 {
    i64::from(f.hour) * 3600 + i64::from(f.minute) * 60 + i64::from(f.second)
}

fn total_micros(f: &DateFields) -> i64 {
    let seconds = day_number(f.year, f.month, f.day) * 86_400 + seconds_of_day(f);
    seconds * i64::from(MICROS_PER_SEC) + i64::from(f.microsecond)
}

/// Whole calendar months from `beg` to `end`, where `end` is not earlier.
fn whole_months(beg: &DateFields, end: &DateFields) -> i64 {
    let day_not_reached = end.month < beg.month || (end.month == beg.month && end.day < beg.day);
    let mut years = i64::from(end.year) - i64::from(beg.year);
    if day_not_reached {
        years -= 1;
    }
    let mut months = 12 * years;
    if day_not_reached {
        months += 12 - (i64::from(beg.month) - i64::from(end.month));
    } else {
        months += i64::from(end.month) - i64::from(beg.month);
    }
    let clock = |f: &DateFields| (seconds_of_day(f), f.microsecond);
    if end.day < beg.day || (end.day == beg.day && clock(end) < clock(beg)) {
        months -= 1;
    }
    months
}

/// `t2 - t1` expressed in whole `unit`s, truncated toward zero.
///
/// Month-based units count calendar months, so `2001-01-01` to `2002-05-30` is 16
/// months even though the day of month differs.
pub fn timestamp_diff(unit: TimeUnit, t1: &Time, t2: &Time) -> i64 {
    let (f1, f2) = (t1.fields(), t2.fields());
    let diff = total_micros(&f2) - total_micros(&f1);
    let sign = if diff < 0 { -1 } else { 1 };
    let micros = diff.abs();
    let seconds = micros / i64::from(MICROS_PER_SEC);

    let months = || {
        if diff < 0 {
            whole_months(&f2, &f1)
        } else {
            whole_months(&f1, &f2)
        }
    };
    let magnitude = match unit {
        TimeUnit::Year => months() / 12,
        TimeUnit::Quarter => months() / 3,
        TimeUnit::Month => months(),
        TimeUnit::Week => seconds / 86_400 / 7,
        TimeUnit::Day => seconds / 86_400,
        TimeUnit::Hour => seconds / 3600,
        TimeUnit::Minute => seconds / 60,
        TimeUnit::Second => seconds,
        TimeUnit::Microsecond => micros,
    };
    magnitude * sign
}
