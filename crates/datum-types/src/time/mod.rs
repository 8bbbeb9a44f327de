//! Temporal values: calendar times ([`Time`]) and signed clock durations
//! ([`Duration`]), each carrying its own fractional-seconds precision (fsp).

mod diff;
mod duration;
mod parse;
mod year;

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;
use crate::error::{TypeError, TypeResult};

pub use diff::{timestamp_diff, TimeUnit};
pub use duration::{truncate_overflow_time, Duration, MAX_DURATION_NANOS, MAX_HOUR};
pub use parse::{date_fsp, parse_date_format, parse_frac};
pub use year::{adjust_year, parse_year, MAX_YEAR, MIN_YEAR};

pub(crate) use parse::{datetime_from_number, parse_datetime};

pub const MAX_FSP: u8 = 6;
pub const MIN_FSP: u8 = 0;

const MICROS_PER_SEC: u32 = 1_000_000;

/// Which SQL type a [`Time`] value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeKind {
    Date,
    Datetime,
    Timestamp,
}

impl TimeKind {
    pub fn name(self) -> &'static str {
        match self {
            TimeKind::Date => "date",
            TimeKind::Datetime => "datetime",
            TimeKind::Timestamp => "timestamp",
        }
    }
}

/// Raw calendar fields before validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DateFields {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u32,
}

impl DateFields {
    fn is_zero(&self) -> bool {
        *self == DateFields::default()
    }
}

/// A `DATE`, `DATETIME` or `TIMESTAMP` value.
///
/// The all-zero value `0000-00-00 00:00:00` is a valid sentinel distinct from NULL.
/// Every other value is a real calendar instant in years `0..=9999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Time {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    microsecond: u32,
    kind: TimeKind,
    fsp: u8,
}

fn timestamp_min() -> DateFields {
    DateFields {
        year: 1970,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 1,
        microsecond: 0,
    }
}

fn timestamp_max() -> DateFields {
    DateFields {
        year: 2038,
        month: 1,
        day: 19,
        hour: 3,
        minute: 14,
        second: 7,
        microsecond: 999_999,
    }
}

impl Time {
    pub fn zero(kind: TimeKind, fsp: u8) -> Self {
        Self {
            year: 0,
            month: 0,
            day: 0,
            hour: 0,
            minute: 0,
            second: 0,
            microsecond: 0,
            kind,
            fsp: if kind == TimeKind::Date { 0 } else { fsp.min(MAX_FSP) },
        }
    }

    pub(crate) fn from_fields(f: DateFields, kind: TimeKind, fsp: u8) -> TypeResult<Self> {
        let invalid = || {
            TypeError::malformed(
                kind.name(),
                format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    f.year, f.month, f.day, f.hour, f.minute, f.second
                ),
            )
        };
        if !f.is_zero() {
            if f.year > 9999
                || f.hour > 23
                || f.minute > 59
                || f.second > 59
                || f.microsecond >= MICROS_PER_SEC
            {
                return Err(invalid());
            }
            NaiveDate::from_ymd_opt(f.year as i32, f.month, f.day).ok_or_else(invalid)?;
        }
        let mut t = Self {
            year: f.year as u16,
            month: f.month as u8,
            day: f.day as u8,
            hour: f.hour as u8,
            minute: f.minute as u8,
            second: f.second as u8,
            microsecond: f.microsecond,
            kind: TimeKind::Datetime,
            fsp: fsp.min(MAX_FSP),
        };
        if kind == TimeKind::Date {
            t = t.into_date();
        }
        t.kind = kind;
        if kind == TimeKind::Timestamp {
            t.check_timestamp()?;
        }
        Ok(t)
    }

    /// A `DATE` value.
    pub fn from_ymd(year: u16, month: u8, day: u8) -> TypeResult<Self> {
        Self::from_fields(
            DateFields {
                year: year.into(),
                month: month.into(),
                day: day.into(),
                ..DateFields::default()
            },
            TimeKind::Date,
            0,
        )
    }

    /// A `DATETIME` value with fsp 0.
    pub fn from_ymd_hms(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> TypeResult<Self> {
        Self::from_fields(
            DateFields {
                year: year.into(),
                month: month.into(),
                day: day.into(),
                hour: hour.into(),
                minute: minute.into(),
                second: second.into(),
                microsecond: 0,
            },
            TimeKind::Datetime,
            0,
        )
    }

    pub fn from_naive(dt: NaiveDateTime, kind: TimeKind, fsp: u8) -> TypeResult<Self> {
        let year = u32::try_from(dt.year())
            .map_err(|_| TypeError::out_of_range(kind.name(), dt))?;
        Self::from_fields(
            DateFields {
                year,
                month: dt.month(),
                day: dt.day(),
                hour: dt.hour(),
                minute: dt.minute(),
                second: dt.second(),
                microsecond: dt.nanosecond() / 1_000 % MICROS_PER_SEC,
            },
            kind,
            fsp,
        )
    }

    /// Parses a date/time literal at the given precision and tags it with `kind`.
    ///
    /// Fractional seconds beyond `fsp` are rounded half up, carrying into the
    /// seconds when needed.
    pub fn parse(s: &str, kind: TimeKind, fsp: u8) -> TypeResult<Self> {
        parse_datetime(s, fsp, false)?.convert(kind)
    }

    /// Parses the text of a float or decimal: the fraction of a date-only number is
    /// discarded instead of being read as a time of day.
    pub(crate) fn parse_number_text(s: &str, kind: TimeKind, fsp: u8) -> TypeResult<Self> {
        parse_datetime(s, fsp, true)?.convert(kind)
    }

    /// Decodes a packed decimal datetime such as `20170118` or `170118123423`.
    pub fn from_number(n: i64, kind: TimeKind, fsp: u8) -> TypeResult<Self> {
        let mut t = datetime_from_number(n)?;
        t.fsp = fsp.min(MAX_FSP);
        t.convert(kind)
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn microsecond(&self) -> u32 {
        self.microsecond
    }

    pub fn kind(&self) -> TimeKind {
        self.kind
    }

    pub fn fsp(&self) -> u8 {
        self.fsp
    }

    pub fn is_zero(&self) -> bool {
        self.fields().is_zero()
    }

    pub(crate) fn fields(&self) -> DateFields {
        DateFields {
            year: self.year.into(),
            month: self.month.into(),
            day: self.day.into(),
            hour: self.hour.into(),
            minute: self.minute.into(),
            second: self.second.into(),
            microsecond: self.microsecond,
        }
    }

    /// Calendar view of the value; `None` for the zero date.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year.into(), self.month.into(), self.day.into())?
            .and_hms_micro_opt(
                self.hour.into(),
                self.minute.into(),
                self.second.into(),
                self.microsecond,
            )
    }

    fn into_date(mut self) -> Self {
        self.hour = 0;
        self.minute = 0;
        self.second = 0;
        self.microsecond = 0;
        self.fsp = 0;
        self.kind = TimeKind::Date;
        self
    }

    /// Re-tags the value: `Date` drops the time of day, `Timestamp` is range checked.
    pub fn convert(self, kind: TimeKind) -> TypeResult<Self> {
        let mut t = match kind {
            TimeKind::Date => self.into_date(),
            _ => self,
        };
        t.kind = kind;
        if kind == TimeKind::Timestamp {
            t.check_timestamp()?;
        }
        Ok(t)
    }

    /// Checks the `TIMESTAMP` range `1970-01-01 00:00:01` to
    /// `2038-01-19 03:14:07.999999`; the zero value is allowed.
    pub fn check_timestamp(&self) -> TypeResult<()> {
        if self.is_zero() {
            return Ok(());
        }
        let key = field_key(&self.fields());
        if key < field_key(&timestamp_min()) || key > field_key(&timestamp_max()) {
            return Err(TypeError::malformed("timestamp", self.to_string()));
        }
        Ok(())
    }

    /// Rounds the fractional seconds half up to `fsp` digits.
    pub fn round_frac(self, fsp: u8) -> TypeResult<Self> {
        let fsp = fsp.min(MAX_FSP);
        if self.kind == TimeKind::Date || self.is_zero() {
            return Ok(Self {
                fsp: if self.kind == TimeKind::Date { 0 } else { fsp },
                ..self
            });
        }
        let unit = 10u32.pow(u32::from(MAX_FSP - fsp));
        let rounded = (self.microsecond + unit / 2) / unit * unit;
        if rounded < MICROS_PER_SEC {
            return Ok(Self {
                microsecond: rounded,
                fsp,
                ..self
            });
        }
        let carried = self
            .to_naive()
            .and_then(|dt| dt.with_nanosecond(0))
            .and_then(|dt| dt.checked_add_signed(TimeDelta::seconds(1)))
            .ok_or_else(|| TypeError::out_of_range(self.kind.name(), self))?;
        Self::from_naive(carried, self.kind, fsp)
    }

    /// Time of day as a duration with the same fsp.
    pub fn to_duration(&self) -> Duration {
        let seconds = i64::from(self.hour) * 3600 + i64::from(self.minute) * 60 + i64::from(self.second);
        Duration::new(
            seconds * 1_000_000_000 + i64::from(self.microsecond) * 1_000,
            self.fsp,
        )
    }

    /// Reinterprets the wall-clock value from zone `from` to zone `to`.
    pub fn convert_time_zone(&self, from: Tz, to: Tz) -> TypeResult<Self> {
        use chrono::TimeZone;

        let Some(naive) = self.to_naive() else {
            return Ok(*self);
        };
        let local = from
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| TypeError::malformed(self.kind.name(), self.to_string()))?;
        let shifted = local.with_timezone(&to).naive_local();
        let mut t = Self::from_naive(shifted, TimeKind::Datetime, self.fsp)?;
        t.kind = self.kind;
        Ok(t)
    }

    /// Numeric form: `YYYYMMDD` for dates, `YYYYMMDDHHMMSS[.ffffff]` otherwise, with
    /// as many fraction digits as the fsp.
    pub fn to_number(&self) -> Decimal {
        let mut text = format!("{:04}{:02}{:02}", self.year, self.month, self.day);
        if self.kind != TimeKind::Date {
            text.push_str(&format!(
                "{:02}{:02}{:02}",
                self.hour, self.minute, self.second
            ));
            if self.fsp > 0 {
                text.push('.');
                text.push_str(&format_frac(self.microsecond, self.fsp));
            }
        }
        Decimal::from_str(&text)
            .map(|lossy| lossy.value)
            .unwrap_or_default()
    }

    /// Chronological order; kind and fsp are ignored.
    pub fn compare(&self, other: &Time) -> Ordering {
        field_key(&self.fields()).cmp(&field_key(&other.fields()))
    }

    /// Compares with a datetime literal parsed at full precision.
    pub fn compare_str(&self, s: &str) -> TypeResult<Ordering> {
        let other = Self::parse(s, TimeKind::Datetime, MAX_FSP)?;
        Ok(self.compare(&other))
    }
}

fn field_key(f: &DateFields) -> (u32, u32, u32, u32, u32, u32, u32) {
    (
        f.year,
        f.month,
        f.day,
        f.hour,
        f.minute,
        f.second,
        f.microsecond,
    )
}

/// The first `fsp` digits of a zero-padded six-digit microsecond count.
pub(crate) fn format_frac(microsecond: u32, fsp: u8) -> String {
    let mut digits = format!("{microsecond:06}");
    digits.truncate(usize::from(fsp.min(MAX_FSP)));
    digits
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)?;
        if self.kind == TimeKind::Date {
            return Ok(());
        }
        write!(f, " {:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.fsp > 0 {
            write!(f, ".{}", format_frac(self.microsecond, self.fsp))?;
        }
        Ok(())
    }
}
