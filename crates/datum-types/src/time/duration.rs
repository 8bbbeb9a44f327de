use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, TimeDelta};

use super::{format_frac, parse_frac, Time, TimeKind, MAX_FSP};
use crate::convert::number::trim_ascii;
use crate::decimal::Decimal;
use crate::error::{Lossy, Outcome, TypeError, TypeResult};

pub const MAX_HOUR: i64 = 838;

const NANOS_PER_SEC: i64 = 1_000_000_000;
const NANOS_PER_MICRO: i64 = 1_000;

/// `838:59:59` in nanoseconds, the largest `TIME` magnitude.
pub const MAX_DURATION_NANOS: i64 = (MAX_HOUR * 3600 + 59 * 60 + 59) * NANOS_PER_SEC;

/// Largest packed `HHMMSS` number, `838:59:59`.
const MAX_PACKED: i64 = 8_385_959;

/// A `TIME` value: a signed span in nanoseconds plus its fractional-second
/// precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Duration {
    nanos: i64,
    fsp: u8,
}

impl Duration {
    pub fn new(nanos: i64, fsp: u8) -> Self {
        Self {
            nanos,
            fsp: fsp.min(MAX_FSP),
        }
    }

    pub fn zero(fsp: u8) -> Self {
        Self::new(0, fsp)
    }

    pub fn nanos(&self) -> i64 {
        self.nanos
    }

    pub fn fsp(&self) -> u8 {
        self.fsp
    }

    pub fn is_negative(&self) -> bool {
        self.nanos < 0
    }

    fn abs_nanos(&self) -> u64 {
        self.nanos.unsigned_abs()
    }

    /// Whole hours of the magnitude; may exceed 23.
    pub fn hour(&self) -> u32 {
        (self.abs_nanos() / 3_600_000_000_000) as u32
    }

    pub fn minute(&self) -> u32 {
        (self.abs_nanos() / 60_000_000_000 % 60) as u32
    }

    pub fn second(&self) -> u32 {
        (self.abs_nanos() / NANOS_PER_SEC as u64 % 60) as u32
    }

    pub fn microsecond(&self) -> u32 {
        (self.abs_nanos() % NANOS_PER_SEC as u64 / NANOS_PER_MICRO as u64) as u32
    }

    /// Parses `[-][D ]HH:MM:SS[.frac]`, `HH:MM`, packed `[H]HHMMSS` forms and full
    /// datetime literals (which contribute their time of day).
    ///
    /// Values beyond `±838:59:59` are clamped and reported as
    /// [`Outcome::TruncatedWrongValue`].
    pub fn parse(s: &str, fsp: u8) -> TypeResult<Lossy<Self>> {
        let fsp = fsp.min(MAX_FSP);
        let malformed = || TypeError::malformed("time", s);
        let trimmed = trim_ascii(s);
        if trimmed.is_empty() {
            return Ok(Lossy::exact(Self::zero(fsp)));
        }
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (day, clock) = match unsigned.split_once(' ') {
            Some((d, rest)) if !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()) => {
                (d.parse::<i64>().map_err(|_| malformed())?, trim_ascii(rest))
            }
            _ => (0, unsigned),
        };
        let (hms, frac) = clock.split_once('.').unwrap_or((clock, ""));
        let from_datetime = || -> TypeResult<Lossy<Self>> {
            if negative || day != 0 {
                return Err(malformed());
            }
            let t = Time::parse(unsigned, TimeKind::Datetime, MAX_FSP).map_err(|_| malformed())?;
            Ok(Lossy::exact(t.to_duration().round_frac(fsp)))
        };
        if hms.is_empty() || !hms.bytes().all(|b| b.is_ascii_digit() || b == b':') {
            return from_datetime();
        }

        let num = |part: &str| part.parse::<i64>().map_err(|_| malformed());
        let parts: Vec<&str> = hms.split(':').collect();
        let (hour, minute, second) = match parts.as_slice() {
            [packed] => {
                let v = num(packed)?;
                match packed.len() {
                    1 | 2 => (0, 0, v),
                    3 | 4 => (0, v / 100, v % 100),
                    5..=7 => (v / 10_000, v / 100 % 100, v % 100),
                    _ => return from_datetime(),
                }
            }
            [h, m] => (num(h)?, num(m)?, 0),
            [h, m, sec] => (num(h)?, num(m)?, num(sec)?),
            _ => return Err(malformed()),
        };
        if minute >= 60 || second >= 60 {
            return Err(malformed());
        }
        let (microsecond, carry) = parse_frac(frac, fsp).map_err(|_| malformed())?;

        let seconds = (i128::from(day) * 24 + i128::from(hour)) * 3600
            + i128::from(minute) * 60
            + i128::from(second)
            + i128::from(carry);
        let mut nanos =
            seconds * i128::from(NANOS_PER_SEC) + i128::from(microsecond) * i128::from(NANOS_PER_MICRO);
        if negative {
            nanos = -nanos;
        }
        let bounded = i64::try_from(nanos).unwrap_or(if nanos < 0 { i64::MIN } else { i64::MAX });
        Ok(truncate_overflow_time(bounded).map(|nanos| Self::new(nanos, fsp)))
    }

    /// Decodes a packed `[-]HHMMSS` number. Numbers of eleven digits or more are
    /// read as packed datetimes and contribute their time of day.
    pub fn from_number(n: i64, fsp: u8) -> TypeResult<Self> {
        if !(-MAX_PACKED..=MAX_PACKED).contains(&n) {
            if n >= 10_000_000_000 {
                let t = Time::from_number(n, TimeKind::Datetime, fsp)?;
                return Ok(t.to_duration());
            }
            return Err(TypeError::out_of_range("time", n));
        }
        let abs = n.abs();
        let (hour, minute, second) = (abs / 10_000, abs / 100 % 100, abs % 100);
        if minute >= 60 || second >= 60 {
            return Err(TypeError::malformed("time", n.to_string()));
        }
        let nanos = (hour * 3600 + minute * 60 + second) * NANOS_PER_SEC;
        Ok(Self::new(if n < 0 { -nanos } else { nanos }, fsp))
    }

    /// Rounds half away from zero to `fsp` fractional digits.
    pub fn round_frac(self, fsp: u8) -> Self {
        let fsp = fsp.min(MAX_FSP);
        let unit = i128::from(10i64.pow(9 - u32::from(fsp)));
        let abs = i128::from(self.nanos).abs();
        let rounded = (abs + unit / 2) / unit * unit;
        let signed = if self.nanos < 0 { -rounded } else { rounded };
        let nanos = i64::try_from(signed).unwrap_or(self.nanos);
        Self::new(nanos, fsp)
    }

    /// Sum of two durations at the larger of the two precisions.
    pub fn add(self, other: Duration) -> TypeResult<Self> {
        let nanos = self
            .nanos
            .checked_add(other.nanos)
            .ok_or_else(|| TypeError::out_of_range("time", format!("{self} + {other}")))?;
        Ok(Self::new(nanos, self.fsp.max(other.fsp)))
    }

    pub fn compare(&self, other: &Duration) -> Ordering {
        self.nanos.cmp(&other.nanos)
    }

    /// Compares with a duration literal parsed at full precision.
    pub fn compare_str(&self, s: &str) -> TypeResult<Ordering> {
        let other = Self::parse(s, MAX_FSP)?.value;
        Ok(self.compare(&other))
    }

    /// Anchors the duration at midnight of `date`.
    pub fn to_time(&self, date: NaiveDate, kind: TimeKind) -> TypeResult<Time> {
        let dt = date
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| midnight.checked_add_signed(TimeDelta::nanoseconds(self.nanos)))
            .ok_or_else(|| TypeError::out_of_range(kind.name(), self))?;
        Time::from_naive(dt, kind, self.fsp)
    }

    /// Numeric form `[-]HHMMSS[.ffffff]` with as many fraction digits as the fsp.
    pub fn to_number(&self) -> Decimal {
        let mut text = String::new();
        if self.is_negative() {
            text.push('-');
        }
        text.push_str(&format!(
            "{:02}{:02}{:02}",
            self.hour(),
            self.minute(),
            self.second()
        ));
        if self.fsp > 0 {
            text.push('.');
            text.push_str(&format_frac(self.microsecond(), self.fsp));
        }
        Decimal::from_str(&text)
            .map(|lossy| lossy.value)
            .unwrap_or_default()
    }
}

/// Clamps a nanosecond span to `±838:59:59`.
pub fn truncate_overflow_time(nanos: i64) -> Lossy<i64> {
    if nanos > MAX_DURATION_NANOS {
        Lossy::new(MAX_DURATION_NANOS, Outcome::TruncatedWrongValue)
    } else if nanos < -MAX_DURATION_NANOS {
        Lossy::new(-MAX_DURATION_NANOS, Outcome::TruncatedWrongValue)
    } else {
        Lossy::exact(nanos)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )?;
        if self.fsp > 0 {
            write!(f, ".{}", format_frac(self.microsecond(), self.fsp))?;
        }
        Ok(())
    }
}
