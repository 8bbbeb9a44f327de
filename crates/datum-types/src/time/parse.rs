use chrono::TimeDelta;

use super::year::window_two_digit_year;
use super::{DateFields, Time, TimeKind, MAX_FSP};
use crate::convert::number::trim_ascii;
use crate::error::{TypeError, TypeResult};

/// Splits a date/time literal into its numeric groups.
///
/// The literal (after trimming) must start and end with a digit, and groups are
/// separated by exactly one non-digit character. Returns `None` otherwise.
///
/// ```
/// use datum_types::time::parse_date_format;
///
/// assert_eq!(
///     parse_date_format("2011-11-11T10:10:10.123456"),
///     Some(vec!["2011", "11", "11", "10", "10", "10", "123456"])
/// );
/// assert_eq!(parse_date_format("2011-11-11  10:10:10"), None);
/// ```
pub fn parse_date_format(s: &str) -> Option<Vec<&str>> {
    let s = trim_ascii(s);
    let bytes = s.as_bytes();
    let (first, last) = (bytes.first()?, bytes.last()?);
    if !first.is_ascii_digit() || !last.is_ascii_digit() {
        return None;
    }
    let mut groups = Vec::with_capacity(7);
    let mut start = 0;
    for i in 1..bytes.len() - 1 {
        if bytes[i].is_ascii_digit() {
            continue;
        }
        if !bytes[i - 1].is_ascii_digit() {
            return None;
        }
        groups.push(&s[start..i]);
        start = i + 1;
    }
    groups.push(&s[start..]);
    Some(groups)
}

/// Reads a fractional-seconds string at precision `fsp`.
///
/// Returns the value in microseconds plus an overflow flag. Strings no longer than
/// `fsp` are right-padded; longer ones are rounded half up on the digit after `fsp`.
/// When rounding carries into the next second the value is `0` and the flag is
/// set, leaving the carry to the caller.
pub fn parse_frac(s: &str, fsp: u8) -> TypeResult<(u32, bool)> {
    if s.is_empty() {
        return Ok((0, false));
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TypeError::malformed("fractional seconds", s));
    }
    let fsp = usize::from(fsp.min(MAX_FSP));
    let max_fsp = usize::from(MAX_FSP);
    let value = |digits: &str| digits.bytes().fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));

    if s.len() <= fsp {
        return Ok((value(s) * 10u32.pow((max_fsp - s.len()) as u32), false));
    }
    let rounded = (value(&s[..=fsp]) + 5) / 10;
    if rounded >= 10u32.pow(fsp as u32) {
        return Ok((0, true));
    }
    Ok((rounded * 10u32.pow((max_fsp - fsp) as u32), false))
}

/// Number of digits after the last `.` of a datetime literal.
pub fn date_fsp(s: &str) -> usize {
    s.rfind('.').map_or(0, |i| s.len() - i - 1)
}

/// Splits off the fractional part: the digits after the last `.`, provided no
/// other non-digit follows that dot.
fn split_frac(s: &str) -> (&str, &str) {
    match s.bytes().rposition(|b| !b.is_ascii_digit()) {
        Some(i) if s.as_bytes()[i] == b'.' => (&s[..i], &s[i + 1..]),
        _ => (s, ""),
    }
}

fn scan_fixed(packed: &str, widths: &[usize]) -> Vec<u32> {
    let mut out = Vec::with_capacity(widths.len());
    let mut pos = 0;
    for width in widths {
        let end = (pos + width).min(packed.len());
        let part = &packed[pos..end];
        out.push(part.bytes().fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0')));
        pos = end;
    }
    out
}

/// Parses a datetime literal into a `Datetime` value at precision `fsp`.
///
/// `is_float` marks text produced from a float or decimal: for `YYYYMMDD` and
/// `YYMMDD` numbers the fraction is then ignored instead of being read as
/// `HHMMSS`.
pub(crate) fn parse_datetime(s: &str, fsp: u8, is_float: bool) -> TypeResult<Time> {
    let malformed = || TypeError::malformed("datetime", s);
    let (body, frac) = split_frac(trim_ascii(s));
    let groups = parse_date_format(body).ok_or_else(malformed)?;

    let mut f = DateFields::default();
    let mut has_seconds = false;
    if groups.len() == 1 {
        let packed = groups[0];
        match packed.len() {
            14 => {
                let v = scan_fixed(packed, &[4, 2, 2, 2, 2, 2]);
                (f.year, f.month, f.day, f.hour, f.minute, f.second) = (v[0], v[1], v[2], v[3], v[4], v[5]);
                has_seconds = true;
            }
            12 => {
                let v = scan_fixed(packed, &[2, 2, 2, 2, 2, 2]);
                (f.year, f.month, f.day, f.hour, f.minute, f.second) = (v[0], v[1], v[2], v[3], v[4], v[5]);
                f.year = window_two_digit_year(f.year);
                has_seconds = true;
            }
            8 => {
                let v = scan_fixed(packed, &[4, 2, 2]);
                (f.year, f.month, f.day) = (v[0], v[1], v[2]);
            }
            6 => {
                let v = scan_fixed(packed, &[2, 2, 2]);
                (f.year, f.month, f.day) = (window_two_digit_year(v[0]), v[1], v[2]);
            }
            _ => return Err(malformed()),
        }
        if matches!(packed.len(), 6 | 8) && !is_float && !frac.is_empty() {
            // '20170118.123423' reads the fraction as HHMMSS.
            let v = scan_fixed(frac, &[2, 2, 2]);
            match frac.len() {
                1 | 2 => f.hour = v[0],
                3 | 4 => (f.hour, f.minute) = (v[0], v[1]),
                _ => (f.hour, f.minute, f.second) = (v[0], v[1], v[2]),
            }
        }
    } else {
        let mut values = Vec::with_capacity(groups.len());
        for group in &groups {
            values.push(group.parse::<u32>().map_err(|_| malformed())?);
        }
        match values.as_slice() {
            [y, mo, d] => (f.year, f.month, f.day) = (*y, *mo, *d),
            [y, mo, d, h] => (f.year, f.month, f.day, f.hour) = (*y, *mo, *d, *h),
            [y, mo, d, h, mi] => {
                (f.year, f.month, f.day, f.hour, f.minute) = (*y, *mo, *d, *h, *mi);
            }
            [y, mo, d, h, mi, sec] => {
                (f.year, f.month, f.day, f.hour, f.minute, f.second) = (*y, *mo, *d, *h, *mi, *sec);
                has_seconds = true;
            }
            _ => return Err(malformed()),
        }
        if groups[0].len() == 2 {
            f.year = window_two_digit_year(f.year);
        }
    }

    let (microsecond, carry) = if has_seconds {
        parse_frac(frac, fsp)?
    } else {
        (0, false)
    };
    f.microsecond = microsecond;
    let t = Time::from_fields(f, TimeKind::Datetime, fsp)?;
    if !carry {
        return Ok(t);
    }
    let carried = t
        .to_naive()
        .and_then(|dt| dt.checked_add_signed(TimeDelta::seconds(1)))
        .ok_or_else(malformed)?;
    Time::from_naive(carried, TimeKind::Datetime, fsp)
}

fn packed_fields(n: i64) -> DateFields {
    let ymd = n / 1_000_000;
    let hms = n % 1_000_000;
    DateFields {
        year: (ymd / 10_000) as u32,
        month: (ymd / 100 % 100) as u32,
        day: (ymd % 100) as u32,
        hour: (hms / 10_000) as u32,
        minute: (hms / 100 % 100) as u32,
        second: (hms % 100) as u32,
        microsecond: 0,
    }
}

/// Decodes MySQL's packed numeric datetimes (`YYMMDD`, `YYYYMMDD`,
/// `YYMMDDHHMMSS`, `YYYYMMDDHHMMSS`). Two-digit years below 70 are 20xx.
pub(crate) fn datetime_from_number(n: i64) -> TypeResult<Time> {
    let invalid = || TypeError::malformed("datetime", n.to_string());
    if n == 0 {
        return Ok(Time::zero(TimeKind::Datetime, 0));
    }
    let packed = match n {
        n if n < 0 => return Err(invalid()),
        n if n >= 10_000_101_000_000 => n,
        n if n < 101 => return Err(invalid()),
        n if n <= 69_1231 => (n + 20_000_000) * 1_000_000,
        n if n < 70_0101 => return Err(invalid()),
        n if n <= 99_1231 => (n + 19_000_000) * 1_000_000,
        n if n < 1000_0101 => return Err(invalid()),
        n if n <= 9999_1231 => n * 1_000_000,
        n if n < 1_0100_0000 => return Err(invalid()),
        n if n <= 69_1231_235959 => n + 20_000_000_000_000,
        n if n < 70_0101_000000 => return Err(invalid()),
        n if n <= 99_1231_235959 => n + 19_000_000_000_000,
        n => n,
    };
    Time::from_fields(packed_fields(packed), TimeKind::Datetime, 0).map_err(|_| invalid())
}
