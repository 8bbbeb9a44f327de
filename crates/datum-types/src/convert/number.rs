//! Lenient numeric parsing shared by the conversion paths.
//!
//! MySQL reads the longest numeric prefix of a string and reports any trailing
//! characters as a truncation; these helpers implement that contract.

use crate::decimal::Decimal;
use crate::error::{Lossy, Outcome};

/// Exponents are saturated here before any digit expansion happens.
const EXPONENT_LIMIT: i64 = 100_000;

/// The numeric prefix of a string: `[+-]? digits [. digits] [e [+-] digits]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NumberPrefix<'a> {
    pub negative: bool,
    pub int_digits: &'a str,
    pub frac_digits: &'a str,
    pub has_point: bool,
    pub exponent: Option<i64>,
    /// Bytes of the input covered by the prefix; `0` when there is no number.
    pub len: usize,
}

impl NumberPrefix<'_> {
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_float_like(&self) -> bool {
        self.has_point || self.exponent.is_some()
    }
}

pub(crate) fn trim_ascii(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

pub(crate) fn scan_number(s: &str) -> NumberPrefix<'_> {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    let mut negative = false;
    if let Some(&sign @ (b'+' | b'-')) = bytes.first() {
        negative = sign == b'-';
        i = 1;
    }

    let int_start = i;
    let int_end = digits_from(int_start);
    i = int_end;

    let mut has_point = false;
    let (mut frac_start, mut frac_end) = (i, i);
    if bytes.get(i) == Some(&b'.') {
        has_point = true;
        frac_start = i + 1;
        frac_end = digits_from(frac_start);
        i = frac_end;
    }

    if int_start == int_end && frac_start == frac_end {
        return NumberPrefix {
            negative: false,
            int_digits: "",
            frac_digits: "",
            has_point: false,
            exponent: None,
            len: 0,
        };
    }

    let mut exponent = None;
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        let mut exp_negative = false;
        if let Some(&sign @ (b'+' | b'-')) = bytes.get(j) {
            exp_negative = sign == b'-';
            j += 1;
        }
        let end = digits_from(j);
        if end > j {
            let magnitude = bytes[j..end].iter().fold(0i64, |acc, b| {
                (acc * 10 + i64::from(b - b'0')).min(EXPONENT_LIMIT)
            });
            exponent = Some(if exp_negative { -magnitude } else { magnitude });
            i = end;
        }
    }

    NumberPrefix {
        negative,
        int_digits: &s[int_start..int_end],
        frac_digits: &s[frac_start..frac_end],
        has_point,
        exponent,
        len: i,
    }
}

/// Parses a run of ASCII digits, saturating at the `i128` range.
pub(crate) fn digits_to_i128(digits: &str, negative: bool) -> i128 {
    let digits = digits.trim_start_matches('0');
    let magnitude = if digits.len() > 38 {
        None
    } else {
        digits
            .bytes()
            .try_fold(0i128, |acc, b| acc.checked_mul(10)?.checked_add(i128::from(b - b'0')))
    };
    match (magnitude, negative) {
        (Some(m), false) => m,
        (Some(m), true) => -m,
        (None, false) => i128::MAX,
        (None, true) => i128::MIN,
    }
}

/// Integer value of a string, rounding float-like prefixes half away from zero.
///
/// The result saturates at the `i128` range; callers clamp to their own bounds.
pub(crate) fn str_to_i128(s: &str) -> Lossy<i128> {
    let s = trim_ascii(s);
    let prefix = scan_number(s);
    if prefix.is_empty() {
        return Lossy::new(0, Outcome::Truncated);
    }
    let outcome = if prefix.len < s.len() {
        Outcome::Truncated
    } else {
        Outcome::Exact
    };
    if !prefix.is_float_like() {
        return Lossy::new(digits_to_i128(prefix.int_digits, prefix.negative), outcome);
    }
    // Round through the decimal representation so long literals keep their digits.
    match Decimal::from_str(&s[..prefix.len]) {
        Ok(dec) => Lossy::new(dec.value.round_to_i128(), outcome.merge(dec.outcome)),
        Err(_) => Lossy::new(0, Outcome::TruncatedWrongValue),
    }
}

pub(crate) fn clamp_i128(value: i128, min: i128, max: i128) -> Lossy<i128> {
    if value < min {
        Lossy::new(min, Outcome::Overflow)
    } else if value > max {
        Lossy::new(max, Outcome::Overflow)
    } else {
        Lossy::exact(value)
    }
}

/// Signed integer value of a string.
///
/// ```
/// use datum_types::convert::number::str_to_int;
/// use datum_types::Outcome;
///
/// assert_eq!(str_to_int("65.0").value, 65);
/// assert_eq!(str_to_int("11xx").outcome, Outcome::Truncated);
/// ```
pub fn str_to_int(s: &str) -> Lossy<i64> {
    let raw = str_to_i128(s);
    let clamped = clamp_i128(raw.value, i64::MIN.into(), i64::MAX.into());
    Lossy::new(clamped.value as i64, raw.outcome.merge(clamped.outcome))
}

/// Unsigned integer value of a string; negative values clamp to zero.
pub fn str_to_uint(s: &str) -> Lossy<u64> {
    let raw = str_to_i128(s);
    let clamped = clamp_i128(raw.value, 0, u64::MAX.into());
    Lossy::new(clamped.value as u64, raw.outcome.merge(clamped.outcome))
}

/// Floating-point value of a string.
///
/// Magnitudes beyond `f64` clamp to `±f64::MAX` and report
/// [`Outcome::TruncatedWrongValue`].
pub fn str_to_float(s: &str) -> Lossy<f64> {
    let s = trim_ascii(s);
    let prefix = scan_number(s);
    if prefix.is_empty() {
        return Lossy::new(0.0, Outcome::Truncated);
    }
    let mut outcome = if prefix.len < s.len() {
        Outcome::Truncated
    } else {
        Outcome::Exact
    };
    let canonical = format!(
        "{}{}.{}e{}",
        if prefix.negative { "-" } else { "" },
        if prefix.int_digits.is_empty() { "0" } else { prefix.int_digits },
        if prefix.frac_digits.is_empty() { "0" } else { prefix.frac_digits },
        prefix.exponent.unwrap_or(0)
    );
    let mut value = canonical.parse::<f64>().unwrap_or(0.0);
    if value.is_infinite() {
        value = if value.is_sign_negative() {
            -f64::MAX
        } else {
            f64::MAX
        };
        outcome = outcome.merge(Outcome::TruncatedWrongValue);
    }
    Lossy::new(value, outcome)
}

/// Rounds half away from zero.
pub fn round_float(f: f64) -> f64 {
    f.round()
}

/// Rounds `f` to `dec` fractional digits, half away from zero.
pub fn round_float_to(f: f64, dec: i32) -> f64 {
    let shift = 10f64.powi(dec);
    let scaled = f * shift;
    if scaled.is_infinite() {
        return f;
    }
    let rounded = round_float(scaled) / shift;
    if rounded.is_nan() {
        0.0
    } else {
        rounded
    }
}

/// Shortest decimal text of an `f32`, widened without binary noise
/// (`0.1f32` becomes `0.1`, not `0.10000000149011612`).
pub(crate) fn f32_to_f64(f: f32) -> f64 {
    if !f.is_finite() {
        return f64::from(f);
    }
    f.to_string().parse().unwrap_or_else(|_| f64::from(f))
}
