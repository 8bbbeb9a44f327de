//! Fixed-point decimal with MySQL `DECIMAL` semantics.
//!
//! Digits are stored in base-10⁹ words: integer words are right-aligned (the last
//! integer word holds the units digit), fraction words are left-aligned (the first
//! fraction word holds the tenths digit, a partial last word is zero-padded on the
//! right). A value holds at most [`WORD_CAPACITY`] words.
//!
//! Arithmetic here is limited to what conversions need: parsing, shifting the decimal
//! point, rounding and comparison.

use std::cmp::Ordering;
use std::fmt;

use crate::convert::number::{scan_number, trim_ascii};
use crate::error::{Lossy, Outcome, TypeError, TypeResult};

pub const DIGITS_PER_WORD: usize = 9;
pub const WORD_CAPACITY: usize = 9;
/// Total digit capacity of a value.
pub const MAX_DIGITS: usize = DIGITS_PER_WORD * WORD_CAPACITY;
/// Largest precision a `DECIMAL` column may declare.
pub const MAX_PRECISION: u32 = 65;
/// Largest scale a `DECIMAL` column may declare.
pub const MAX_SCALE: u32 = 30;

/// Shifts and exponents beyond this cannot produce a representable nonzero value.
const SHIFT_LIMIT: i64 = 2 * MAX_DIGITS as i64 + 2;

const POW10: [u32; DIGITS_PER_WORD + 1] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoundMode {
    /// Banker's rounding: ties go to the even neighbour.
    #[default]
    HalfEven,
    /// Ties go away from zero.
    HalfUp,
    /// Drop the excess digits.
    Truncate,
}

#[derive(Clone, Debug)]
pub struct Decimal {
    negative: bool,
    /// Integer digit count, without leading zeros.
    digits_int: u8,
    /// Fraction digit count (the scale), trailing zeros included.
    digits_frac: u8,
    words: Vec<u32>,
}

fn words_for(digits: usize) -> usize {
    digits.div_ceil(DIGITS_PER_WORD)
}

fn digits_to_word(digits: &[u8]) -> u32 {
    digits.iter().fold(0u32, |acc, d| acc * 10 + u32::from(*d))
}

fn push_word_digits(out: &mut Vec<u8>, word: u32, width: usize) {
    for i in (0..width).rev() {
        out.push(((word / POW10[i]) % 10) as u8);
    }
}

fn strip_leading_zeros(digits: &mut Vec<u8>) {
    let lead = digits.iter().take_while(|d| **d == 0).count();
    digits.drain(..lead);
}

fn ascii_digits(s: &str) -> impl Iterator<Item = u8> + '_ {
    s.bytes().map(|b| b - b'0')
}

/// Rounds the magnitude `int.frac` to `scale` fractional digits in place.
///
/// A negative `scale` rounds integer digits (`scale = -2` rounds to hundreds). The
/// fraction is zero-padded when it is shorter than `scale`. Returns whether any
/// nonzero digit was dropped.
fn round_digits(int: &mut Vec<u8>, frac: &mut Vec<u8>, scale: i64, mode: RoundMode) -> bool {
    if scale >= 0 && frac.len() as i64 <= scale {
        frac.resize(scale as usize, 0);
        return false;
    }

    // Leading slot absorbs a carry out of the most significant digit.
    let mut digits = Vec::with_capacity(int.len() + frac.len() + 1);
    digits.push(0u8);
    digits.extend_from_slice(int);
    let point = digits.len();
    digits.extend_from_slice(frac);

    let cut = point as i64 + scale;
    if cut <= 0 {
        let changed = digits.iter().any(|d| *d != 0);
        int.clear();
        frac.clear();
        return changed;
    }
    let cut = cut as usize;

    let dropped = &digits[cut..];
    let changed = dropped.iter().any(|d| *d != 0);
    let first = dropped.first().copied().unwrap_or(0);
    let round_up = match mode {
        RoundMode::Truncate => false,
        RoundMode::HalfUp => first >= 5,
        RoundMode::HalfEven => {
            first > 5
                || (first == 5
                    && (dropped.iter().skip(1).any(|d| *d != 0) || digits[cut - 1] % 2 == 1))
        }
    };

    digits.truncate(cut);
    if round_up {
        for d in digits.iter_mut().rev() {
            if *d == 9 {
                *d = 0;
            } else {
                *d += 1;
                break;
            }
        }
    }

    if scale >= 0 {
        *frac = digits.split_off(point);
    } else {
        digits.resize(point, 0);
        frac.clear();
    }
    *int = digits;
    changed
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero()
    }
}

impl Decimal {
    pub fn zero() -> Self {
        Self {
            negative: false,
            digits_int: 0,
            digits_frac: 0,
            words: Vec::new(),
        }
    }

    /// Packs digit vectors that are known to fit the word capacity.
    fn pack(negative: bool, int: &[u8], frac: &[u8]) -> Self {
        debug_assert!(words_for(int.len()) + words_for(frac.len()) <= WORD_CAPACITY);
        let mut words = Vec::with_capacity(words_for(int.len()) + words_for(frac.len()));
        let head = int.len() % DIGITS_PER_WORD;
        if head != 0 {
            words.push(digits_to_word(&int[..head]));
        }
        for chunk in int[head..].chunks(DIGITS_PER_WORD) {
            words.push(digits_to_word(chunk));
        }
        for chunk in frac.chunks(DIGITS_PER_WORD) {
            words.push(digits_to_word(chunk) * POW10[DIGITS_PER_WORD - chunk.len()]);
        }
        let is_zero = words.iter().all(|w| *w == 0);
        Self {
            negative: negative && !is_zero,
            digits_int: int.len() as u8,
            digits_frac: frac.len() as u8,
            words,
        }
    }

    fn unpack(&self) -> (Vec<u8>, Vec<u8>) {
        let digits_int = usize::from(self.digits_int);
        let int_words = words_for(digits_int);
        let mut int = Vec::with_capacity(digits_int);
        for (i, word) in self.words[..int_words].iter().enumerate() {
            let width = if i == 0 {
                digits_int - DIGITS_PER_WORD * (int_words - 1)
            } else {
                DIGITS_PER_WORD
            };
            push_word_digits(&mut int, *word, width);
        }
        let mut frac = Vec::with_capacity(self.words.len().saturating_sub(int_words) * DIGITS_PER_WORD);
        for word in &self.words[int_words..] {
            push_word_digits(&mut frac, *word, DIGITS_PER_WORD);
        }
        frac.truncate(usize::from(self.digits_frac));
        (int, frac)
    }

    /// Normalizes arbitrary digit vectors into the word capacity: too many integer
    /// digits overflow to the all-nines value, excess fraction digits are rounded
    /// half up.
    fn fit(negative: bool, mut int: Vec<u8>, mut frac: Vec<u8>) -> Lossy<Self> {
        let mut outcome = Outcome::Exact;
        loop {
            strip_leading_zeros(&mut int);
            if int.len() > MAX_DIGITS {
                return Lossy::new(
                    Self::max_value(negative, MAX_DIGITS as u32, 0),
                    Outcome::Overflow,
                );
            }
            let max_frac = (WORD_CAPACITY - words_for(int.len())) * DIGITS_PER_WORD;
            if frac.len() <= max_frac {
                break;
            }
            if round_digits(&mut int, &mut frac, max_frac as i64, RoundMode::HalfUp) {
                outcome = outcome.merge(Outcome::Truncated);
            }
        }
        Lossy::new(Self::pack(negative, &int, &frac), outcome)
    }

    /// Parses a decimal literal.
    ///
    /// Leading and trailing ASCII whitespace is ignored. Trailing garbage after a
    /// valid prefix is dropped with [`Outcome::Truncated`]; a string without any
    /// digits is an error.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> TypeResult<Lossy<Self>> {
        let trimmed = trim_ascii(s);
        let prefix = scan_number(trimmed);
        if prefix.is_empty() {
            return Err(TypeError::malformed("DECIMAL", s));
        }
        let mut int: Vec<u8> = ascii_digits(prefix.int_digits).collect();
        let mut frac: Vec<u8> = ascii_digits(prefix.frac_digits).collect();

        if let Some(exp) = prefix.exponent.filter(|e| *e != 0) {
            let exp = exp.clamp(-SHIFT_LIMIT, SHIFT_LIMIT);
            (int, frac) = shift_digits(int, frac, exp);
        }

        let fitted = Self::fit(prefix.negative, int, frac);
        if prefix.len < trimmed.len() {
            Ok(fitted.with_outcome(Outcome::Truncated))
        } else {
            Ok(fitted)
        }
    }

    pub fn from_i64(value: i64) -> Self {
        let mut dec = Self::from_u64(value.unsigned_abs());
        dec.negative = value < 0;
        dec
    }

    pub fn from_u64(value: u64) -> Self {
        let digits: Vec<u8> = ascii_digits(&value.to_string()).collect();
        Self::pack(false, &digits, &[])
    }

    /// Converts through the shortest decimal text of `value`.
    pub fn from_f64(value: f64) -> TypeResult<Lossy<Self>> {
        if !value.is_finite() {
            return Err(TypeError::malformed("DECIMAL", value.to_string()));
        }
        Self::from_str(&value.to_string())
    }

    /// The largest magnitude representable with `precision` total digits of which
    /// `scale` are fractional, e.g. `max_value(false, 8, 4)` is `9999.9999`.
    pub fn max_value(negative: bool, precision: u32, scale: u32) -> Self {
        let precision = (precision as usize).min(MAX_DIGITS);
        let scale = (scale as usize).min(precision);
        let int = vec![9u8; precision - scale];
        let frac = vec![9u8; scale];
        if words_for(int.len()) + words_for(frac.len()) <= WORD_CAPACITY {
            Self::pack(negative, &int, &frac)
        } else {
            Self::fit(negative, int, frac).value
        }
    }

    /// Moves the decimal point `k` places to the right (left when negative).
    pub fn shift(&self, k: i32) -> Lossy<Self> {
        if self.is_zero() {
            return Lossy::exact(self.clone());
        }
        let (int, frac) = self.unpack();
        let (int, frac) = shift_digits(int, frac, i64::from(k).clamp(-SHIFT_LIMIT, SHIFT_LIMIT));
        Self::fit(self.negative, int, frac)
    }

    /// Rounds to `scale` fractional digits. The result always has exactly
    /// `max(scale, 0)` fraction digits; a negative scale rounds integer digits.
    ///
    /// The outcome is [`Outcome::Truncated`] when nonzero digits were dropped and
    /// [`Outcome::Overflow`] when a carry overflowed the digit capacity.
    pub fn round(&self, scale: i32, mode: RoundMode) -> Lossy<Self> {
        let (mut int, mut frac) = self.unpack();
        let changed = round_digits(&mut int, &mut frac, i64::from(scale), mode);
        let fitted = Self::fit(self.negative, int, frac);
        if changed {
            fitted.with_outcome(Outcome::Truncated)
        } else {
            fitted
        }
    }

    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Significant integer digits plus fraction digits.
    pub fn precision(&self) -> u32 {
        u32::from(self.digits_int) + u32::from(self.digits_frac)
    }

    /// Count of integer digits, leading zeros excluded.
    pub fn int_digits(&self) -> u32 {
        u32::from(self.digits_int)
    }

    pub fn scale(&self) -> u32 {
        u32::from(self.digits_frac)
    }

    #[must_use]
    pub fn neg(&self) -> Self {
        let mut out = self.clone();
        out.negative = !self.negative && !self.is_zero();
        out
    }

    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(0.0)
    }

    /// Rounds half away from zero to an integer, saturating at the `i128` range.
    pub(crate) fn round_to_i128(&self) -> i128 {
        let rounded = self.round(0, RoundMode::HalfUp).value;
        let (int, _) = rounded.unpack();
        let magnitude = if int.len() > 38 {
            None
        } else {
            int.iter()
                .try_fold(0i128, |acc, d| acc.checked_mul(10)?.checked_add(i128::from(*d)))
        };
        match (magnitude, rounded.negative) {
            (Some(m), false) => m,
            (Some(m), true) => -m,
            (None, false) => i128::MAX,
            (None, true) => i128::MIN,
        }
    }

    /// Rounds half away from zero and clamps to the `i64` range.
    pub fn to_i64(&self) -> Lossy<i64> {
        let value = self.round_to_i128();
        let outcome = self.rounding_outcome();
        match i64::try_from(value) {
            Ok(v) => Lossy::new(v, outcome),
            Err(_) if value < 0 => Lossy::new(i64::MIN, Outcome::Overflow),
            Err(_) => Lossy::new(i64::MAX, Outcome::Overflow),
        }
    }

    /// Rounds half away from zero and clamps to the `u64` range; negative values
    /// clamp to zero.
    pub fn to_u64(&self) -> Lossy<u64> {
        let value = self.round_to_i128();
        let outcome = self.rounding_outcome();
        if value < 0 {
            return Lossy::new(0, Outcome::Overflow);
        }
        match u64::try_from(value) {
            Ok(v) => Lossy::new(v, outcome),
            Err(_) => Lossy::new(u64::MAX, Outcome::Overflow),
        }
    }

    fn rounding_outcome(&self) -> Outcome {
        let (_, frac) = self.unpack();
        if frac.iter().any(|d| *d != 0) {
            Outcome::Truncated
        } else {
            Outcome::Exact
        }
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        let int_words = words_for(usize::from(self.digits_int));
        self.digits_int
            .cmp(&other.digits_int)
            .then_with(|| self.words[..int_words].cmp(&other.words[..int_words]))
            .then_with(|| {
                let a = &self.words[int_words..];
                let b = &other.words[int_words..];
                (0..a.len().max(b.len()))
                    .map(|i| {
                        let x = a.get(i).copied().unwrap_or(0);
                        let y = b.get(i).copied().unwrap_or(0);
                        x.cmp(&y)
                    })
                    .find(|ord| ord.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
    }
}

/// Moves the decimal point of `int.frac` by `k` places.
fn shift_digits(int: Vec<u8>, frac: Vec<u8>, k: i64) -> (Vec<u8>, Vec<u8>) {
    let point = int.len() as i64 + k;
    let mut digits = int;
    digits.extend(frac);
    if point <= 0 {
        let mut frac = vec![0u8; point.unsigned_abs() as usize];
        frac.extend(digits);
        (Vec::new(), frac)
    } else if point as usize >= digits.len() {
        digits.resize(point as usize, 0);
        (digits, Vec::new())
    } else {
        let frac = digits.split_off(point as usize);
        (digits, frac)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (int, frac) = self.unpack();
        let mut out = String::with_capacity(int.len() + frac.len() + 3);
        if self.negative {
            out.push('-');
        }
        if int.is_empty() {
            out.push('0');
        }
        out.extend(int.iter().map(|d| char::from(b'0' + d)));
        if !frac.is_empty() {
            out.push('.');
            out.extend(frac.iter().map(|d| char::from(b'0' + d)));
        }
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap().value
    }

    #[test]
    fn word_layout() {
        let d = dec("1234567890.5");
        assert_eq!(d.words, vec![1, 234_567_890, 500_000_000]);
        assert_eq!((d.digits_int, d.digits_frac), (10, 1));
        assert_eq!(d.to_string(), "1234567890.5");
    }

    #[test]
    fn parses_literals() {
        assert_eq!(dec("  -123.4500 ").to_string(), "-123.4500");
        assert_eq!(dec("0.002e3").to_string(), "2");
        assert_eq!(dec(".5").to_string(), "0.5");
        assert_eq!(dec("1.5e-3").to_string(), "0.0015");
        assert_eq!(dec("-0.000").to_string(), "0.000");
        assert!(!dec("-0.000").is_negative());

        let lossy = Decimal::from_str("12.5abc").unwrap();
        assert_eq!(lossy.value.to_string(), "12.5");
        assert_eq!(lossy.outcome, Outcome::Truncated);

        assert!(Decimal::from_str("abc").is_err());
        assert!(Decimal::from_str("").is_err());
    }

    #[test]
    fn overflows_to_all_nines() {
        let lossy = Decimal::from_str("1e649").unwrap();
        assert_eq!(lossy.outcome, Outcome::Overflow);
        assert_eq!(lossy.value.to_string(), "9".repeat(MAX_DIGITS));
    }

    #[test]
    fn excess_fraction_digits_are_rounded() {
        let text = format!("0.{}5", "1".repeat(MAX_DIGITS));
        let lossy = Decimal::from_str(&text).unwrap();
        assert_eq!(lossy.outcome, Outcome::Truncated);
        assert_eq!(lossy.value.scale() as usize, MAX_DIGITS);
        assert!(lossy.value.to_string().ends_with("12"));
    }

    #[test]
    fn shift_then_round_half_even() {
        let shifted = Decimal::from_i64(-123).shift(-5);
        assert_eq!(shifted.outcome, Outcome::Exact);
        assert_eq!(shifted.value.to_string(), "-0.00123");
        let rounded = shifted.value.round(5, RoundMode::HalfEven);
        assert_eq!(rounded, Lossy::exact(dec("-0.00123")));
        assert_eq!(rounded.value.to_string(), "-0.00123");

        assert_eq!(dec("1.5").shift(3).value.to_string(), "1500");
        assert_eq!(dec("12345").shift(-2).value.to_string(), "123.45");
    }

    #[test]
    fn rounding_modes() {
        let cases = [
            ("2.5", 0, RoundMode::HalfEven, "2"),
            ("3.5", 0, RoundMode::HalfEven, "4"),
            ("2.51", 0, RoundMode::HalfEven, "3"),
            ("-2.5", 0, RoundMode::HalfEven, "-2"),
            ("2.5", 0, RoundMode::HalfUp, "3"),
            ("-2.5", 0, RoundMode::HalfUp, "-3"),
            ("2.59", 1, RoundMode::Truncate, "2.5"),
            ("3.1415926", 4, RoundMode::HalfEven, "3.1416"),
            ("9.99", 1, RoundMode::HalfUp, "10.0"),
            ("1.2", 3, RoundMode::HalfEven, "1.200"),
            ("1250", -2, RoundMode::HalfEven, "1200"),
            ("1350", -2, RoundMode::HalfEven, "1400"),
            ("49", -2, RoundMode::HalfUp, "0"),
            ("50", -2, RoundMode::HalfUp, "100"),
            ("-0.4", 0, RoundMode::HalfUp, "0"),
        ];
        for (input, scale, mode, expected) in cases {
            let rounded = dec(input).round(scale, mode).value;
            assert_eq!(rounded.to_string(), expected, "{input} round({scale}, {mode:?})");
        }
        assert_eq!(dec("1.20").round(1, RoundMode::HalfEven).outcome, Outcome::Exact);
        assert_eq!(dec("1.25").round(1, RoundMode::HalfEven).outcome, Outcome::Truncated);
    }

    #[test]
    fn ordering_ignores_scale_and_sign_of_zero() {
        assert_eq!(dec("1.50"), dec("1.5"));
        assert_eq!(dec("-0.00"), Decimal::zero());
        assert!(dec("-2") < dec("-1.5"));
        assert!(dec("10") > dec("9.999"));
        assert!(dec("0.0001") > dec("0.00009"));
        assert!(dec("1000000000") > dec("999999999.9"));
    }

    #[test]
    fn integer_and_float_conversions() {
        assert_eq!(dec("-9999.5").to_i64(), Lossy::new(-10000, Outcome::Truncated));
        assert_eq!(dec("42").to_i64(), Lossy::exact(42));
        assert_eq!(dec("-1").to_u64(), Lossy::new(0, Outcome::Overflow));
        assert_eq!(dec("1e30").to_i64(), Lossy::new(i64::MAX, Outcome::Overflow));
        assert_eq!(dec("123.456").to_f64(), 123.456);
        assert_eq!(Decimal::from_f64(3.1416).unwrap().value.to_string(), "3.1416");
        assert!(Decimal::from_f64(f64::NAN).is_err());
        assert_eq!(Decimal::from_u64(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(Decimal::from_i64(i64::MIN).to_string(), "-9223372036854775808");
    }

    #[test]
    fn max_value_is_all_nines() {
        assert_eq!(Decimal::max_value(false, 8, 4).to_string(), "9999.9999");
        assert_eq!(Decimal::max_value(true, 5, 0).to_string(), "-99999");
        assert_eq!(Decimal::max_value(false, 3, 3).to_string(), "0.999");
    }
}
