use crate::error::{TypeError, TypeResult};

pub const MIN_YEAR: i64 = 1901;
pub const MAX_YEAR: i64 = 2155;

/// Two-digit years: `00`-`69` are 20xx, `70`-`99` are 19xx. Larger values pass through.
pub(crate) fn window_two_digit_year(year: u32) -> u32 {
    match year {
        0..=69 => year + 2000,
        70..=99 => year + 1900,
        _ => year,
    }
}

/// Parses a year literal of one, two or four digits.
///
/// ```
/// use datum_types::time::parse_year;
///
/// assert_eq!(parse_year("69").unwrap(), 2069);
/// assert_eq!(parse_year("70").unwrap(), 1970);
/// assert_eq!(parse_year("1999").unwrap(), 1999);
/// assert!(parse_year("123").is_err());
/// ```
pub fn parse_year(s: &str) -> TypeResult<i16> {
    let invalid = || TypeError::malformed("year", s);
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let value: i16 = s.parse().map_err(|_| invalid())?;
    match s.len() {
        4 => Ok(value),
        1 | 2 => Ok(window_two_digit_year(value as u32) as i16),
        _ => Err(invalid()),
    }
}

/// Maps a value into the `YEAR` column domain.
///
/// `0` stays `0` for numbers but reads as `2000` when it came from a short string
/// such as `'0'` or `'00'`. Two-digit values are windowed, and the result must fall
/// within [`MIN_YEAR`]..=[`MAX_YEAR`].
pub fn adjust_year(year: i64, from_str: bool) -> TypeResult<i64> {
    let adjusted = match year {
        0 if from_str => 2000,
        0 => return Ok(0),
        1..=69 => year + 2000,
        70..=99 => year + 1900,
        _ => year,
    };
    if !(MIN_YEAR..=MAX_YEAR).contains(&adjusted) {
        return Err(TypeError::out_of_range("year", year));
    }
    Ok(adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_short_and_long_years() {
        let cases = [("0", 2000), ("00", 2000), ("1", 2001), ("69", 2069), ("70", 1970), ("99", 1999), ("2155", 2155)];
        for (input, expected) in cases {
            assert_eq!(parse_year(input).unwrap(), expected, "input={input}");
        }
        for bad in ["", "123", "12345", "1a", "-1"] {
            assert!(parse_year(bad).is_err(), "input={bad}");
        }
    }

    #[test]
    fn adjusts_into_column_range() {
        assert_eq!(adjust_year(0, false).unwrap(), 0);
        assert_eq!(adjust_year(0, true).unwrap(), 2000);
        assert_eq!(adjust_year(1, false).unwrap(), 2001);
        assert_eq!(adjust_year(70, false).unwrap(), 1970);
        assert_eq!(adjust_year(1901, false).unwrap(), 1901);
        assert_eq!(adjust_year(2155, false).unwrap(), 2155);
        for bad in [123, 1800, 2156, 3000, 20000, -1] {
            assert!(
                matches!(adjust_year(bad, false), Err(TypeError::OutOfRange { .. })),
                "year={bad}"
            );
        }
    }
}
