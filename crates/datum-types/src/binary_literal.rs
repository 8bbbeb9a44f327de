//! Hex and bit literals (`x'4D'`, `0x4D`, `b'1010'`, `0b1010`) and the `BIT` payload.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Lossy, Outcome, TypeError, TypeResult};

/// Big-endian bytes of a binary literal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BinaryLiteral(Vec<u8>);

impl BinaryLiteral {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Encodes `value` in `byte_size` bytes, or the fewest bytes that hold it
    /// (at least one) when `byte_size` is `None`.
    ///
    /// ```
    /// use datum_types::BinaryLiteral;
    ///
    /// let lit = BinaryLiteral::from_u64(0x4D7953514C, None).unwrap();
    /// assert_eq!(lit.to_text(), "MySQL");
    /// assert_eq!(BinaryLiteral::from_u64(1, Some(2)).unwrap().as_bytes(), &[0, 1]);
    /// ```
    pub fn from_u64(value: u64, byte_size: Option<usize>) -> TypeResult<Self> {
        let needed = ((64 - value.leading_zeros() as usize) + 7) / 8;
        let width = match byte_size {
            None => needed.max(1),
            Some(n) if (1..=8).contains(&n) && needed <= n => n,
            Some(n) => {
                return Err(TypeError::out_of_range(
                    "bit",
                    format!("{value} in {n} bytes"),
                ))
            }
        };
        Ok(Self(value.to_be_bytes()[8 - width..].to_vec()))
    }

    /// Unsigned value; literals wider than eight significant bytes saturate with
    /// [`Outcome::Overflow`].
    pub fn to_u64(&self) -> Lossy<u64> {
        let significant = match self.0.iter().position(|&b| b != 0) {
            Some(start) => &self.0[start..],
            None => return Lossy::exact(0),
        };
        if significant.len() > 8 {
            return Lossy::new(u64::MAX, Outcome::Overflow);
        }
        Lossy::exact(significant.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// The bytes read as text.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    /// Binary digits without leading zeros (`"0"` for an all-zero literal).
    pub fn to_bit_string(&self) -> String {
        let bits: String = self.0.iter().map(|b| format!("{b:08b}")).collect();
        match bits.trim_start_matches('0') {
            "" => "0".to_string(),
            trimmed => trimmed.to_string(),
        }
    }

    /// Parses `x'..'`/`X'..'` or `0x..`. An odd number of digits gets a leading zero.
    pub fn parse_hex(s: &str) -> TypeResult<Self> {
        let malformed = || TypeError::malformed("hex literal", s);
        let digits = quoted_body(s, 'x')
            .or_else(|| s.strip_prefix("0x"))
            .ok_or_else(malformed)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        let padded = if digits.len() % 2 == 1 {
            format!("0{digits}")
        } else {
            digits.to_string()
        };
        let bytes = padded
            .as_bytes()
            .chunks(2)
            .map(|pair| {
                let hi = hex_value(pair[0]);
                let lo = hex_value(pair[1]);
                (hi << 4) | lo
            })
            .collect();
        Ok(Self(bytes))
    }

    /// Parses `b'..'`/`B'..'` or `0b..`, left-padding to whole bytes.
    pub fn parse_bit(s: &str) -> TypeResult<Self> {
        let malformed = || TypeError::malformed("bit literal", s);
        let digits = quoted_body(s, 'b')
            .or_else(|| s.strip_prefix("0b"))
            .ok_or_else(malformed)?;
        if !digits.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(malformed());
        }
        let pad = (8 - digits.len() % 8) % 8;
        let padded = format!("{}{digits}", "0".repeat(pad));
        let bytes = padded
            .as_bytes()
            .chunks(8)
            .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | (b - b'0')))
            .collect();
        Ok(Self(bytes))
    }
}

fn quoted_body(s: &str, prefix: char) -> Option<&str> {
    let rest = s
        .strip_prefix(prefix)
        .or_else(|| s.strip_prefix(prefix.to_ascii_uppercase()))?;
    rest.strip_prefix('\'')?.strip_suffix('\'')
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

impl From<Vec<u8>> for BinaryLiteral {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for BinaryLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}
