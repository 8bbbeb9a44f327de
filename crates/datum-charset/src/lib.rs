//! Charset and collation tables consumed by the datum value model.
//!
//! The tables are immutable statics: there is no registration API, so lookups are
//! safe to call from any thread without coordination. All name lookups are ASCII
//! case-insensitive, matching how MySQL resolves `CHARACTER SET` / `COLLATE` clauses.

#![forbid(unsafe_code)]

use thiserror::Error;

pub const CHARSET_BIN: &str = "binary";
pub const CHARSET_UTF8: &str = "utf8";
pub const CHARSET_UTF8MB4: &str = "utf8mb4";
pub const CHARSET_ASCII: &str = "ascii";
pub const CHARSET_LATIN1: &str = "latin1";

pub const COLLATION_BIN: &str = "binary";
pub const COLLATION_UTF8: &str = "utf8_bin";
pub const COLLATION_UTF8MB4: &str = "utf8mb4_bin";
pub const COLLATION_ASCII: &str = "ascii_bin";
pub const COLLATION_LATIN1: &str = "latin1_bin";

/// Collation id of the `binary` collation.
pub const BINARY_COLLATION_ID: u8 = 63;

/// Errors returned by charset and collation lookups.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CharsetError {
    #[error("unknown character set: '{0}'")]
    UnknownCharset(String),
    #[error("unknown collation: '{0}'")]
    UnknownCollation(String),
}

/// A single collation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collation {
    /// MySQL collation id (as sent in the handshake / column definitions).
    pub id: u8,
    pub charset: &'static str,
    pub name: &'static str,
    pub is_default: bool,
}

/// Description of a supported character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharsetDesc {
    pub name: &'static str,
    pub default_collation: &'static str,
    pub desc: &'static str,
    /// Maximum number of bytes per character.
    pub maxlen: u8,
}

static CHARSETS: &[CharsetDesc] = &[
    CharsetDesc {
        name: CHARSET_UTF8,
        default_collation: COLLATION_UTF8,
        desc: "UTF-8 Unicode",
        maxlen: 3,
    },
    CharsetDesc {
        name: CHARSET_UTF8MB4,
        default_collation: COLLATION_UTF8MB4,
        desc: "UTF-8 Unicode",
        maxlen: 4,
    },
    CharsetDesc {
        name: CHARSET_ASCII,
        default_collation: COLLATION_ASCII,
        desc: "US ASCII",
        maxlen: 1,
    },
    CharsetDesc {
        name: CHARSET_LATIN1,
        default_collation: COLLATION_LATIN1,
        desc: "Latin1",
        maxlen: 1,
    },
    CharsetDesc {
        name: CHARSET_BIN,
        default_collation: COLLATION_BIN,
        desc: "binary",
        maxlen: 1,
    },
];

static COLLATIONS: &[Collation] = &[
    Collation {
        id: 33,
        charset: CHARSET_UTF8,
        name: "utf8_general_ci",
        is_default: false,
    },
    Collation {
        id: 45,
        charset: CHARSET_UTF8MB4,
        name: "utf8mb4_general_ci",
        is_default: false,
    },
    Collation {
        id: 46,
        charset: CHARSET_UTF8MB4,
        name: COLLATION_UTF8MB4,
        is_default: true,
    },
    Collation {
        id: 47,
        charset: CHARSET_LATIN1,
        name: COLLATION_LATIN1,
        is_default: true,
    },
    Collation {
        id: BINARY_COLLATION_ID,
        charset: CHARSET_BIN,
        name: COLLATION_BIN,
        is_default: true,
    },
    Collation {
        id: 65,
        charset: CHARSET_ASCII,
        name: COLLATION_ASCII,
        is_default: true,
    },
    Collation {
        id: 83,
        charset: CHARSET_UTF8,
        name: COLLATION_UTF8,
        is_default: true,
    },
];

/// All supported charsets, in declaration order.
pub fn all_charsets() -> &'static [CharsetDesc] {
    CHARSETS
}

/// All known collations.
pub fn all_collations() -> &'static [Collation] {
    COLLATIONS
}

/// Look up a charset by name.
pub fn charset_desc(name: &str) -> Result<&'static CharsetDesc, CharsetError> {
    CHARSETS
        .iter()
        .find(|cs| cs.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| CharsetError::UnknownCharset(name.to_string()))
}

/// Default collation name for `charset`.
pub fn default_collation(charset: &str) -> Result<&'static str, CharsetError> {
    charset_desc(charset).map(|cs| cs.default_collation)
}

pub fn collation_by_name(name: &str) -> Result<&'static Collation, CharsetError> {
    COLLATIONS
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| CharsetError::UnknownCollation(name.to_string()))
}

pub fn collation_by_id(id: u8) -> Result<&'static Collation, CharsetError> {
    COLLATIONS
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| CharsetError::UnknownCollation(id.to_string()))
}

/// Checks that `charset` is supported and that `collation` belongs to it.
///
/// An empty charset is treated as `utf8`; an empty collation accepts the charset's
/// default.
pub fn valid_charset_and_collation(charset: &str, collation: &str) -> bool {
    let charset = if charset.is_empty() {
        CHARSET_UTF8
    } else {
        charset
    };
    let Ok(desc) = charset_desc(charset) else {
        return false;
    };
    if collation.is_empty() {
        return true;
    }
    COLLATIONS
        .iter()
        .any(|c| c.charset == desc.name && c.name.eq_ignore_ascii_case(collation))
}

/// Resolves the collation a column uses: an explicit collation must belong to the
/// charset, otherwise the charset default applies.
pub fn resolve_collation(charset: &str, collation: &str) -> Result<&'static Collation, CharsetError> {
    let desc = charset_desc(charset)?;
    let name = if collation.is_empty() {
        desc.default_collation
    } else {
        collation
    };
    let found = collation_by_name(name)?;
    if found.charset != desc.name {
        return Err(CharsetError::UnknownCollation(name.to_string()));
    }
    Ok(found)
}

/// `true` for the `binary` pseudo-charset.
#[inline]
pub fn is_binary(charset: &str) -> bool {
    charset.eq_ignore_ascii_case(CHARSET_BIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_charset_default_collation_exists_and_is_marked_default() {
        for cs in all_charsets() {
            let collation = collation_by_name(cs.default_collation).unwrap();
            assert_eq!(collation.charset, cs.name);
            assert!(collation.is_default, "{} should be default", collation.name);
        }
    }

    #[test]
    fn collation_ids_are_unique() {
        let mut ids: Vec<u8> = all_collations().iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all_collations().len());
    }

    #[test]
    fn resolve_collation_rejects_foreign_collation() {
        assert_eq!(resolve_collation("utf8mb4", "").unwrap().id, 46);
        assert_eq!(resolve_collation("UTF8", "utf8_general_ci").unwrap().id, 33);
        assert!(resolve_collation("latin1", "utf8_bin").is_err());
    }
}
