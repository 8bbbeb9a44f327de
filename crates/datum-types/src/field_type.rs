//! Target type descriptors.
//!
//! A [`FieldType`] is the column definition the conversion engine coerces values
//! into. The engine only reads descriptors; nothing here is persisted.

use serde::{Deserialize, Serialize};

use crate::time::{TimeKind, MAX_FSP};

/// Column type kinds understood by the conversion engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Tiny,
    Short,
    Int24,
    Long,
    Longlong,
    Float,
    Double,
    NewDecimal,
    Year,
    Date,
    Datetime,
    Timestamp,
    Duration,
    Bit,
    Enum,
    Set,
    Json,
    /// `CHAR(n)` / `BINARY(n)`.
    String,
    VarString,
    Varchar,
    TinyBlob,
    MediumBlob,
    Blob,
    LongBlob,
}

impl FieldKind {
    /// Canonical SQL type name.
    pub fn type_str(self) -> &'static str {
        match self {
            FieldKind::Tiny => "tinyint",
            FieldKind::Short => "smallint",
            FieldKind::Int24 => "mediumint",
            FieldKind::Long => "int",
            FieldKind::Longlong => "bigint",
            FieldKind::Float => "float",
            FieldKind::Double => "double",
            FieldKind::NewDecimal => "decimal",
            FieldKind::Year => "year",
            FieldKind::Date => "date",
            FieldKind::Datetime => "datetime",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Duration => "time",
            FieldKind::Bit => "bit",
            FieldKind::Enum => "enum",
            FieldKind::Set => "set",
            FieldKind::Json => "json",
            FieldKind::String => "char",
            FieldKind::VarString => "var_string",
            FieldKind::Varchar => "varchar",
            FieldKind::TinyBlob => "tinytext",
            FieldKind::MediumBlob => "mediumtext",
            FieldKind::Blob => "text",
            FieldKind::LongBlob => "longtext",
        }
    }

    /// Type name adjusted for the column charset: binary TEXT kinds are BLOBs and
    /// binary CHAR/VARCHAR are BINARY/VARBINARY.
    pub fn type_to_str(self, charset: &str) -> String {
        let name = self.type_str();
        if !datum_charset::is_binary(charset) {
            return name.to_string();
        }
        if self.is_blob() {
            name.replacen("text", "blob", 1)
        } else if self.is_char() {
            name.replacen("char", "binary", 1)
        } else {
            name.to_string()
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            FieldKind::Tiny
                | FieldKind::Short
                | FieldKind::Int24
                | FieldKind::Long
                | FieldKind::Longlong
        )
    }

    pub fn is_blob(self) -> bool {
        matches!(
            self,
            FieldKind::TinyBlob | FieldKind::MediumBlob | FieldKind::Blob | FieldKind::LongBlob
        )
    }

    /// `CHAR` and `VARCHAR`.
    pub fn is_char(self) -> bool {
        matches!(self, FieldKind::String | FieldKind::Varchar)
    }

    pub fn is_string(self) -> bool {
        self.is_char() || self.is_blob() || self == FieldKind::VarString
    }

    pub fn time_kind(self) -> Option<TimeKind> {
        match self {
            FieldKind::Date => Some(TimeKind::Date),
            FieldKind::Datetime => Some(TimeKind::Datetime),
            FieldKind::Timestamp => Some(TimeKind::Timestamp),
            _ => None,
        }
    }

    /// Inclusive signed range of an integer kind.
    pub fn signed_bounds(self) -> Option<(i64, i64)> {
        match self {
            FieldKind::Tiny => Some((i8::MIN.into(), i8::MAX.into())),
            FieldKind::Short => Some((i16::MIN.into(), i16::MAX.into())),
            FieldKind::Int24 => Some((-(1 << 23), (1 << 23) - 1)),
            FieldKind::Long => Some((i32::MIN.into(), i32::MAX.into())),
            FieldKind::Longlong => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Inclusive unsigned upper bound of an integer kind.
    pub fn unsigned_upper(self) -> Option<u64> {
        match self {
            FieldKind::Tiny => Some(u8::MAX.into()),
            FieldKind::Short => Some(u16::MAX.into()),
            FieldKind::Int24 => Some((1 << 24) - 1),
            FieldKind::Long => Some(u32::MAX.into()),
            FieldKind::Longlong => Some(u64::MAX),
            _ => None,
        }
    }
}

/// Target type descriptor.
///
/// `flen` and `decimal` use `None` for "unspecified"; an unspecified width never
/// truncates and an unspecified scale never rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldType {
    pub kind: FieldKind,
    #[serde(default)]
    pub unsigned: bool,
    #[serde(default)]
    pub flen: Option<u32>,
    #[serde(default)]
    pub decimal: Option<u32>,
    #[serde(default)]
    pub charset: String,
    #[serde(default)]
    pub collation: String,
    /// Member names of an `ENUM`/`SET`, in declaration order.
    #[serde(default)]
    pub elems: Vec<String>,
}

impl FieldType {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            unsigned: false,
            flen: None,
            decimal: None,
            charset: String::new(),
            collation: String::new(),
            elems: Vec::new(),
        }
    }

    #[must_use]
    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    #[must_use]
    pub fn with_flen(mut self, flen: u32) -> Self {
        self.flen = Some(flen);
        self
    }

    #[must_use]
    pub fn with_decimal(mut self, decimal: u32) -> Self {
        self.decimal = Some(decimal);
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    #[must_use]
    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = collation.into();
        self
    }

    #[must_use]
    pub fn with_elems<I, S>(mut self, elems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elems = elems.into_iter().map(Into::into).collect();
        self
    }

    /// Fractional-seconds precision for temporal kinds: the scale clamped to `0..=6`.
    pub fn fsp(&self) -> u8 {
        self.decimal
            .map_or(0, |d| d.min(u32::from(MAX_FSP)) as u8)
    }

    pub fn type_str(&self) -> &'static str {
        self.kind.type_str()
    }

    pub fn type_to_str(&self) -> String {
        self.kind.type_to_str(&self.charset)
    }

    /// Display form of the full column type, e.g. `decimal(8,4) unsigned`.
    pub fn sql_string(&self) -> String {
        let mut out = self.type_to_str();
        match self.kind {
            FieldKind::Enum | FieldKind::Set => {
                let members: Vec<String> = self
                    .elems
                    .iter()
                    .map(|e| format!("'{}'", e.replace('\'', "''")))
                    .collect();
                out.push('(');
                out.push_str(&members.join(","));
                out.push(')');
            }
            _ => match (self.flen, self.decimal) {
                (Some(flen), Some(dec)) if self.kind.time_kind().is_none() => {
                    out.push_str(&format!("({flen},{dec})"));
                }
                (Some(flen), _) => out.push_str(&format!("({flen})")),
                (None, Some(dec)) if dec > 0 => out.push_str(&format!("({dec})")),
                _ => {}
            },
        }
        if self.unsigned {
            out.push_str(" unsigned");
        }
        out
    }
}
