//! The tagged value cell.
//!
//! A [`Datum`] holds exactly one value of one [`DatumKind`] together with three
//! auxiliary fields every cell carries: a collation id, a fractional precision
//! (`frac`) and a display length. The payload lives in [`Value`]; the typed `as_*`
//! accessors return `None` for any kind other than the active one.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use datum_charset::BINARY_COLLATION_ID;
use ordered_float::OrderedFloat;
use serde_json::Value as JsonValue;

use crate::binary_literal::BinaryLiteral;
use crate::convert::number::f32_to_f64;
use crate::decimal::Decimal;
use crate::enum_set::{Enum, Set};
use crate::error::{TypeError, TypeResult};
use crate::json::JsonBinary;
use crate::time::{Duration, Time};

/// Kind tag of a [`Datum`]. The discriminants are stable diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum DatumKind {
    Null = 0,
    Int64 = 1,
    Uint64 = 2,
    Float32 = 3,
    Float64 = 4,
    String = 5,
    Bytes = 6,
    BinaryLiteral = 7,
    Decimal = 8,
    Duration = 9,
    Enum = 10,
    Bit = 11,
    Set = 12,
    Time = 13,
    Interface = 14,
    MinNotNull = 15,
    MaxValue = 16,
    Raw = 17,
    Json = 18,
}

impl DatumKind {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            DatumKind::Null => "null",
            DatumKind::Int64 => "int64",
            DatumKind::Uint64 => "uint64",
            DatumKind::Float32 => "float32",
            DatumKind::Float64 => "float64",
            DatumKind::String => "string",
            DatumKind::Bytes => "bytes",
            DatumKind::BinaryLiteral => "binary literal",
            DatumKind::Decimal => "decimal",
            DatumKind::Duration => "duration",
            DatumKind::Enum => "enum",
            DatumKind::Bit => "bit",
            DatumKind::Set => "set",
            DatumKind::Time => "time",
            DatumKind::Interface => "interface",
            DatumKind::MinNotNull => "min not null",
            DatumKind::MaxValue => "max value",
            DatumKind::Raw => "raw",
            DatumKind::Json => "json",
        }
    }
}

impl fmt::Display for DatumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opaque host value carried through unchanged. Clones share the value.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opaque")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Opaque values are equal only when they share the same allocation.
impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

/// Payload of a [`Datum`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Int64(i64),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    /// Character data; usually UTF-8 but not guaranteed.
    String(Vec<u8>),
    Bytes(Vec<u8>),
    BinaryLiteral(BinaryLiteral),
    Decimal(Decimal),
    Duration(Duration),
    Enum(Enum),
    Bit(BinaryLiteral),
    Set(Set),
    Time(Time),
    Interface(Opaque),
    MinNotNull,
    MaxValue,
    Raw(Vec<u8>),
    Json(JsonBinary),
}

impl Value {
    pub fn kind(&self) -> DatumKind {
        match self {
            Value::Null => DatumKind::Null,
            Value::Int64(_) => DatumKind::Int64,
            Value::Uint64(_) => DatumKind::Uint64,
            Value::Float32(_) => DatumKind::Float32,
            Value::Float64(_) => DatumKind::Float64,
            Value::String(_) => DatumKind::String,
            Value::Bytes(_) => DatumKind::Bytes,
            Value::BinaryLiteral(_) => DatumKind::BinaryLiteral,
            Value::Decimal(_) => DatumKind::Decimal,
            Value::Duration(_) => DatumKind::Duration,
            Value::Enum(_) => DatumKind::Enum,
            Value::Bit(_) => DatumKind::Bit,
            Value::Set(_) => DatumKind::Set,
            Value::Time(_) => DatumKind::Time,
            Value::Interface(_) => DatumKind::Interface,
            Value::MinNotNull => DatumKind::MinNotNull,
            Value::MaxValue => DatumKind::MaxValue,
            Value::Raw(_) => DatumKind::Raw,
            Value::Json(_) => DatumKind::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Datum {
    value: Value,
    collation: u8,
    frac: u16,
    length: u32,
}

impl Datum {
    fn with_value(value: Value) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn null() -> Self {
        Self::default()
    }

    /// Sorts after `NULL` and before every other value.
    pub fn min_not_null() -> Self {
        Self::with_value(Value::MinNotNull)
    }

    /// Sorts after every other value.
    pub fn max_value() -> Self {
        Self::with_value(Value::MaxValue)
    }

    pub fn from_i64(v: i64) -> Self {
        Self::with_value(Value::Int64(v))
    }

    pub fn from_u64(v: u64) -> Self {
        Self::with_value(Value::Uint64(v))
    }

    pub fn from_f32(v: f32) -> Self {
        Self::with_value(Value::Float32(v))
    }

    pub fn from_f64(v: f64) -> Self {
        Self::with_value(Value::Float64(v))
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self::with_value(Value::String(s.into().into_bytes()))
    }

    /// Binary data, tagged with the `binary` collation.
    pub fn from_bytes(b: impl Into<Vec<u8>>) -> Self {
        let mut d = Self::with_value(Value::Bytes(b.into()));
        d.collation = BINARY_COLLATION_ID;
        d
    }

    /// Character data that is not known to be valid UTF-8.
    pub fn from_bytes_as_string(b: impl Into<Vec<u8>>) -> Self {
        Self::with_value(Value::String(b.into()))
    }

    pub fn from_decimal(d: Decimal) -> Self {
        let frac = d.scale() as u16;
        let mut datum = Self::with_value(Value::Decimal(d));
        datum.frac = frac;
        datum
    }

    pub fn from_duration(d: Duration) -> Self {
        let frac = u16::from(d.fsp());
        let mut datum = Self::with_value(Value::Duration(d));
        datum.frac = frac;
        datum
    }

    pub fn from_time(t: Time) -> Self {
        Self::with_value(Value::Time(t))
    }

    pub fn from_enum(e: Enum) -> Self {
        Self::with_value(Value::Enum(e))
    }

    pub fn from_set(s: Set) -> Self {
        Self::with_value(Value::Set(s))
    }

    pub fn from_binary_literal(b: BinaryLiteral) -> Self {
        Self::with_value(Value::BinaryLiteral(b))
    }

    pub fn from_bit(b: BinaryLiteral) -> Self {
        Self::with_value(Value::Bit(b))
    }

    pub fn from_json(j: JsonBinary) -> Self {
        Self::with_value(Value::Json(j))
    }

    pub fn from_raw(b: impl Into<Vec<u8>>) -> Self {
        Self::with_value(Value::Raw(b.into()))
    }

    pub fn from_interface(o: Opaque) -> Self {
        Self::with_value(Value::Interface(o))
    }

    pub fn kind(&self) -> DatumKind {
        self.value.kind()
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Null)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn collation(&self) -> u8 {
        self.collation
    }

    pub fn set_collation(&mut self, collation: u8) {
        self.collation = collation;
    }

    /// Fractional precision: the fsp of a duration, the scale of a decimal column.
    pub fn frac(&self) -> u16 {
        self.frac
    }

    pub fn set_frac(&mut self, frac: u16) {
        self.frac = frac;
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn set_length(&mut self, length: u32) {
        self.length = length;
    }

    /// Replaces the payload. The auxiliary fields are kept.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    // The typed setters below reset collation, frac and length to what the matching
    // constructor would produce.

    pub fn set_null(&mut self) {
        *self = Self::null();
    }

    pub fn set_i64(&mut self, v: i64) {
        *self = Self::from_i64(v);
    }

    pub fn set_u64(&mut self, v: u64) {
        *self = Self::from_u64(v);
    }

    pub fn set_f64(&mut self, v: f64) {
        *self = Self::from_f64(v);
    }

    pub fn set_string(&mut self, s: impl Into<String>) {
        *self = Self::from_string(s);
    }

    pub fn set_bytes(&mut self, b: impl Into<Vec<u8>>) {
        *self = Self::from_bytes(b);
    }

    pub fn set_decimal(&mut self, d: Decimal) {
        *self = Self::from_decimal(d);
    }

    pub fn set_duration(&mut self, d: Duration) {
        *self = Self::from_duration(d);
    }

    pub fn set_time(&mut self, t: Time) {
        *self = Self::from_time(t);
    }

    /// Stores an auto-increment id as a signed or unsigned integer.
    pub fn set_auto_id(&mut self, id: i64, unsigned: bool) {
        *self = if unsigned {
            Self::from_u64(id as u64)
        } else {
            Self::from_i64(id)
        };
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            Value::Int64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self.value {
            Value::Uint64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self.value {
            Value::Float32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            Value::Float64(v) => Some(v),
            _ => None,
        }
    }

    /// Raw bytes of a String, Bytes or Raw cell.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            Value::String(b) | Value::Bytes(b) | Value::Raw(b) => Some(b),
            _ => None,
        }
    }

    /// Text of a String cell holding valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::String(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&Decimal> {
        match &self.value {
            Value::Decimal(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self.value {
            Value::Duration(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<Time> {
        match self.value {
            Value::Time(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&Enum> {
        match &self.value {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Set> {
        match &self.value {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Payload of a BinaryLiteral or Bit cell.
    pub fn as_binary_literal(&self) -> Option<&BinaryLiteral> {
        match &self.value {
            Value::BinaryLiteral(b) | Value::Bit(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&JsonBinary> {
        match &self.value {
            Value::Json(j) => Some(j),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&Opaque> {
        match &self.value {
            Value::Interface(o) => Some(o),
            _ => None,
        }
    }

    /// Text rendering of the value.
    ///
    /// Floats use the shortest text that reads back to the same value, without
    /// an exponent. Null, the sort sentinels, Raw and Interface cells have no
    /// text form.
    ///
    /// ```
    /// use datum_types::Datum;
    ///
    /// assert_eq!(Datum::from_f32(1.6).to_text().unwrap(), "1.6");
    /// assert_eq!(Datum::from(true).to_text().unwrap(), "1");
    /// assert!(Datum::null().to_text().is_err());
    /// ```
    pub fn to_text(&self) -> TypeResult<String> {
        match &self.value {
            Value::Int64(v) => Ok(v.to_string()),
            Value::Uint64(v) => Ok(v.to_string()),
            Value::Float32(v) => Ok(v.to_string()),
            Value::Float64(v) => Ok(v.to_string()),
            Value::String(b) | Value::Bytes(b) => Ok(String::from_utf8_lossy(b).into_owned()),
            Value::BinaryLiteral(b) | Value::Bit(b) => Ok(b.to_text()),
            Value::Decimal(d) => Ok(d.to_string()),
            Value::Duration(d) => Ok(d.to_string()),
            Value::Time(t) => Ok(t.to_string()),
            Value::Enum(e) => Ok(e.to_string()),
            Value::Set(s) => Ok(s.to_string()),
            Value::Json(j) => Ok(j.to_string()),
            Value::Null
            | Value::MinNotNull
            | Value::MaxValue
            | Value::Raw(_)
            | Value::Interface(_) => Err(TypeError::Representation(self.kind().name())),
        }
    }

    /// Byte rendering: character and binary payloads as stored, everything else
    /// through [`Datum::to_text`].
    pub fn to_bytes(&self) -> TypeResult<Vec<u8>> {
        match &self.value {
            Value::String(b) | Value::Bytes(b) => Ok(b.clone()),
            Value::BinaryLiteral(b) | Value::Bit(b) => Ok(b.as_bytes().to_vec()),
            _ => self.to_text().map(String::into_bytes),
        }
    }

    /// JSON rendering of the value.
    pub fn to_json(&self) -> TypeResult<JsonBinary> {
        let float = |f: f64| {
            serde_json::Number::from_f64(f)
                .map(JsonValue::Number)
                .ok_or(TypeError::Representation("json"))
        };
        let value = match &self.value {
            Value::Json(j) => return Ok(j.clone()),
            Value::Null => JsonValue::Null,
            Value::Int64(v) => JsonValue::from(*v),
            Value::Uint64(v) => JsonValue::from(*v),
            Value::Float32(v) => float(f32_to_f64(*v))?,
            Value::Float64(v) => float(*v)?,
            Value::Decimal(d) => float(d.to_f64())?,
            Value::String(b) | Value::Bytes(b) => {
                JsonValue::String(String::from_utf8_lossy(b).into_owned())
            }
            _ => JsonValue::String(self.to_text()?),
        };
        Ok(JsonBinary::from_value(&value))
    }

    /// Orders two cells.
    ///
    /// `NULL` sorts first, then the min-not-null sentinel, then values, then the
    /// max-value sentinel. Numeric kinds compare with each other across
    /// signedness and float width; other kinds compare only within their own
    /// kind. `None` means the kinds are not comparable.
    pub fn compare(&self, other: &Datum) -> Option<Ordering> {
        let (ra, rb) = (sort_rank(&self.value), sort_rank(&other.value));
        if ra != rb || ra != VALUE_RANK {
            return Some(ra.cmp(&rb));
        }
        if let (Some(a), Some(b)) = (Numeric::of(&self.value), Numeric::of(&other.value)) {
            return Some(a.compare(&b));
        }
        match (&self.value, &other.value) {
            (Value::String(a) | Value::Bytes(a), Value::String(b) | Value::Bytes(b)) => {
                Some(a.cmp(b))
            }
            (
                Value::BinaryLiteral(a) | Value::Bit(a),
                Value::BinaryLiteral(b) | Value::Bit(b),
            ) => Some(a.to_u64().value.cmp(&b.to_u64().value)),
            (Value::Time(a), Value::Time(b)) => Some(a.compare(b)),
            (Value::Duration(a), Value::Duration(b)) => Some(a.compare(b)),
            (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
            (Value::Set(a), Value::Set(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

const VALUE_RANK: u8 = 2;

fn sort_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::MinNotNull => 1,
        Value::MaxValue => 3,
        _ => VALUE_RANK,
    }
}

enum Numeric<'a> {
    Int(i64),
    Uint(u64),
    Float(f64),
    Decimal(&'a Decimal),
}

impl<'a> Numeric<'a> {
    fn of(value: &'a Value) -> Option<Self> {
        match value {
            Value::Int64(v) => Some(Numeric::Int(*v)),
            Value::Uint64(v) => Some(Numeric::Uint(*v)),
            Value::Float32(v) => Some(Numeric::Float(f64::from(*v))),
            Value::Float64(v) => Some(Numeric::Float(*v)),
            Value::Decimal(d) => Some(Numeric::Decimal(d)),
            _ => None,
        }
    }

    fn to_f64(&self) -> f64 {
        match self {
            Numeric::Int(v) => *v as f64,
            Numeric::Uint(v) => *v as f64,
            Numeric::Float(v) => *v,
            Numeric::Decimal(d) => d.to_f64(),
        }
    }

    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Numeric::Int(v) => Some(Decimal::from_i64(*v)),
            Numeric::Uint(v) => Some(Decimal::from_u64(*v)),
            Numeric::Decimal(d) => Some((*d).clone()),
            Numeric::Float(_) => None,
        }
    }

    fn compare(&self, other: &Numeric<'_>) -> Ordering {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => a.cmp(b),
            (Numeric::Uint(a), Numeric::Uint(b)) => a.cmp(b),
            (Numeric::Int(a), Numeric::Uint(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (Numeric::Uint(a), Numeric::Int(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (Numeric::Float(_), _) | (_, Numeric::Float(_)) => {
                OrderedFloat(self.to_f64()).cmp(&OrderedFloat(other.to_f64()))
            }
            _ => match (self.to_decimal(), other.to_decimal()) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => OrderedFloat(self.to_f64()).cmp(&OrderedFloat(other.to_f64())),
            },
        }
    }
}

/// Renders a row of cells: `a, b` wrapped in parentheses when there is more than
/// one. With `handle_special`, Null and the sort sentinels render as `NULL`,
/// `-inf` and `+inf` instead of failing.
pub fn datums_to_string(cells: &[Datum], handle_special: bool) -> TypeResult<String> {
    let mut parts = Vec::with_capacity(cells.len());
    for cell in cells {
        let text = match (handle_special, cell.kind()) {
            (true, DatumKind::Null) => "NULL".to_string(),
            (true, DatumKind::MinNotNull) => "-inf".to_string(),
            (true, DatumKind::MaxValue) => "+inf".to_string(),
            _ => cell.to_text()?,
        };
        parts.push(text);
    }
    let joined = parts.join(", ");
    if cells.len() > 1 {
        Ok(format!("({joined})"))
    } else {
        Ok(joined)
    }
}

/// [`datums_to_string`] for diagnostics: a cell without a text form is logged and
/// the row renders as an empty string.
pub fn datums_to_str_no_err(cells: &[Datum]) -> String {
    match datums_to_string(cells, true) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("failed to render row of {} cells: {err}", cells.len());
            String::new()
        }
    }
}

/// Deep copy of a row.
pub fn copy_row(cells: &[Datum]) -> Vec<Datum> {
    cells.to_vec()
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Datum::from_i64(i64::from(v))
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Datum {
            fn from(v: $t) -> Self {
                Datum::from_i64(i64::from(v))
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Datum {
            fn from(v: $t) -> Self {
                Datum::from_u64(u64::from(v))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<isize> for Datum {
    fn from(v: isize) -> Self {
        Datum::from_i64(v as i64)
    }
}

impl From<usize> for Datum {
    fn from(v: usize) -> Self {
        Datum::from_u64(v as u64)
    }
}

impl From<f32> for Datum {
    fn from(v: f32) -> Self {
        Datum::from_f32(v)
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::from_f64(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::from_string(v)
    }
}

impl From<String> for Datum {
    fn from(v: String) -> Self {
        Datum::from_string(v)
    }
}

impl From<Vec<u8>> for Datum {
    fn from(v: Vec<u8>) -> Self {
        Datum::from_bytes(v)
    }
}

impl From<&[u8]> for Datum {
    fn from(v: &[u8]) -> Self {
        Datum::from_bytes(v)
    }
}

impl From<Decimal> for Datum {
    fn from(v: Decimal) -> Self {
        Datum::from_decimal(v)
    }
}

impl From<Time> for Datum {
    fn from(v: Time) -> Self {
        Datum::from_time(v)
    }
}

impl From<Duration> for Datum {
    fn from(v: Duration) -> Self {
        Datum::from_duration(v)
    }
}

impl From<Enum> for Datum {
    fn from(v: Enum) -> Self {
        Datum::from_enum(v)
    }
}

impl From<Set> for Datum {
    fn from(v: Set) -> Self {
        Datum::from_set(v)
    }
}

impl From<BinaryLiteral> for Datum {
    fn from(v: BinaryLiteral) -> Self {
        Datum::from_binary_literal(v)
    }
}

impl From<JsonBinary> for Datum {
    fn from(v: JsonBinary) -> Self {
        Datum::from_json(v)
    }
}
