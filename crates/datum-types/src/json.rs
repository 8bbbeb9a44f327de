//! JSON cell payloads.
//!
//! A [`JsonBinary`] pairs the MySQL JSON type code of the top-level value with its
//! compact serialized text.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{TypeError, TypeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum JsonTypeCode {
    Object = 0x01,
    Array = 0x03,
    /// `null`, `true` and `false`.
    Literal = 0x04,
    Int64 = 0x09,
    Uint64 = 0x0a,
    Float64 = 0x0b,
    String = 0x0c,
}

impl JsonTypeCode {
    fn of(value: &JsonValue) -> Self {
        match value {
            JsonValue::Object(_) => JsonTypeCode::Object,
            JsonValue::Array(_) => JsonTypeCode::Array,
            JsonValue::Null | JsonValue::Bool(_) => JsonTypeCode::Literal,
            JsonValue::Number(n) if n.is_i64() => JsonTypeCode::Int64,
            JsonValue::Number(n) if n.is_u64() => JsonTypeCode::Uint64,
            JsonValue::Number(_) => JsonTypeCode::Float64,
            JsonValue::String(_) => JsonTypeCode::String,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonBinary {
    type_code: JsonTypeCode,
    value: Vec<u8>,
}

impl JsonBinary {
    pub fn from_value(value: &JsonValue) -> Self {
        Self {
            type_code: JsonTypeCode::of(value),
            value: value.to_string().into_bytes(),
        }
    }

    /// Parses JSON text.
    ///
    /// ```
    /// use datum_types::{JsonBinary, JsonTypeCode};
    ///
    /// let json = JsonBinary::parse(r#"{ "a": [1, 2] }"#).unwrap();
    /// assert_eq!(json.type_code(), JsonTypeCode::Object);
    /// assert_eq!(json.to_string(), r#"{"a":[1,2]}"#);
    /// ```
    pub fn parse(text: &str) -> TypeResult<Self> {
        let value: JsonValue =
            serde_json::from_str(text).map_err(|_| TypeError::malformed("json", text))?;
        Ok(Self::from_value(&value))
    }

    pub fn type_code(&self) -> JsonTypeCode {
        self.type_code
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.value
    }

    pub fn to_value(&self) -> TypeResult<JsonValue> {
        serde_json::from_slice(&self.value).map_err(|_| TypeError::Representation("json"))
    }
}

impl From<JsonValue> for JsonBinary {
    fn from(value: JsonValue) -> Self {
        Self::from_value(&value)
    }
}

impl fmt::Display for JsonBinary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.value))
    }
}
