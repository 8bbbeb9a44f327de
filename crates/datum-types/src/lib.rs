//! MySQL-compatible scalar values and the conversion engine that coerces them into
//! column types.
//!
//! The crate is organised leaf-first:
//!
//! - [`time`] and [`decimal`] are the temporal and fixed-point primitives.
//! - [`Datum`] is the tagged value cell holding one value of any supported kind.
//! - [`convert()`] coerces a [`Datum`] into the kind described by a [`FieldType`],
//!   reporting lossy conversions through [`Outcome`] instead of failing.
//!
//! Every operation is synchronous and free of shared mutable state; the only
//! process-wide data are constant tables (integer bounds and the charset tables in
//! `datum-charset`).

#![forbid(unsafe_code)]

pub mod binary_literal;
pub mod config;
pub mod convert;
pub mod datum;
pub mod decimal;
pub mod enum_set;
pub mod error;
pub mod field_type;
pub mod json;
pub mod time;

pub use binary_literal::BinaryLiteral;
pub use config::{ConvertConfig, ConvertContext};
pub use convert::convert;
pub use datum::{copy_row, datums_to_str_no_err, datums_to_string, Datum, DatumKind, Opaque, Value};
pub use decimal::{Decimal, RoundMode};
pub use enum_set::{Enum, Set};
pub use error::{Lossy, Outcome, TypeError, TypeResult};
pub use field_type::{FieldKind, FieldType};
pub use json::{JsonBinary, JsonTypeCode};
pub use time::{Duration, Time, TimeKind, TimeUnit};
