//! The conversion engine.
//!
//! [`convert`] coerces a [`Datum`] into the kind described by a [`FieldType`].
//! Lossy but usable results come back with a non-exact [`Outcome`](crate::Outcome);
//! only inputs that cannot produce any value fail with a [`TypeError`].

mod domain;
pub mod number;
mod numeric;
mod temporal;
mod text;

use crate::config::ConvertContext;
use crate::datum::{Datum, Value};
use crate::error::{Lossy, TypeError, TypeResult};
use crate::field_type::{FieldKind, FieldType};

/// Converts `input` into the column type `target`.
///
/// `NULL` converts to `NULL` for every target. Raw, opaque and sentinel cells
/// cannot be converted.
///
/// ```
/// use datum_types::{convert, ConvertContext, Datum, FieldKind, FieldType, Outcome};
///
/// let ctx = ConvertContext::default();
/// let target = FieldType::new(FieldKind::Tiny);
/// let out = convert(&Datum::from(300), &target, &ctx).unwrap();
/// assert_eq!(out.value.as_i64(), Some(127));
/// assert_eq!(out.outcome, Outcome::Overflow);
/// ```
pub fn convert(input: &Datum, target: &FieldType, ctx: &ConvertContext) -> TypeResult<Lossy<Datum>> {
    log::trace!("converting {} datum to {}", input.kind(), target.sql_string());
    match input.value() {
        Value::Null => return Ok(Lossy::exact(Datum::null())),
        Value::Raw(_) | Value::Interface(_) | Value::MinNotNull | Value::MaxValue => {
            return Err(unsupported(input, target));
        }
        _ => {}
    }
    match target.kind {
        FieldKind::Tiny
        | FieldKind::Short
        | FieldKind::Int24
        | FieldKind::Long
        | FieldKind::Longlong => numeric::to_integer(input, target),
        FieldKind::Float | FieldKind::Double => numeric::to_float(input, target),
        FieldKind::NewDecimal => numeric::to_decimal(input, target),
        FieldKind::String
        | FieldKind::VarString
        | FieldKind::Varchar
        | FieldKind::TinyBlob
        | FieldKind::MediumBlob
        | FieldKind::Blob
        | FieldKind::LongBlob => text::to_string(input, target, ctx),
        FieldKind::Date | FieldKind::Datetime | FieldKind::Timestamp => {
            temporal::to_time(input, target, ctx)
        }
        FieldKind::Duration => temporal::to_duration(input, target),
        FieldKind::Year => temporal::to_year(input, target, ctx),
        FieldKind::Enum => domain::to_enum(input, target),
        FieldKind::Set => domain::to_set(input, target),
        FieldKind::Bit => domain::to_bit(input, target),
        FieldKind::Json => domain::to_json(input),
    }
}

impl Datum {
    /// Method form of [`convert`].
    pub fn convert_to(&self, target: &FieldType, ctx: &ConvertContext) -> TypeResult<Lossy<Datum>> {
        convert(self, target, ctx)
    }
}

pub(crate) fn unsupported(input: &Datum, target: &FieldType) -> TypeError {
    TypeError::Unsupported {
        from: input.kind().name(),
        to: target.kind.type_str(),
    }
}

/// Lossy UTF-8 view of a character or binary payload.
pub(crate) fn payload_text(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
