//! `ENUM`, `SET`, `BIT` and `JSON` targets.

use super::numeric::{json_scalar, to_integer, JsonScalar};
use super::payload_text;
use crate::binary_literal::BinaryLiteral;
use crate::datum::{Datum, Value};
use crate::enum_set::{Enum, Set};
use crate::error::{Lossy, Outcome, TypeError, TypeResult};
use crate::field_type::{FieldKind, FieldType};
use crate::json::JsonBinary;

/// Member text of inputs that select enum/set members by name.
fn member_name(input: &Datum) -> TypeResult<Option<String>> {
    Ok(match input.value() {
        Value::String(b) | Value::Bytes(b) => Some(payload_text(b).into_owned()),
        Value::Enum(e) => Some(e.name.clone()),
        Value::Set(s) => Some(s.name.clone()),
        Value::Json(j) => match json_scalar(j)? {
            JsonScalar::Text(s) => Some(s),
            _ => None,
        },
        _ => None,
    })
}

fn as_integer(input: &Datum, unsigned: bool) -> TypeResult<Lossy<i128>> {
    let mut target = FieldType::new(FieldKind::Longlong);
    target.unsigned = unsigned;
    let converted = to_integer(input, &target)?;
    Ok(converted.map(|d| match d.value() {
        Value::Uint64(v) => i128::from(*v),
        Value::Int64(v) => i128::from(*v),
        _ => 0,
    }))
}

/// Names must match a member exactly. Numbers select by ordinal; an ordinal
/// outside the member list yields the empty enum with [`Outcome::Truncated`].
pub(super) fn to_enum(input: &Datum, target: &FieldType) -> TypeResult<Lossy<Datum>> {
    if let Some(name) = member_name(input)? {
        let member = Enum::parse_name(&target.elems, &name)?;
        return Ok(Lossy::exact(Datum::from_enum(member)));
    }
    let ordinal = as_integer(input, true)?;
    let member = u64::try_from(ordinal.value)
        .ok()
        .and_then(|n| Enum::parse_value(&target.elems, n).ok());
    Ok(match member {
        Some(member) => Lossy::new(Datum::from_enum(member), ordinal.outcome),
        None => Lossy::new(Datum::from_enum(Enum::default()), Outcome::Truncated),
    })
}

pub(super) fn to_set(input: &Datum, target: &FieldType) -> TypeResult<Lossy<Datum>> {
    if let Some(name) = member_name(input)? {
        let members = Set::parse_name(&target.elems, &name)?;
        return Ok(Lossy::exact(Datum::from_set(members)));
    }
    let mask = as_integer(input, false)?;
    let mask_value =
        u64::try_from(mask.value).map_err(|_| TypeError::out_of_range("set", mask.value))?;
    let members = Set::parse_value(&target.elems, mask_value)?;
    Ok(Lossy::new(Datum::from_set(members), mask.outcome))
}

/// Strings are read as big-endian bit patterns, everything else as an unsigned
/// integer. The value must be non-negative and fit in `flen` bits (64 when
/// unspecified).
pub(super) fn to_bit(input: &Datum, target: &FieldType) -> TypeResult<Lossy<Datum>> {
    let flen = target.flen.unwrap_or(64);
    let value = match input.value() {
        Value::String(b) | Value::Bytes(b) => {
            let value = BinaryLiteral::new(b.clone()).to_u64();
            if value.outcome == Outcome::Overflow {
                return Err(TypeError::out_of_range("bit", BinaryLiteral::new(b.clone())));
            }
            value
        }
        _ => {
            let signed = as_integer(input, false)?;
            if signed.value < 0 {
                return Err(TypeError::out_of_range("bit", signed.value));
            }
            as_integer(input, true)?.map(|v| v as u64)
        }
    };
    if flen < 64 && value.value >= 1u64 << flen {
        return Err(TypeError::out_of_range("bit", value.value));
    }
    let width = (flen as usize).div_ceil(8).clamp(1, 8);
    let literal = BinaryLiteral::from_u64(value.value, Some(width))?;
    Ok(Lossy::new(Datum::from_bit(literal), value.outcome))
}

pub(super) fn to_json(input: &Datum) -> TypeResult<Lossy<Datum>> {
    let json = match input.value() {
        Value::String(b) | Value::Bytes(b) => JsonBinary::parse(&payload_text(b))?,
        _ => input.to_json()?,
    };
    Ok(Lossy::exact(Datum::from_json(json)))
}
