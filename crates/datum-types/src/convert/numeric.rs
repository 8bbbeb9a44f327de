//! Integer, floating-point and `DECIMAL` targets.

use serde_json::Value as JsonValue;

use super::number::{clamp_i128, f32_to_f64, round_float_to, str_to_float, str_to_i128};
use super::{payload_text, unsupported};
use crate::datum::{Datum, Value};
use crate::decimal::{Decimal, RoundMode, MAX_PRECISION, MAX_SCALE};
use crate::error::{Lossy, Outcome, TypeError, TypeResult};
use crate::field_type::{FieldKind, FieldType};
use crate::json::JsonBinary;

/// Top-level scalar of a JSON document, as seen by numeric targets.
pub(super) enum JsonScalar {
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Other,
}

pub(super) fn json_scalar(json: &JsonBinary) -> TypeResult<JsonScalar> {
    Ok(match json.to_value()? {
        JsonValue::Number(n) => {
            if let Some(v) = n.as_i64() {
                JsonScalar::Int(v)
            } else if let Some(v) = n.as_u64() {
                JsonScalar::Uint(v)
            } else {
                n.as_f64().map_or(JsonScalar::Other, JsonScalar::Float)
            }
        }
        JsonValue::Bool(b) => JsonScalar::Int(i64::from(b)),
        JsonValue::String(s) => JsonScalar::Text(s),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => JsonScalar::Other,
    })
}

/// Integer view of an input before range clamping.
enum Integral {
    Exact(Lossy<i128>),
    /// Floats are rounded against the target bounds so that a value equal to a
    /// bound after `f64` rounding stays exact.
    Float(f64),
}

fn integral_of(input: &Datum, target: &FieldType) -> TypeResult<Integral> {
    let exact = |v: i128| Integral::Exact(Lossy::exact(v));
    Ok(match input.value() {
        Value::Int64(v) => exact((*v).into()),
        Value::Uint64(v) => exact((*v).into()),
        Value::Float32(v) => Integral::Float(f32_to_f64(*v)),
        Value::Float64(v) => Integral::Float(*v),
        Value::String(b) | Value::Bytes(b) => Integral::Exact(str_to_i128(&payload_text(b))),
        Value::Decimal(d) => exact(d.round_to_i128()),
        Value::Duration(d) => exact(d.round_frac(0).to_number().round_to_i128()),
        Value::Time(t) => exact(t.round_frac(0)?.to_number().round_to_i128()),
        Value::Enum(e) => exact(e.value.into()),
        Value::Set(s) => exact(s.value.into()),
        Value::BinaryLiteral(b) | Value::Bit(b) => Integral::Exact(b.to_u64().map(i128::from)),
        Value::Json(j) => match json_scalar(j)? {
            JsonScalar::Int(v) => exact(v.into()),
            JsonScalar::Uint(v) => exact(v.into()),
            JsonScalar::Float(f) => Integral::Float(f),
            JsonScalar::Text(s) => Integral::Exact(str_to_i128(&s)),
            JsonScalar::Other => Integral::Exact(Lossy::new(0, Outcome::Truncated)),
        },
        _ => return Err(unsupported(input, target)),
    })
}

fn clamp_float(f: f64, min: i128, max: i128) -> Lossy<i128> {
    if f.is_nan() {
        return Lossy::new(0, Outcome::Truncated);
    }
    let rounded = f.round();
    if rounded == max as f64 {
        return Lossy::exact(max);
    }
    if rounded == min as f64 {
        return Lossy::exact(min);
    }
    clamp_i128(rounded as i128, min, max)
}

fn integer_bounds(target: &FieldType) -> TypeResult<(i128, i128)> {
    let bounds = if target.unsigned {
        target.kind.unsigned_upper().map(|max| (0, i128::from(max)))
    } else {
        target
            .kind
            .signed_bounds()
            .map(|(min, max)| (i128::from(min), i128::from(max)))
    };
    bounds.ok_or(TypeError::Unsupported {
        from: "integer",
        to: target.kind.type_str(),
    })
}

/// Clamps to the target's width and signedness, nearest bound first.
pub(super) fn to_integer(input: &Datum, target: &FieldType) -> TypeResult<Lossy<Datum>> {
    let (min, max) = integer_bounds(target)?;
    let clamped = match integral_of(input, target)? {
        Integral::Float(f) => clamp_float(f, min, max),
        Integral::Exact(raw) => {
            let clamped = clamp_i128(raw.value, min, max);
            clamped.with_outcome(raw.outcome)
        }
    };
    Ok(clamped.map(|v| {
        if target.unsigned {
            Datum::from_u64(v as u64)
        } else {
            Datum::from_i64(v as i64)
        }
    }))
}

fn float_of(input: &Datum, target: &FieldType) -> TypeResult<Lossy<f64>> {
    Ok(match input.value() {
        Value::Int64(v) => Lossy::exact(*v as f64),
        Value::Uint64(v) => Lossy::exact(*v as f64),
        Value::Float32(v) => Lossy::exact(f32_to_f64(*v)),
        Value::Float64(v) => Lossy::exact(*v),
        Value::String(b) | Value::Bytes(b) => str_to_float(&payload_text(b)),
        Value::Decimal(d) => Lossy::exact(d.to_f64()),
        Value::Duration(d) => Lossy::exact(d.to_number().to_f64()),
        Value::Time(t) => Lossy::exact(t.to_number().to_f64()),
        Value::Enum(e) => Lossy::exact(e.value as f64),
        Value::Set(s) => Lossy::exact(s.value as f64),
        Value::BinaryLiteral(b) | Value::Bit(b) => b.to_u64().map(|v| v as f64),
        Value::Json(j) => match json_scalar(j)? {
            JsonScalar::Int(v) => Lossy::exact(v as f64),
            JsonScalar::Uint(v) => Lossy::exact(v as f64),
            JsonScalar::Float(f) => Lossy::exact(f),
            JsonScalar::Text(s) => str_to_float(&s),
            JsonScalar::Other => Lossy::new(0.0, Outcome::Truncated),
        },
        _ => return Err(unsupported(input, target)),
    })
}

/// `FLOAT`/`DOUBLE` targets. With both a width and a scale the value is rounded to
/// the scale and clamped to the largest value the width allows.
pub(super) fn to_float(input: &Datum, target: &FieldType) -> TypeResult<Lossy<Datum>> {
    let Lossy {
        value: original,
        mut outcome,
    } = float_of(input, target)?;
    let mut f = original;

    if let (Some(flen), Some(scale)) = (target.flen, target.decimal) {
        if flen >= scale {
            let (flen, scale) = (flen as i32, scale as i32);
            let max = 10f64.powi(flen - scale) - 10f64.powi(-scale);
            let rounded = round_float_to(f, scale);
            f = if rounded > max {
                outcome = outcome.merge(Outcome::Overflow);
                max
            } else if rounded < -max {
                outcome = outcome.merge(Outcome::Overflow);
                -max
            } else {
                rounded
            };
        }
    }
    if target.unsigned && f < 0.0 {
        f = 0.0;
        outcome = outcome.merge(Outcome::Overflow);
    }

    let datum = if target.kind == FieldKind::Float {
        let limit = f64::from(f32::MAX);
        if f > limit || f < -limit {
            f = f.clamp(-limit, limit);
            outcome = outcome.merge(Outcome::Overflow);
        }
        let narrowed = f as f32;
        if narrowed != original as f32 {
            outcome = outcome.merge(Outcome::Truncated);
        }
        Datum::from_f32(narrowed)
    } else {
        if f != original && !original.is_nan() {
            outcome = outcome.merge(Outcome::Truncated);
        }
        Datum::from_f64(f)
    };
    Ok(Lossy::new(datum, outcome))
}

fn decimal_of(input: &Datum, target: &FieldType) -> TypeResult<Lossy<Decimal>> {
    Ok(match input.value() {
        Value::Int64(v) => Lossy::exact(Decimal::from_i64(*v)),
        Value::Uint64(v) => Lossy::exact(Decimal::from_u64(*v)),
        Value::Float32(v) => Decimal::from_f64(f32_to_f64(*v))?,
        Value::Float64(v) => Decimal::from_f64(*v)?,
        Value::String(b) | Value::Bytes(b) => Decimal::from_str(&payload_text(b))?,
        Value::Decimal(d) => Lossy::exact(d.clone()),
        Value::Duration(d) => Lossy::exact(d.to_number()),
        Value::Time(t) => Lossy::exact(t.to_number()),
        Value::Enum(e) => Lossy::exact(Decimal::from_u64(e.value)),
        Value::Set(s) => Lossy::exact(Decimal::from_u64(s.value)),
        Value::BinaryLiteral(b) | Value::Bit(b) => b.to_u64().map(Decimal::from_u64),
        Value::Json(j) => match json_scalar(j)? {
            JsonScalar::Int(v) => Lossy::exact(Decimal::from_i64(v)),
            JsonScalar::Uint(v) => Lossy::exact(Decimal::from_u64(v)),
            JsonScalar::Float(f) => Decimal::from_f64(f)?,
            JsonScalar::Text(s) => Decimal::from_str(&s)?,
            JsonScalar::Other => Lossy::new(Decimal::zero(), Outcome::Truncated),
        },
        _ => return Err(unsupported(input, target)),
    })
}

/// `DECIMAL(flen, scale)` targets: round half-even to the scale, then clamp to the
/// all-nines value when the integer part is too wide. A width without a scale
/// means scale 0.
pub(super) fn to_decimal(input: &Datum, target: &FieldType) -> TypeResult<Lossy<Datum>> {
    let scale = target.decimal.or(target.flen.map(|_| 0));
    if let Some(flen) = target.flen.filter(|flen| *flen > MAX_PRECISION) {
        return Err(TypeError::out_of_range("DECIMAL precision", flen));
    }
    if let Some(scale) = scale.filter(|scale| *scale > MAX_SCALE) {
        return Err(TypeError::out_of_range("DECIMAL scale", scale));
    }
    if let (Some(flen), Some(scale)) = (target.flen, scale) {
        if flen < scale {
            return Err(TypeError::malformed(
                "DECIMAL",
                format!("M={flen} is smaller than D={scale}"),
            ));
        }
    }
    let Lossy {
        value: mut dec,
        mut outcome,
    } = decimal_of(input, target)?;

    if target.unsigned && dec.is_negative() {
        dec = Decimal::zero();
        outcome = outcome.merge(Outcome::Overflow);
    }
    if let Some(scale) = scale {
        let rounded = dec.round(scale as i32, RoundMode::HalfEven);
        outcome = outcome.merge(rounded.outcome);
        dec = rounded.value;
    }
    if let (Some(flen), Some(scale)) = (target.flen, scale) {
        if dec.int_digits() > flen - scale {
            dec = Decimal::max_value(dec.is_negative(), flen, scale);
            outcome = outcome.merge(Outcome::Overflow);
        }
    }

    let mut datum = Datum::from_decimal(dec);
    if let Some(scale) = scale {
        datum.set_frac(scale as u16);
    }
    Ok(Lossy::new(datum, outcome))
}
