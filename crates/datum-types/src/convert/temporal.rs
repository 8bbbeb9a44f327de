//! `DATE`/`DATETIME`/`TIMESTAMP`, `TIME` and `YEAR` targets.

use std::cmp::Ordering;

use serde_json::Value as JsonValue;

use super::number::{f32_to_f64, scan_number, str_to_int, trim_ascii};
use super::{payload_text, unsupported};
use crate::config::ConvertContext;
use crate::datum::{Datum, Value};
use crate::decimal::RoundMode;
use crate::error::{Lossy, Outcome, TypeError, TypeResult};
use crate::field_type::FieldType;
use crate::json::JsonBinary;
use crate::time::{adjust_year, truncate_overflow_time, Duration, Time, TimeKind};

fn u64_to_i64(v: u64, kind: &'static str) -> TypeResult<i64> {
    i64::try_from(v).map_err(|_| TypeError::out_of_range(kind, v))
}

fn json_text(json: &JsonBinary, kind: &'static str) -> TypeResult<JsonValue> {
    match json.to_value()? {
        value @ (JsonValue::String(_) | JsonValue::Number(_)) => Ok(value),
        _ => Err(TypeError::malformed(kind, json.to_string())),
    }
}

/// Re-tags and re-rounds a time value; dropping digits or the time of day is
/// reported as [`Outcome::Truncated`].
fn retag(t: Time, kind: TimeKind, fsp: u8) -> TypeResult<Lossy<Time>> {
    let out = t.convert(kind)?.round_frac(fsp)?;
    if kind == TimeKind::Timestamp {
        out.check_timestamp()?;
    }
    let outcome = if out.compare(&t) == Ordering::Equal {
        Outcome::Exact
    } else {
        Outcome::Truncated
    };
    Ok(Lossy::new(out, outcome))
}

/// Re-rounds a duration to `fsp`, clamping a carry past the hour limit.
fn reround(d: Duration, fsp: u8) -> Lossy<Duration> {
    let rounded = d.round_frac(fsp);
    let outcome = if rounded.nanos() == d.nanos() {
        Outcome::Exact
    } else {
        Outcome::Truncated
    };
    truncate_overflow_time(rounded.nanos())
        .with_outcome(outcome)
        .map(|nanos| Duration::new(nanos, fsp))
}

pub(super) fn to_time(
    input: &Datum,
    target: &FieldType,
    ctx: &ConvertContext,
) -> TypeResult<Lossy<Datum>> {
    let kind = target
        .kind
        .time_kind()
        .ok_or_else(|| unsupported(input, target))?;
    let fsp = target.fsp();
    let exact = Lossy::exact;
    let t = match input.value() {
        Value::String(b) | Value::Bytes(b) => exact(Time::parse(&payload_text(b), kind, fsp)?),
        Value::Int64(v) => exact(Time::from_number(*v, kind, fsp)?),
        Value::Uint64(v) => exact(Time::from_number(u64_to_i64(*v, kind.name())?, kind, fsp)?),
        Value::Float32(_) | Value::Float64(_) | Value::Decimal(_) => {
            exact(Time::parse_number_text(&input.to_text()?, kind, fsp)?)
        }
        Value::Time(t) => retag(*t, kind, fsp)?,
        Value::Duration(d) => retag(d.to_time(ctx.current_date(), kind)?, kind, fsp)?,
        Value::Enum(e) => exact(Time::parse(&e.name, kind, fsp)?),
        Value::Set(s) => exact(Time::parse(&s.name, kind, fsp)?),
        Value::BinaryLiteral(b) | Value::Bit(b) => exact(Time::from_number(
            u64_to_i64(b.to_u64().value, kind.name())?,
            kind,
            fsp,
        )?),
        Value::Json(j) => exact(match json_text(j, kind.name())? {
            JsonValue::String(s) => Time::parse(&s, kind, fsp)?,
            number => Time::parse_number_text(&number.to_string(), kind, fsp)?,
        }),
        _ => return Err(unsupported(input, target)),
    };
    Ok(t.map(Datum::from_time))
}

pub(super) fn to_duration(input: &Datum, target: &FieldType) -> TypeResult<Lossy<Datum>> {
    let fsp = target.fsp();
    let d = match input.value() {
        Value::String(b) | Value::Bytes(b) => Duration::parse(&payload_text(b), fsp)?,
        Value::Int64(v) => Lossy::exact(Duration::from_number(*v, fsp)?),
        Value::Uint64(v) => Lossy::exact(Duration::from_number(u64_to_i64(*v, "time")?, fsp)?),
        Value::Float32(_) | Value::Float64(_) | Value::Decimal(_) => {
            Duration::parse(&input.to_text()?, fsp)?
        }
        Value::Time(t) => reround(t.to_duration(), fsp),
        Value::Duration(d) => reround(*d, fsp),
        Value::Enum(e) => Duration::parse(&e.name, fsp)?,
        Value::Set(s) => Duration::parse(&s.name, fsp)?,
        Value::BinaryLiteral(b) | Value::Bit(b) => {
            Lossy::exact(Duration::from_number(u64_to_i64(b.to_u64().value, "time")?, fsp)?)
        }
        Value::Json(j) => match json_text(j, "time")? {
            JsonValue::String(s) => Duration::parse(&s, fsp)?,
            number => Duration::parse(&number.to_string(), fsp)?,
        },
        _ => return Err(unsupported(input, target)),
    };
    Ok(d.map(Datum::from_duration))
}

/// Year of a string: the numeric prefix, with fewer than four digits windowed
/// and `0`/`00` read as 2000.
fn year_from_str(s: &str) -> TypeResult<Lossy<i64>> {
    let trimmed = trim_ascii(s);
    let prefix = scan_number(trimmed);
    if prefix.is_empty() {
        return Err(TypeError::malformed("year", s));
    }
    let value = str_to_int(trimmed);
    let from_str = prefix.int_digits.len() < 4;
    Ok(Lossy::new(adjust_year(value.value, from_str)?, value.outcome))
}

/// Numeric years round half away from zero and are never windowed as text.
fn year_from_float(f: f64) -> TypeResult<Lossy<i64>> {
    if !f.is_finite() {
        return Err(TypeError::out_of_range("year", f));
    }
    let rounded = f.round();
    let outcome = if rounded == f {
        Outcome::Exact
    } else {
        Outcome::Truncated
    };
    // Saturating cast; anything past the YEAR range is rejected below.
    Ok(Lossy::new(adjust_year(rounded as i64, false)?, outcome))
}

pub(super) fn to_year(
    input: &Datum,
    target: &FieldType,
    ctx: &ConvertContext,
) -> TypeResult<Lossy<Datum>> {
    let number = |v: i64| adjust_year(v, false).map(Lossy::exact);
    let year = match input.value() {
        Value::String(b) | Value::Bytes(b) => year_from_str(&payload_text(b))?,
        Value::Int64(v) => number(*v)?,
        Value::Uint64(v) => number(i64::try_from(*v).unwrap_or(i64::MAX))?,
        Value::Float32(v) => year_from_float(f32_to_f64(*v))?,
        Value::Float64(v) => year_from_float(*v)?,
        Value::Decimal(d) => {
            let rounded = d.round(0, RoundMode::HalfUp);
            let v = rounded.value.to_i64();
            Lossy::new(adjust_year(v.value, false)?, rounded.outcome.merge(v.outcome))
        }
        Value::Time(t) if t.is_zero() => Lossy::exact(0),
        Value::Time(t) => number(i64::from(t.year()))?,
        Value::Duration(_) => Lossy::exact(i64::from(ctx.current_year())),
        Value::Enum(e) => year_from_str(&e.name)?,
        Value::Set(s) => year_from_str(&s.name)?,
        Value::BinaryLiteral(b) | Value::Bit(b) => number(u64_to_i64(b.to_u64().value, "year")?)?,
        Value::Json(j) => match json_text(j, "year")? {
            JsonValue::String(s) => year_from_str(&s)?,
            number_value => year_from_str(&number_value.to_string())?,
        },
        _ => return Err(unsupported(input, target)),
    };
    Ok(year.map(Datum::from_i64))
}
