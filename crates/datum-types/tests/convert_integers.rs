use datum_types::{convert, ConvertContext, Datum, FieldKind, FieldType, Lossy, Outcome};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn to_int(input: Datum, kind: FieldKind, unsigned: bool) -> Lossy<Datum> {
    let mut target = FieldType::new(kind);
    target.unsigned = unsigned;
    convert(&input, &target, &ConvertContext::default()).unwrap()
}

fn text(out: &Lossy<Datum>) -> String {
    out.value.to_text().unwrap()
}

#[test]
fn signed_bounds_per_width() {
    let cases: [(FieldKind, i64, i64); 5] = [
        (FieldKind::Tiny, -128, 127),
        (FieldKind::Short, i16::MIN.into(), i16::MAX.into()),
        (FieldKind::Int24, -(1 << 23), (1 << 23) - 1),
        (FieldKind::Long, i32::MIN.into(), i32::MAX.into()),
        (FieldKind::Longlong, i64::MIN, i64::MAX),
    ];
    for (kind, min, max) in cases {
        let at_min = to_int(Datum::from(min), kind, false);
        assert_eq!((at_min.value.as_i64(), at_min.outcome), (Some(min), Outcome::Exact));
        let at_max = to_int(Datum::from(max), kind, false);
        assert_eq!((at_max.value.as_i64(), at_max.outcome), (Some(max), Outcome::Exact));

        if kind != FieldKind::Longlong {
            let below = to_int(Datum::from(min - 1), kind, false);
            assert_eq!((below.value.as_i64(), below.outcome), (Some(min), Outcome::Overflow));
            let above = to_int(Datum::from(max + 1), kind, false);
            assert_eq!((above.value.as_i64(), above.outcome), (Some(max), Outcome::Overflow));
        }
    }
}

#[test]
fn unsigned_bounds_per_width() {
    let cases: [(FieldKind, u64); 5] = [
        (FieldKind::Tiny, 255),
        (FieldKind::Short, 65_535),
        (FieldKind::Int24, (1 << 24) - 1),
        (FieldKind::Long, u32::MAX.into()),
        (FieldKind::Longlong, u64::MAX),
    ];
    for (kind, max) in cases {
        let zero = to_int(Datum::from(0), kind, true);
        assert_eq!((zero.value.as_u64(), zero.outcome), (Some(0), Outcome::Exact));
        let at_max = to_int(Datum::from(max), kind, true);
        assert_eq!((at_max.value.as_u64(), at_max.outcome), (Some(max), Outcome::Exact));

        let negative = to_int(Datum::from(-1), kind, true);
        assert_eq!((negative.value.as_u64(), negative.outcome), (Some(0), Outcome::Overflow));
        if kind != FieldKind::Longlong {
            let above = to_int(Datum::from(max + 1), kind, true);
            assert_eq!((above.value.as_u64(), above.outcome), (Some(max), Outcome::Overflow));
        }
    }
}

#[test]
fn wide_inputs_clamp_to_the_nearest_bound() {
    let out = to_int(Datum::from(u64::MAX), FieldKind::Long, false);
    assert_eq!((text(&out), out.outcome), ("2147483647".to_string(), Outcome::Overflow));

    let out = to_int(Datum::from("1343545435346432587475"), FieldKind::Long, false);
    assert_eq!((text(&out), out.outcome), ("2147483647".to_string(), Outcome::Overflow));

    let out = to_int(Datum::from(i64::MIN as f64 * 1.1), FieldKind::Longlong, false);
    assert_eq!((out.value.as_i64(), out.outcome), (Some(i64::MIN), Outcome::Overflow));

    let out = to_int(Datum::from(i64::MAX as f64 * 1.1), FieldKind::Longlong, false);
    assert_eq!((out.value.as_i64(), out.outcome), (Some(i64::MAX), Outcome::Overflow));

    let out = to_int(Datum::from(u64::MAX as f64 * 1.1), FieldKind::Longlong, true);
    assert_eq!((out.value.as_u64(), out.outcome), (Some(u64::MAX), Outcome::Overflow));
}

#[test]
fn float_equal_to_the_bound_is_exact() {
    let out = to_int(Datum::from(2f64.powi(63) - 1.0), FieldKind::Longlong, false);
    assert_eq!((out.value.as_i64(), out.outcome), (Some(i64::MAX), Outcome::Exact));
}

#[test]
fn integers_from_strings() {
    let cases = [
        ("\t  234  ", "234", Outcome::Exact),
        (" 2.35e3  ", "2350", Outcome::Exact),
        (" 2.e3  ", "2000", Outcome::Exact),
        (" -2.e3  ", "-2000", Outcome::Exact),
        (" 2e2  ", "200", Outcome::Exact),
        (" 0.002e3  ", "2", Outcome::Exact),
        (" .002e3  ", "2", Outcome::Exact),
        (" 20e-2  ", "0", Outcome::Exact),
        (" -20e-2  ", "0", Outcome::Exact),
        (" +2.51 ", "3", Outcome::Exact),
        (" -9999.5 ", "-10000", Outcome::Exact),
        (" 999.4", "999", Outcome::Exact),
        (" -3.58", "-4", Outcome::Exact),
        (" 1a ", "1", Outcome::Truncated),
        (" +1+ ", "1", Outcome::Truncated),
        ("xx", "0", Outcome::Truncated),
    ];
    for (input, expected, outcome) in cases {
        let out = to_int(Datum::from(input), FieldKind::Long, false);
        assert_eq!((text(&out), out.outcome), (expected.to_string(), outcome), "input={input:?}");
    }
}

#[test]
fn float_like_strings_keep_the_literal_outcome() {
    let out = to_int(Datum::from("1e999"), FieldKind::Longlong, false);
    assert_eq!((out.value.as_i64(), out.outcome), (Some(i64::MAX), Outcome::Overflow));
    let out = to_int(Datum::from("-1e999"), FieldKind::Longlong, false);
    assert_eq!((out.value.as_i64(), out.outcome), (Some(i64::MIN), Outcome::Overflow));
    let out = to_int(Datum::from("1e999"), FieldKind::Longlong, true);
    assert_eq!((out.value.as_u64(), out.outcome), (Some(u64::MAX), Outcome::Overflow));

    let long_fraction = format!("7.{}", "4".repeat(100));
    let out = to_int(Datum::from(long_fraction.as_str()), FieldKind::Long, false);
    assert_eq!((text(&out), out.outcome), ("7".to_string(), Outcome::Truncated));

    let out = to_int(Datum::from("12.5e1abc"), FieldKind::Long, false);
    assert_eq!((text(&out), out.outcome), ("125".to_string(), Outcome::Truncated));
}

#[test]
fn integers_from_floats_round_half_away_from_zero() {
    let cases = [(234.5456, "235"), (-23.45, "-23"), (2.5, "3"), (-2.5, "-3")];
    for (input, expected) in cases {
        let out = to_int(Datum::from(input), FieldKind::Long, false);
        assert_eq!(text(&out), expected, "input={input}");
        assert!(out.outcome.is_exact());
    }
    let out = to_int(Datum::from(234.5456), FieldKind::Longlong, true);
    assert_eq!(out.value.as_u64(), Some(235));
    let out = to_int(Datum::from(-23.45), FieldKind::Longlong, true);
    assert_eq!((out.value.as_u64(), out.outcome), (Some(0), Outcome::Overflow));
}

proptest! {
    #[test]
    fn clamping_is_idempotent_and_in_range(v in any::<i64>()) {
        let target = FieldType::new(FieldKind::Short);
        let ctx = ConvertContext::default();
        let once = convert(&Datum::from(v), &target, &ctx).unwrap();
        let clamped = once.value.as_i64().unwrap();
        prop_assert!((i64::from(i16::MIN)..=i64::from(i16::MAX)).contains(&clamped));
        prop_assert_eq!(once.outcome.is_exact(), clamped == v);

        let twice = convert(&once.value, &target, &ctx).unwrap();
        prop_assert_eq!(twice.value, once.value);
        prop_assert!(twice.outcome.is_exact());
    }

    #[test]
    fn unsigned_targets_never_go_negative(v in any::<i64>()) {
        let target = FieldType::new(FieldKind::Long).unsigned();
        let out = convert(&Datum::from(v), &target, &ConvertContext::default()).unwrap();
        let value = out.value.as_u64().unwrap();
        prop_assert!(value <= u64::from(u32::MAX));
        if v < 0 {
            prop_assert_eq!(value, 0);
            prop_assert_eq!(out.outcome, Outcome::Overflow);
        }
    }
}
