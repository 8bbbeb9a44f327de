use std::cmp::Ordering;

use datum_types::{
    datums_to_str_no_err, datums_to_string, BinaryLiteral, Datum, DatumKind, Decimal, Duration,
    Enum, Set,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn renders_text_for_every_value_kind() {
    let cases: Vec<(Datum, &str)> = vec![
        (Datum::from("0"), "0"),
        (Datum::from(true), "1"),
        (Datum::from("false"), "false"),
        (Datum::from(0i32), "0"),
        (Datum::from(0i64), "0"),
        (Datum::from(0u64), "0"),
        (Datum::from(1.6f32), "1.6"),
        (Datum::from(-0.6f64), "-0.6"),
        (Datum::from(vec![1u8]), "\x01"),
        (
            Datum::from(BinaryLiteral::from_u64(0x4D79_5351_4C, None).unwrap()),
            "MySQL",
        ),
        (Datum::from(BinaryLiteral::from_u64(0x41, None).unwrap()), "A"),
        (Datum::from(Enum::new("a", 1)), "a"),
        (Datum::from(Set::new("a", 1)), "a"),
        (
            Datum::from(Duration::parse("11:11:11.999999", 6).unwrap().value),
            "11:11:11.999999",
        ),
    ];
    for (datum, expected) in cases {
        assert_eq!(datum.to_text().unwrap(), expected, "kind={}", datum.kind());
    }
}

#[test]
fn cells_without_text_form_fail_to_render() {
    for datum in [Datum::null(), Datum::min_not_null(), Datum::max_value(), Datum::from_raw(vec![0])] {
        assert!(datum.to_text().is_err(), "kind={}", datum.kind());
    }
}

#[test]
fn rows_render_with_parentheses_when_wide() {
    let row = [Datum::from(1), Datum::from("x"), Datum::null()];
    assert_eq!(datums_to_string(&row, true).unwrap(), "(1, x, NULL)");
    assert!(datums_to_string(&row, false).is_err());
    assert_eq!(datums_to_string(&row[..1], false).unwrap(), "1");
    assert_eq!(
        datums_to_string(&[Datum::min_not_null(), Datum::max_value()], true).unwrap(),
        "(-inf, +inf)"
    );
    assert_eq!(datums_to_str_no_err(&[Datum::from_raw(vec![1])]), "");
}

#[test]
fn constructors_fill_auxiliary_fields() {
    let bytes = Datum::from_bytes(vec![1, 2]);
    assert_eq!((bytes.kind(), bytes.collation()), (DatumKind::Bytes, 63));

    let dec = Datum::from(Decimal::from_str("1.250").unwrap().value);
    assert_eq!((dec.kind(), dec.frac()), (DatumKind::Decimal, 3));

    let dur = Datum::from(Duration::zero(4));
    assert_eq!((dur.kind(), dur.frac()), (DatumKind::Duration, 4));
}

#[test]
fn null_and_sentinels_bracket_every_value() {
    let values = [Datum::from(i64::MIN), Datum::from("a"), Datum::from(-1e300)];
    for v in &values {
        assert_eq!(Datum::null().compare(v), Some(Ordering::Less));
        assert_eq!(Datum::min_not_null().compare(v), Some(Ordering::Less));
        assert_eq!(Datum::max_value().compare(v), Some(Ordering::Greater));
    }
    assert_eq!(Datum::null().compare(&Datum::min_not_null()), Some(Ordering::Less));
    assert_eq!(Datum::null().compare(&Datum::null()), Some(Ordering::Equal));
}

#[test]
fn numeric_kinds_compare_across_representations() {
    let cases = [
        (Datum::from(-1i64), Datum::from(u64::MAX), Ordering::Less),
        (Datum::from(u64::MAX), Datum::from(i64::MAX), Ordering::Greater),
        (Datum::from(2i64), Datum::from(2.0f64), Ordering::Equal),
        (Datum::from(1.5f32), Datum::from(1.25f64), Ordering::Greater),
        (
            Datum::from(Decimal::from_str("10.01").unwrap().value),
            Datum::from(10i64),
            Ordering::Greater,
        ),
    ];
    for (a, b, expected) in cases {
        assert_eq!(a.compare(&b), Some(expected), "{a:?} vs {b:?}");
    }
    assert_eq!(Datum::from(1).compare(&Datum::from(Enum::new("a", 1))), None);
}

proptest! {
    #[test]
    fn integer_comparison_matches_native_order(a in any::<i64>(), b in any::<u64>()) {
        let expected = i128::from(a).cmp(&i128::from(b));
        prop_assert_eq!(Datum::from(a).compare(&Datum::from(b)), Some(expected));
        prop_assert_eq!(Datum::from(b).compare(&Datum::from(a)), Some(expected.reverse()));
    }
}
