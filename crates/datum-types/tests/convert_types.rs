use chrono::{TimeZone, Utc};
use datum_types::{
    convert, BinaryLiteral, ConvertContext, Datum, Decimal, Duration, Enum, FieldKind, FieldType, Lossy,
    Opaque, Outcome, Set, Time, TimeKind, TypeError,
};
use pretty_assertions::assert_eq;

fn ctx() -> ConvertContext {
    ConvertContext::default().with_now(Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 0).unwrap())
}

fn run(input: impl Into<Datum>, target: &FieldType) -> Lossy<Datum> {
    convert(&input.into(), target, &ctx()).unwrap()
}

fn text(input: impl Into<Datum>, target: &FieldType) -> (String, Outcome) {
    let out = run(input, target);
    (out.value.to_text().unwrap(), out.outcome)
}

fn owned(s: &str) -> (String, Outcome) {
    (s.to_string(), Outcome::Exact)
}

#[test]
fn string_targets_cut_to_width() {
    let blob = FieldType::new(FieldKind::Blob).with_flen(4).with_charset("utf8");
    let out = run("123456", &blob);
    assert_eq!(out.value.as_str(), Some("1234"));
    assert_eq!(out.outcome, Outcome::Truncated);

    let binary = FieldType::new(FieldKind::String).with_flen(4).with_charset("binary");
    let out = run("12345", &binary);
    assert_eq!(out.value.as_bytes(), Some(&b"1234"[..]));
    assert_eq!(out.outcome, Outcome::Truncated);

    let char3 = FieldType::new(FieldKind::String).with_flen(3);
    assert_eq!(text("12345", &char3), ("123".to_string(), Outcome::Truncated));
}

#[test]
fn string_targets_render_any_kind() {
    let target = FieldType::new(FieldKind::String);
    assert_eq!(text("abc", &target), owned("abc"));
    assert_eq!(text(5678, &target), owned("5678"));
    assert_eq!(text(Duration::zero(0), &target), owned("00:00:00"));
    assert_eq!(
        text(Time::zero(TimeKind::Datetime, 0), &target),
        owned("0000-00-00 00:00:00")
    );
    assert_eq!(text(b"123".to_vec(), &target), owned("123"));
}

#[test]
fn float_targets_round_to_scale_and_clamp() {
    let float52 = FieldType::new(FieldKind::Float).with_flen(5).with_decimal(2);
    let cases = [
        (111.114, 111.11f32, false),
        (999.999, 999.99, true),
        (-999.999, -999.99, true),
        (1111.11, 999.99, true),
        (999.916, 999.92, false),
        (999.914, 999.91, false),
        (999.9155, 999.92, false),
    ];
    for (input, expected, overflow) in cases {
        let out = run(input, &float52);
        assert_eq!(out.value.as_f32(), Some(expected), "input={input}");
        assert_eq!(out.outcome == Outcome::Overflow, overflow, "input={input}");
    }

    let double52 = FieldType::new(FieldKind::Double).with_flen(5).with_decimal(2);
    assert_eq!(run(999.9155, &double52).value.as_f64(), Some(999.92));
}

#[test]
fn float_targets_from_other_kinds() {
    let float = FieldType::new(FieldKind::Float);
    assert_eq!(text("23.523", &float), owned("23.523"));
    assert_eq!(text(123i64, &float), owned("123"));
    assert_eq!(text(123u64, &float), owned("123"));
    assert_eq!(text(123f32, &float), owned("123"));
    assert_eq!(text(123f64, &float), owned("123"));

    let double = FieldType::new(FieldKind::Double);
    assert_eq!(text(" -23.54", &double), owned("-23.54"));
    assert_eq!(text("-23.54a", &double), ("-23.54".to_string(), Outcome::Truncated));
    assert_eq!(text("-23.54e2e", &double), ("-2354".to_string(), Outcome::Truncated));
    assert_eq!(text("+.e", &double), ("0".to_string(), Outcome::Truncated));
    assert_eq!(text("1e+1", &double), owned("10"));
}

#[test]
fn decimal_targets_round_then_clamp() {
    let dec84 = FieldType::new(FieldKind::NewDecimal).with_flen(8).with_decimal(4);
    assert_eq!(text(3.1416, &dec84), owned("3.1416"));
    assert_eq!(text("3.1415926", &dec84), ("3.1416".to_string(), Outcome::Truncated));
    assert_eq!(text("99999", &dec84), ("9999.9999".to_string(), Outcome::Overflow));
    assert_eq!(text("-10000", &dec84), ("-9999.9999".to_string(), Outcome::Overflow));
    assert_eq!(run("3.1415926", &dec84).value.frac(), 4);

    let dec105 = FieldType::new(FieldKind::NewDecimal).with_flen(10).with_decimal(5);
    assert_eq!(text(3.1415926, &dec105), ("3.14159".to_string(), Outcome::Truncated));

    let unbounded = FieldType::new(FieldKind::NewDecimal);
    assert_eq!(text(123, &unbounded), owned("123"));
    assert_eq!(text(123u64, &unbounded), owned("123"));
    assert_eq!(text(123f32, &unbounded), owned("123"));
    assert_eq!(text(123.456, &unbounded), owned("123.456"));
    assert_eq!(text("-123.456", &unbounded), owned("-123.456"));

    let invalid = FieldType::new(FieldKind::NewDecimal).with_flen(2).with_decimal(4);
    assert!(convert(&Datum::from(1), &invalid, &ctx()).is_err());
}

#[test]
fn integer_targets_from_temporal_values_round_first() {
    let longlong = FieldType::new(FieldKind::Longlong);
    assert_eq!(run("100", &longlong).value.as_i64(), Some(100));
    assert_eq!(run("100", &longlong.clone().unsigned()).value.as_u64(), Some(100));

    let nanos = ((12 * 3600 + 59 * 60 + 59) * 1_000 + 555) * 1_000_000;
    let out = run(Duration::new(nanos, 3), &longlong);
    assert_eq!((out.value.as_i64(), out.outcome), (Some(130_000), Outcome::Exact));

    let t = Time::parse("2017-01-01 12:59:59.555", TimeKind::Datetime, 6).unwrap();
    assert_eq!(run(t, &longlong).value.as_i64(), Some(20_170_101_130_000));
}

#[test]
fn bit_targets_pack_big_endian() {
    let bit24 = FieldType::new(FieldKind::Bit).with_flen(24);
    let out = run("100", &bit24);
    assert_eq!(
        out.value.as_binary_literal(),
        Some(&BinaryLiteral::from_u64(3_223_600, Some(3)).unwrap())
    );
    let literal = BinaryLiteral::from_u64(100, None).unwrap();
    let out = run(literal, &bit24);
    assert_eq!(
        out.value.as_binary_literal(),
        Some(&BinaryLiteral::from_u64(100, Some(3)).unwrap())
    );

    let bit1 = FieldType::new(FieldKind::Bit).with_flen(1);
    assert_eq!(
        run(1, &bit1).value.as_binary_literal(),
        Some(&BinaryLiteral::from_u64(1, Some(1)).unwrap())
    );
    assert!(convert(&Datum::from(2), &bit1, &ctx()).is_err());

    let bit0 = FieldType::new(FieldKind::Bit).with_flen(0);
    assert!(convert(&Datum::from(2), &bit0, &ctx()).is_err());

    let bit8 = FieldType::new(FieldKind::Bit).with_flen(8);
    assert!(matches!(
        convert(&Datum::from(-1), &bit8, &ctx()),
        Err(TypeError::OutOfRange { .. })
    ));
}

#[test]
fn year_targets() {
    let year = FieldType::new(FieldKind::Year);
    assert_eq!(run("2015", &year).value.as_i64(), Some(2015));
    assert_eq!(run("2000", &year).value.as_i64(), Some(2000));
    assert_eq!(run(2015, &year).value.as_i64(), Some(2015));
    for bad in [1800, 123, 3000] {
        assert!(
            matches!(convert(&Datum::from(bad), &year, &ctx()), Err(TypeError::OutOfRange { .. })),
            "year {bad}"
        );
    }
    let date = Time::parse("2015-11-11", TimeKind::Date, 0).unwrap();
    assert_eq!(run(date, &year).value.as_i64(), Some(2015));
    assert_eq!(run(Duration::zero(0), &year).value.as_i64(), Some(2024));
}

#[test]
fn year_targets_from_fractional_numbers_round() {
    let year = FieldType::new(FieldKind::Year);
    assert_eq!(text(0.0, &year), owned("0"));
    assert_eq!(text(0f32, &year), owned("0"));
    assert_eq!(text(Decimal::from_str("0").unwrap().value, &year), owned("0"));
    assert_eq!(text(2015.4, &year), ("2015".to_string(), Outcome::Truncated));
    assert_eq!(
        text(Decimal::from_str("2015.5").unwrap().value, &year),
        ("2016".to_string(), Outcome::Truncated)
    );
    assert!(convert(&Datum::from(f64::INFINITY), &year, &ctx()).is_err());
    assert!(convert(&Datum::from(1800.2), &year, &ctx()).is_err());
}

#[test]
fn enum_targets() {
    let target = FieldType::new(FieldKind::Enum).with_elems(["a", "b", "c"]);
    assert_eq!(run("a", &target).value.as_enum(), Some(&Enum::new("a", 1)));
    assert_eq!(run(2, &target).value.as_enum(), Some(&Enum::new("b", 2)));
    assert!(convert(&Datum::from("d"), &target, &ctx()).is_err());

    let out = run(4, &target);
    assert_eq!(out.value.as_enum(), Some(&Enum::default()));
    assert_eq!(out.outcome, Outcome::Truncated);
}

#[test]
fn set_targets() {
    let target = FieldType::new(FieldKind::Set).with_elems(["a", "b", "c"]);
    assert_eq!(run("a", &target).value.as_set(), Some(&Set::new("a", 1)));
    assert_eq!(run(2, &target).value.as_set(), Some(&Set::new("b", 2)));
    assert_eq!(run(3, &target).value.as_set(), Some(&Set::new("a,b", 3)));
    assert!(convert(&Datum::from("d"), &target, &ctx()).is_err());
    assert!(convert(&Datum::from(9), &target, &ctx()).is_err());
}

#[test]
fn duration_targets_keep_requested_precision() {
    let mut target = FieldType::new(FieldKind::Duration).with_decimal(3);
    let out = run("10:11:12.123456", &target);
    assert_eq!(out.value.to_text().unwrap(), "10:11:12.123");

    target.decimal = Some(1);
    let again = convert(&out.value, &target, &ctx()).unwrap();
    assert_eq!(again.value.to_text().unwrap(), "10:11:12.1");
    assert_eq!(again.outcome, Outcome::Truncated);

    target.decimal = Some(6);
    assert_eq!(convert(&again.value, &target, &ctx()).unwrap().outcome, Outcome::Exact);
    target.decimal = Some(1);

    let seconds = FieldType::new(FieldKind::Duration).with_decimal(0);
    assert_eq!(
        text("838:59:59.5", &seconds),
        ("838:59:59".to_string(), Outcome::TruncatedWrongValue)
    );
    let limit = Duration::parse("838:59:58.6", 6).unwrap().value;
    assert_eq!(text(limit, &seconds), ("838:59:59".to_string(), Outcome::Truncated));

    let t = Time::parse("2010-10-10 10:11:11.12345", TimeKind::Datetime, 2).unwrap();
    assert_eq!(t.to_string(), "2010-10-10 10:11:11.12");
    assert_eq!(run(t, &target).value.to_text().unwrap(), "10:11:11.1");
}

#[test]
fn timestamp_targets_keep_requested_precision() {
    let mut target = FieldType::new(FieldKind::Timestamp).with_decimal(3);
    let out = run("2010-10-10 10:11:11.12345", &target);
    assert_eq!(out.value.to_text().unwrap(), "2010-10-10 10:11:11.123");

    target.decimal = Some(1);
    let again = convert(&out.value, &target, &ctx()).unwrap();
    assert_eq!(again.value.to_text().unwrap(), "2010-10-10 10:11:11.1");
    assert_eq!(again.outcome, Outcome::Truncated);

    let datetime = FieldType::new(FieldKind::Datetime).with_decimal(6);
    let widened = convert(&again.value, &datetime, &ctx()).unwrap();
    assert_eq!(widened.outcome, Outcome::Exact);
    let date = convert(&again.value, &FieldType::new(FieldKind::Date), &ctx()).unwrap();
    assert_eq!(
        (date.value.to_text().unwrap(), date.outcome),
        ("2010-10-10".to_string(), Outcome::Truncated)
    );

    let outside = FieldType::new(FieldKind::Timestamp);
    assert!(convert(&Datum::from("1960-01-01 00:00:00"), &outside, &ctx()).is_err());
}

#[test]
fn temporal_targets_from_strings_and_numbers() {
    let date = FieldType::new(FieldKind::Date);
    let datetime = FieldType::new(FieldKind::Datetime);
    let timestamp = FieldType::new(FieldKind::Timestamp);
    let duration = FieldType::new(FieldKind::Duration);

    assert_eq!(text("2012-08-23", &date), owned("2012-08-23"));
    assert_eq!(text("2012-08-23 12:34:03.123456", &datetime), owned("2012-08-23 12:34:03"));
    assert_eq!(text(Time::zero(TimeKind::Datetime, 0), &datetime), owned("0000-00-00 00:00:00"));
    assert_eq!(text(0i64, &datetime), owned("0000-00-00 00:00:00"));
    assert_eq!(text("2012-08-23 12:34:03.123456", &timestamp), owned("2012-08-23 12:34:03"));
    assert_eq!(text("10:11:12", &duration), owned("10:11:12"));
    assert_eq!(text(Time::zero(TimeKind::Datetime, 0), &duration), owned("00:00:00"));
    assert_eq!(text(Duration::zero(0), &duration), owned("00:00:00"));
    assert_eq!(text(0, &duration), owned("00:00:00"));

    for target in [&date, &datetime, &timestamp, &duration] {
        assert!(
            convert(&Datum::from("2012-08-x"), target, &ctx()).is_err(),
            "target={}",
            target.sql_string()
        );
    }
}

#[test]
fn durations_anchor_at_the_current_date() {
    let nanos = (10 * 3600 + 30 * 60) * 1_000_000_000;
    let out = run(Duration::new(nanos, 0), &FieldType::new(FieldKind::Datetime));
    assert_eq!(out.value.to_text().unwrap(), "2024-03-15 10:30:00");
}

#[test]
fn null_passes_through_and_opaque_values_are_rejected() {
    let blob = FieldType::new(FieldKind::Blob);
    let out = convert(&Datum::null(), &blob, &ctx()).unwrap();
    assert!(out.value.is_null());
    assert!(out.outcome.is_exact());

    let raw = Datum::from_raw(vec![1, 2, 3]);
    assert!(matches!(convert(&raw, &blob, &ctx()), Err(TypeError::Unsupported { .. })));

    let opaque = Datum::from_interface(Opaque::new(7u32));
    assert!(matches!(convert(&opaque, &blob, &ctx()), Err(TypeError::Unsupported { .. })));
}

#[test]
fn json_targets_parse_text_and_wrap_scalars() {
    let json = FieldType::new(FieldKind::Json);
    assert_eq!(text(r#"{"a": [1, 2]}"#, &json), owned(r#"{"a":[1,2]}"#));
    assert_eq!(text(42, &json), owned("42"));
    assert!(convert(&Datum::from("{oops"), &json, &ctx()).is_err());
}
