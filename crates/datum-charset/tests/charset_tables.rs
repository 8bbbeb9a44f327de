use datum_charset::{
    all_charsets, charset_desc, collation_by_id, default_collation, is_binary,
    valid_charset_and_collation, CharsetError,
};
use pretty_assertions::assert_eq;

#[test]
fn validates_charset_and_collation_pairs() {
    let cases = [
        ("utf8", "utf8_general_ci", true),
        ("", "utf8_general_ci", true),
        ("utf8mb4", "utf8mb4_bin", true),
        ("latin1", "latin1_bin", true),
        ("utf8", "utf8_invalid_ci", false),
        ("utf16", "utf16_bin", false),
        ("gb2312", "gb2312_chinese_ci", false),
        ("UTF8", "UTF8_BIN", true),
        ("UTF8", "utf8_bin", true),
        ("UTF8MB4", "utf8mb4_bin", true),
        ("UTF8MB4", "UTF8MB4_bin", true),
        ("UTF8MB4", "UTF8MB4_general_ci", true),
        ("Utf8", "uTf8_bIN", true),
    ];
    for (cs, co, expected) in cases {
        assert_eq!(
            valid_charset_and_collation(cs, co),
            expected,
            "charset={cs} collation={co}"
        );
    }
}

#[test]
fn default_collation_lookup() {
    let cases = [
        ("utf8", Some("utf8_bin")),
        ("UTF8", Some("utf8_bin")),
        ("utf8mb4", Some("utf8mb4_bin")),
        ("ascii", Some("ascii_bin")),
        ("binary", Some("binary")),
        ("latin1", Some("latin1_bin")),
        ("invalid_cs", None),
        ("", None),
    ];
    for (cs, expected) in cases {
        assert_eq!(default_collation(cs).ok(), expected, "charset={cs}");
    }
}

#[test]
fn charset_desc_returns_canonical_name() {
    assert_eq!(charset_desc("UTF8").unwrap().name, "utf8");
    assert_eq!(charset_desc("binary").unwrap().name, "binary");
    assert_eq!(
        charset_desc("invalid_cs"),
        Err(CharsetError::UnknownCharset("invalid_cs".to_string()))
    );
    assert_eq!(all_charsets().len(), 5);
}

#[test]
fn binary_helpers() {
    assert!(is_binary("BINARY"));
    assert!(!is_binary("utf8"));
    assert_eq!(collation_by_id(63).unwrap().name, "binary");
    assert!(collation_by_id(250).is_err());
}
