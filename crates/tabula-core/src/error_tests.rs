//! Tests for `error` module

use super::error::*;
use crate::query::ParseError;

#[test]
fn test_error_codes_are_unique() {
    // Arrange
    let errors: Vec<Error> = vec![
        Error::Parse(ParseError::syntax(0, "x", "bad")),
        Error::InvalidArgument("test".into()),
        Error::Io(std::io::Error::other("test")),
        Error::Serialization("test".into()),
        Error::Config("test".into()),
    ];

    // Act
    let codes: Vec<&str> = errors.iter().map(Error::code).collect();

    // Assert
    let mut unique_codes = codes.clone();
    unique_codes.sort_unstable();
    unique_codes.dedup();
    assert_eq!(codes.len(), unique_codes.len(), "Error codes must be unique");

    for code in &codes {
        assert!(code.starts_with("TAB-"), "Code {code} should start with TAB-");
    }
}

#[test]
fn test_error_display_includes_code() {
    let err = Error::InvalidArgument("page_size must be positive".into());

    let display = format!("{err}");

    assert!(display.contains("TAB-002"));
    assert!(display.contains("page_size"));
}

#[test]
fn test_parse_error_converts_into_error() {
    let parse = ParseError::syntax(4, "age >", "Expected literal");

    let err: Error = parse.into();

    assert_eq!(err.code(), "TAB-001");
    assert!(err.is_user_error());
    assert!(format!("{err}").contains("Expected literal"));
}

#[test]
fn test_io_error_is_not_user_error() {
    let err = Error::Io(std::io::Error::other("disk full"));

    assert!(!err.is_user_error());
}

#[test]
fn test_json_error_maps_to_serialization() {
    let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();

    let err: Error = json_err.into();

    assert_eq!(err.code(), "TAB-005");
}
