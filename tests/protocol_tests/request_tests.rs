//! Request and Response Tests
//!
//! Tests for request parsing and response payload encoding.

use socketmap_sql::protocol::{decode_response, encode_response, ErrorKind, Outcome, ParseError, Request};

// =============================================================================
// Request Parsing Tests
// =============================================================================

#[test]
fn test_parse_request() {
    let request = Request::parse(b"aliases bob@x.com").unwrap();
    assert_eq!(request.table, "aliases");
    assert_eq!(request.key, "bob@x.com");
}

#[test]
fn test_parse_key_with_spaces() {
    let request = Request::parse(b"names John Smith").unwrap();
    assert_eq!(request.table, "names");
    assert_eq!(request.key, "John Smith");
}

#[test]
fn test_parse_missing_separator() {
    assert_eq!(Request::parse(b"foo"), Err(ParseError::MissingSeparator));
    assert_eq!(Request::parse(b""), Err(ParseError::MissingSeparator));
}

#[test]
fn test_parse_empty_table() {
    assert_eq!(Request::parse(b" key"), Err(ParseError::EmptyTable));
}

#[test]
fn test_parse_empty_key() {
    assert_eq!(Request::parse(b"aliases "), Err(ParseError::EmptyKey));
}

#[test]
fn test_parse_invalid_utf8() {
    assert_eq!(Request::parse(b"aliases \xff\xfe"), Err(ParseError::InvalidUtf8));
}

#[test]
fn test_request_encode() {
    let request = Request::new("aliases", "bob@x.com");
    assert_eq!(request.encode(), b"aliases bob@x.com");
    assert_eq!(Request::parse(&request.encode()).unwrap(), request);
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_not_found_has_no_trailing_data() {
    assert_eq!(encode_response(&Outcome::NotFound), b"NOTFOUND");
}

#[test]
fn test_error_tags() {
    let cases = [
        (ErrorKind::Permanent, "PERM no such table: x"),
        (ErrorKind::Temporary, "TEMP no such table: x"),
        (ErrorKind::Timeout, "TIMEOUT no such table: x"),
    ];
    for (kind, expected) in cases {
        let outcome = Outcome::error(kind, "no such table: x");
        assert_eq!(encode_response(&outcome), expected.as_bytes());
        assert_eq!(decode_response(expected.as_bytes()).unwrap(), outcome);
    }
}
