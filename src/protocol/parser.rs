//! Recursive-Descent RESP Parser
//!
//! This module turns a complete in-memory byte buffer into a [`Value`] plus
//! the exact number of bytes consumed.
//!
//! ## Design
//!
//! 1. **Pure functions**: parsing is stateless. There is no cursor object;
//!    recursion for arrays simply re-slices the remaining buffer.
//! 2. **Exact accounting**: every sub-parser reports precisely how many
//!    bytes it consumed and never assumes it owns the rest of the buffer,
//!    because it may be invoked as an array element with more data
//!    following it.
//! 3. **Whole messages only**: the buffer must hold exactly one complete
//!    frame. Truncated or partial input is an error, not a "need more
//!    data" signal, and trailing bytes after the frame are rejected.
//!
//! The length-prefixed types ($, *) are framed by a CRLF whose presence at
//! a *computed* offset is verified rather than searched for. That is what
//! lets a bulk string carry CRLF bytes as ordinary payload.
//!
//! ## Entry points
//!
//! - [`parse_message`]: top-level contract. Enforces the trailing CRLF and
//!   full-buffer consumption.
//! - [`parse_value`]: the recursive dispatcher. Consumes one value and
//!   leaves whatever follows untouched.

use crate::protocol::types::{prefix, Value, CRLF};
use bytes::Bytes;
use num_bigint::BigInt;
use thiserror::Error;

/// Errors that can occur while parsing a frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input buffer is empty
    #[error("empty input")]
    EmptyInput,

    /// A structurally required CRLF terminator is absent
    #[error("missing CRLF terminator")]
    MissingTerminator,

    /// Bytes remain after one complete top-level value
    #[error("trailing bytes after message: {0} bytes")]
    TrailingBytes(usize),

    /// Unknown type prefix byte
    #[error("unknown type prefix: {0:#04x}")]
    UnknownPrefix(u8),

    /// Empty content where non-empty content is required
    #[error("{0} has empty content")]
    EmptyContent(&'static str),

    /// Malformed integer, length or count literal
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// Invalid UTF-8 in a line-oriented value
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Simple string or error content contains a CR or LF byte
    #[error("single-line content contains a CR or LF byte")]
    EmbeddedTerminator,

    /// Bulk string length is negative (there is no null bulk string)
    #[error("invalid bulk string length: {0}")]
    InvalidBulkLength(i64),

    /// Array count is negative (there is no null array)
    #[error("invalid array length: {0}")]
    InvalidArrayLength(i64),

    /// Bulk string declares more payload bytes than the buffer holds
    #[error("bulk string declares {declared} bytes but only {available} remain")]
    BulkTooShort { declared: usize, available: usize },

    /// Array declares more elements than the buffer holds
    #[error("array declares {declared} elements but input ends after {parsed}")]
    ArrayTooShort { declared: usize, parsed: usize },

    /// Protocol violation (wrong bytes at a computed CRLF offset, etc.)
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// The declared payload exceeds the maximum allowed size
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// Arrays nested deeper than the recursion guard allows
    #[error("maximum nesting depth exceeded: {0}")]
    DepthExceeded(usize),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum size for a single bulk string (512 MB, same as Redis)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Maximum array nesting depth (prevents stack exhaustion on adversarial input)
pub const MAX_NESTING_DEPTH: usize = 32;

/// Parses one complete message from the buffer.
///
/// The buffer must end with CRLF and contain exactly one value; anything
/// after the frame is reported as [`ParseError::TrailingBytes`]. Full
/// consumption is enforced only here, at the outermost call, because array
/// and bulk-string payloads legitimately contain terminator-like bytes.
///
/// On success the returned count equals `buf.len()`.
pub fn parse_message(buf: &[u8]) -> ParseResult<(Value, usize)> {
    if buf.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    if !buf.ends_with(CRLF) {
        return Err(ParseError::MissingTerminator);
    }

    let (value, consumed) = parse_value(buf)?;
    if consumed != buf.len() {
        return Err(ParseError::TrailingBytes(buf.len() - consumed));
    }
    Ok((value, consumed))
}

/// Parses a single value from the front of the buffer.
///
/// Returns the value together with the offset of the first byte belonging
/// to whatever follows it. Trailing data is left for the caller, which is
/// what allows array elements to be parsed by recursive descent.
pub fn parse_value(buf: &[u8]) -> ParseResult<(Value, usize)> {
    parse_value_at(buf, 0)
}

/// Internal recursive dispatcher. Depth is threaded explicitly because the
/// parser holds no state between calls.
fn parse_value_at(buf: &[u8], depth: usize) -> ParseResult<(Value, usize)> {
    if buf.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    if depth > MAX_NESTING_DEPTH {
        return Err(ParseError::DepthExceeded(MAX_NESTING_DEPTH));
    }

    match buf[0] {
        prefix::SIMPLE_STRING => parse_simple_string(buf),
        prefix::ERROR => parse_error(buf),
        prefix::INTEGER => parse_integer(buf),
        prefix::BULK_STRING => parse_bulk_string(buf),
        prefix::ARRAY => parse_array(buf, depth),
        other => Err(ParseError::UnknownPrefix(other)),
    }
}

/// Extracts the content of the prefix line: the bytes between the type
/// prefix and the first CRLF. Returns the content and the total line
/// length including prefix and terminator.
fn prefix_line(buf: &[u8]) -> ParseResult<(&[u8], usize)> {
    let pos = find_crlf(&buf[1..]).ok_or(ParseError::MissingTerminator)?;
    Ok((&buf[1..1 + pos], 1 + pos + CRLF.len()))
}

fn line_str(content: &[u8]) -> ParseResult<&str> {
    std::str::from_utf8(content).map_err(|e| ParseError::InvalidUtf8(e.to_string()))
}

/// Parses a simple string: `+<string>\r\n`
fn parse_simple_string(buf: &[u8]) -> ParseResult<(Value, usize)> {
    let (content, consumed) = prefix_line(buf)?;
    let s = single_line_content(content, "simple string")?;
    Ok((Value::SimpleString(s.to_string()), consumed))
}

/// Parses an error: `-<error message>\r\n`
fn parse_error(buf: &[u8]) -> ParseResult<(Value, usize)> {
    let (content, consumed) = prefix_line(buf)?;
    let s = single_line_content(content, "error")?;
    Ok((Value::Error(s.to_string()), consumed))
}

/// Shared validation for the single-line text types: non-empty, valid
/// UTF-8, and free of CR/LF. The content is cut at the *first* CRLF so a
/// full terminator cannot appear here, but a lone CR or LF still can.
fn single_line_content<'a>(content: &'a [u8], what: &'static str) -> ParseResult<&'a str> {
    if content.is_empty() {
        return Err(ParseError::EmptyContent(what));
    }
    if content.iter().any(|&b| b == b'\r' || b == b'\n') {
        return Err(ParseError::EmbeddedTerminator);
    }
    line_str(content)
}

/// Parses an integer: `:<integer>\r\n`
///
/// The literal is an optional sign followed by decimal digits, at any
/// magnitude. No declared length is needed: the terminator position alone
/// determines extent.
fn parse_integer(buf: &[u8]) -> ParseResult<(Value, usize)> {
    let (content, consumed) = prefix_line(buf)?;
    if content.is_empty() {
        return Err(ParseError::EmptyContent("integer"));
    }
    let s = line_str(content)?;
    let n: BigInt = s
        .parse()
        .map_err(|_| ParseError::InvalidInteger(s.to_string()))?;
    Ok((Value::Integer(n), consumed))
}

/// Parses a bulk string: `$<length>\r\n<data>\r\n`
///
/// Extent is determined solely by the declared length, never by scanning:
/// CRLF bytes inside the payload are ordinary data. The two bytes at the
/// computed offset after the payload must be CRLF.
fn parse_bulk_string(buf: &[u8]) -> ParseResult<(Value, usize)> {
    let (length_line, header_len) = prefix_line(buf)?;
    let length_str = line_str(length_line)?;
    let length: i64 = length_str
        .parse()
        .map_err(|_| ParseError::InvalidInteger(length_str.to_string()))?;

    // No null bulk strings: -1 is rejected like any other negative length.
    if length < 0 {
        return Err(ParseError::InvalidBulkLength(length));
    }
    let length = length as usize;

    if length > MAX_BULK_SIZE {
        return Err(ParseError::MessageTooLarge {
            size: length,
            max: MAX_BULK_SIZE,
        });
    }

    let available = buf.len() - header_len;
    if available < length + CRLF.len() {
        return Err(ParseError::BulkTooShort {
            declared: length,
            available,
        });
    }

    let data_end = header_len + length;
    if &buf[data_end..data_end + CRLF.len()] != CRLF {
        return Err(ParseError::ProtocolError(
            "bulk string payload is not followed by CRLF".to_string(),
        ));
    }

    let data = Bytes::copy_from_slice(&buf[header_len..data_end]);
    Ok((Value::BulkString(data), data_end + CRLF.len()))
}

/// Parses an array: `*<count>\r\n<elements...>`
///
/// The extent is exactly the count line plus the concatenated extents of
/// the elements; there is no trailing terminator of the array's own.
fn parse_array(buf: &[u8], depth: usize) -> ParseResult<(Value, usize)> {
    let (count_line, header_len) = prefix_line(buf)?;
    let count_str = line_str(count_line)?;
    let count: i64 = count_str
        .parse()
        .map_err(|_| ParseError::InvalidInteger(count_str.to_string()))?;

    // No null arrays either.
    if count < 0 {
        return Err(ParseError::InvalidArrayLength(count));
    }
    let count = count as usize;

    let mut elements = Vec::with_capacity(count.min(64));
    let mut consumed = header_len;

    for parsed in 0..count {
        if consumed >= buf.len() {
            return Err(ParseError::ArrayTooShort {
                declared: count,
                parsed,
            });
        }
        let (value, used) = parse_value_at(&buf[consumed..], depth + 1)?;
        elements.push(value);
        consumed += used;
    }

    Ok((Value::Array(elements), consumed))
}

/// Finds the position of the first CRLF in the buffer.
///
/// Returns the position of `\r`, or None if no CRLF is present.
#[inline]
fn find_crlf(buf: &[u8]) -> Option<usize> {
    for i in 0..buf.len().saturating_sub(1) {
        if buf[i] == b'\r' && buf[i + 1] == b'\n' {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(input: &[u8]) -> (Value, usize) {
        parse_message(input).expect("frame should parse")
    }

    #[test]
    fn test_parse_simple_string() {
        let (value, consumed) = parse_ok(b"+hello world\r\n");
        assert_eq!(value, Value::simple_string("hello world"));
        assert_eq!(consumed, 14);
    }

    #[test]
    fn test_parse_simple_string_preserves_whitespace() {
        assert_eq!(
            parse_ok(b"+hello world \r\n"),
            (Value::simple_string("hello world "), 15)
        );
        assert_eq!(
            parse_ok(b"+ hello world\r\n"),
            (Value::simple_string(" hello world"), 15)
        );
        assert_eq!(parse_ok(b"+ \r\n"), (Value::simple_string(" "), 4));
        assert_eq!(parse_ok(b"+   \r\n"), (Value::simple_string("   "), 6));
    }

    #[test]
    fn test_parse_empty_simple_string_fails() {
        assert_eq!(
            parse_message(b"+\r\n"),
            Err(ParseError::EmptyContent("simple string"))
        );
    }

    #[test]
    fn test_parse_simple_string_with_lone_cr_fails() {
        assert_eq!(
            parse_message(b"+hel\rlo\r\n"),
            Err(ParseError::EmbeddedTerminator)
        );
    }

    #[test]
    fn test_parse_error_value() {
        let (value, consumed) = parse_ok(b"-ERR unsupported command\r\n");
        assert_eq!(value, Value::error("ERR unsupported command"));
        assert_eq!(consumed, 26);
    }

    #[test]
    fn test_parse_empty_error_fails() {
        assert_eq!(parse_message(b"-\r\n"), Err(ParseError::EmptyContent("error")));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_ok(b":123\r\n"), (Value::integer(123), 6));
        assert_eq!(parse_ok(b":-42\r\n"), (Value::integer(-42), 6));
        assert_eq!(parse_ok(b":+7\r\n"), (Value::integer(7), 5));
    }

    #[test]
    fn test_parse_integer_beyond_64_bits() {
        let (value, consumed) = parse_ok(b":9223372036854775808\r\n");
        assert_eq!(value, Value::integer(9_223_372_036_854_775_808u64));
        assert_eq!(consumed, 22);

        let (value, _) = parse_ok(b":-170141183460469231731687303715884105728\r\n");
        assert_eq!(
            value.as_integer().map(|n| n.to_string()),
            Some("-170141183460469231731687303715884105728".to_string())
        );
    }

    #[test]
    fn test_parse_invalid_integers() {
        assert!(matches!(
            parse_message(b":abc\r\n"),
            Err(ParseError::InvalidInteger(_))
        ));
        assert_eq!(parse_message(b":\r\n"), Err(ParseError::EmptyContent("integer")));
        assert!(matches!(
            parse_message(b":123.456\r\n"),
            Err(ParseError::InvalidInteger(_))
        ));
        assert_eq!(
            parse_message(b":123\r\n456\r\n"),
            Err(ParseError::TrailingBytes(5))
        );
    }

    #[test]
    fn test_parse_bulk_string() {
        let (value, consumed) = parse_ok(b"$10\r\nbulkstring\r\n");
        assert_eq!(value, Value::bulk_string(Bytes::from("bulkstring")));
        assert_eq!(consumed, 17);
    }

    #[test]
    fn test_parse_empty_bulk_string() {
        let (value, consumed) = parse_ok(b"$0\r\n\r\n");
        assert_eq!(value, Value::bulk_string(Bytes::new()));
        assert_eq!(consumed, 6);
    }

    #[test]
    fn test_parse_bulk_string_with_embedded_crlf() {
        // Extent comes from the declared length, so CRLF bytes in the
        // payload are ordinary data.
        let (value, consumed) = parse_ok(b"$12\r\nbulk\r\nstring\r\n");
        assert_eq!(value, Value::bulk_string(Bytes::from("bulk\r\nstring")));
        assert_eq!(consumed, 19);
    }

    #[test]
    fn test_parse_binary_safe_bulk_string() {
        let (value, _) = parse_ok(b"$5\r\nhel\x00o\r\n");
        assert_eq!(value, Value::bulk_string(Bytes::from(&b"hel\x00o"[..])));
    }

    #[test]
    fn test_parse_bulk_string_length_off_by_one_fails() {
        // One short: the byte after the declared payload is not CR.
        assert!(matches!(
            parse_message(b"$9\r\nbulkstring\r\n"),
            Err(ParseError::ProtocolError(_))
        ));
        // One long: payload plus suffix no longer fit the buffer.
        assert_eq!(
            parse_message(b"$11\r\nbulkstring\r\n"),
            Err(ParseError::BulkTooShort {
                declared: 11,
                available: 12,
            })
        );
    }

    #[test]
    fn test_parse_bulk_string_zero_length_with_content_fails() {
        assert!(matches!(
            parse_message(b"$0\r\na\r\n"),
            Err(ParseError::ProtocolError(_))
        ));
    }

    #[test]
    fn test_parse_bulk_string_extra_line_fails() {
        assert_eq!(
            parse_message(b"$3\r\nabc\r\ncde\r\n"),
            Err(ParseError::TrailingBytes(5))
        );
    }

    #[test]
    fn test_parse_null_bulk_string_fails() {
        // There is no null representation: a negative length is always
        // rejected, regardless of what follows.
        assert_eq!(
            parse_message(b"$-1\r\n"),
            Err(ParseError::InvalidBulkLength(-1))
        );
        assert_eq!(
            parse_message(b"$-4\r\nabcd\r\n"),
            Err(ParseError::InvalidBulkLength(-4))
        );
    }

    #[test]
    fn test_parse_bulk_string_truncated_fails() {
        assert_eq!(
            parse_message(b"$5\r\nhel\r\n"),
            Err(ParseError::BulkTooShort {
                declared: 5,
                available: 5,
            })
        );
    }

    #[test]
    fn test_parse_bulk_string_bad_length_fails() {
        assert!(matches!(
            parse_message(b"$abc\r\nxyz\r\n"),
            Err(ParseError::InvalidInteger(_))
        ));
    }

    #[test]
    fn test_parse_array() {
        let (value, consumed) = parse_ok(b"*2\r\n$4\r\nECHO\r\n$4\r\nname\r\n");
        assert_eq!(
            value,
            Value::array(vec![
                Value::bulk_string(Bytes::from("ECHO")),
                Value::bulk_string(Bytes::from("name")),
            ])
        );
        assert_eq!(consumed, 24);
    }

    #[test]
    fn test_parse_empty_array() {
        assert_eq!(parse_ok(b"*0\r\n"), (Value::array(vec![]), 4));
    }

    #[test]
    fn test_parse_nested_array() {
        let (value, consumed) = parse_ok(b"*2\r\n:1\r\n*2\r\n:2\r\n:3\r\n");
        assert_eq!(
            value,
            Value::array(vec![
                Value::integer(1),
                Value::array(vec![Value::integer(2), Value::integer(3)]),
            ])
        );
        assert_eq!(consumed, 20);
    }

    #[test]
    fn test_parse_mixed_array() {
        let (value, _) = parse_ok(b"*3\r\n+OK\r\n:100\r\n$5\r\nhello\r\n");
        assert_eq!(
            value,
            Value::array(vec![
                Value::simple_string("OK"),
                Value::integer(100),
                Value::bulk_string(Bytes::from("hello")),
            ])
        );
    }

    #[test]
    fn test_parse_array_with_bulk_containing_crlf() {
        // The element's embedded CRLF must not be mistaken for a frame
        // boundary; the element following it still parses.
        let (value, consumed) = parse_ok(b"*2\r\n$6\r\na\r\nb\r\n\r\n:1\r\n");
        assert_eq!(
            value,
            Value::array(vec![
                Value::bulk_string(Bytes::from("a\r\nb\r\n")),
                Value::integer(1),
            ])
        );
        assert_eq!(consumed, 20);
    }

    #[test]
    fn test_parse_array_fewer_elements_than_declared_fails() {
        assert_eq!(
            parse_message(b"*3\r\n:1\r\n:2\r\n"),
            Err(ParseError::ArrayTooShort {
                declared: 3,
                parsed: 2,
            })
        );
    }

    #[test]
    fn test_parse_array_more_elements_than_declared_fails() {
        assert_eq!(
            parse_message(b"*2\r\n:1\r\n:2\r\n:3\r\n"),
            Err(ParseError::TrailingBytes(4))
        );
    }

    #[test]
    fn test_parse_negative_array_count_fails() {
        assert_eq!(
            parse_message(b"*-1\r\n"),
            Err(ParseError::InvalidArrayLength(-1))
        );
    }

    #[test]
    fn test_parse_deeply_nested_array_fails() {
        let mut frame = Vec::new();
        for _ in 0..(MAX_NESTING_DEPTH + 8) {
            frame.extend_from_slice(b"*1\r\n");
        }
        frame.extend_from_slice(b":1\r\n");
        assert_eq!(
            parse_message(&frame),
            Err(ParseError::DepthExceeded(MAX_NESTING_DEPTH))
        );
    }

    #[test]
    fn test_parse_invalid_protocol_messages() {
        assert_eq!(parse_message(b""), Err(ParseError::EmptyInput));
        assert_eq!(
            parse_message(b"+hello world"),
            Err(ParseError::MissingTerminator)
        );
        assert_eq!(
            parse_message(b"+hello world\r\nabc"),
            Err(ParseError::MissingTerminator)
        );
        assert_eq!(
            parse_message(b"\r\nhello world\r\n"),
            Err(ParseError::UnknownPrefix(b'\r'))
        );
        assert_eq!(
            parse_message(b"&hello world\r\n"),
            Err(ParseError::UnknownPrefix(b'&'))
        );
        assert_eq!(
            parse_message(b"+hello world\r\nline two\r\n"),
            Err(ParseError::TrailingBytes(10))
        );
    }

    #[test]
    fn test_parse_value_leaves_trailing_data() {
        // Sub-frame contract: consume exactly one value, report the offset
        // of the next byte, ignore the rest.
        let (value, consumed) = parse_value(b"+PONG\r\n:42\r\n").unwrap();
        assert_eq!(value, Value::pong());
        assert_eq!(consumed, 7);

        let (value, consumed) = parse_value(b"$4\r\nPING\r\n*1\r\n:1\r\n").unwrap();
        assert_eq!(value, Value::bulk_string(Bytes::from("PING")));
        assert_eq!(consumed, 10);
    }
}
