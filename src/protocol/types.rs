//! RESP (Redis Serialization Protocol) Data Types
//!
//! This module defines the value model shared by the parser and the encoder.
//!
//! ## Protocol Format
//!
//! Each RESP type starts with a type prefix byte:
//! - `+` Simple String
//! - `-` Error
//! - `:` Integer
//! - `$` Bulk String
//! - `*` Array
//!
//! Simple strings, errors and integers are terminated with CRLF (`\r\n`);
//! bulk strings and arrays carry their length out-of-band and use CRLF as a
//! verified frame suffix rather than a delimiter to scan for.
//!
//! ## Examples
//!
//! Simple String: `+OK\r\n`
//! Error: `-ERR unsupported command\r\n`
//! Integer: `:1000\r\n`
//! Bulk String: `$5\r\nhello\r\n`
//! Array: `*2\r\n$4\r\nECHO\r\n$2\r\nhi\r\n`
//!
//! There is no null value of any kind: `$-1\r\n` and `*-1\r\n` are rejected
//! as malformed input rather than decoded to an absent value.

use bytes::Bytes;
use num_bigint::BigInt;
use std::fmt;

/// The CRLF terminator used in the RESP protocol
pub const CRLF: &[u8] = b"\r\n";

/// RESP protocol type prefixes
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const ARRAY: u8 = b'*';
}

/// Represents a value on the wire.
///
/// This enum covers all supported RESP data types and is used for both
/// parsing incoming frames and encoding outgoing responses. It is a plain
/// immutable value with structural equality and no shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Simple strings are single-line text.
    /// They cannot contain CR or LF characters and cannot be empty.
    /// Format: `+<string>\r\n`
    SimpleString(String),

    /// Errors are shaped like simple strings but indicate an error condition.
    /// Format: `-<error message>\r\n`
    Error(String),

    /// Arbitrary-precision signed integers. Magnitudes beyond the 64-bit
    /// range (for example 2^63) are represented exactly.
    /// Format: `:<integer>\r\n`
    Integer(BigInt),

    /// Bulk strings are binary-safe: the payload may contain any byte,
    /// including CRLF sequences, because its length travels out-of-band.
    /// Format: `$<length>\r\n<data>\r\n` with `<length> >= 0`
    BulkString(Bytes),

    /// Arrays can contain any value, including nested arrays.
    /// Format: `*<count>\r\n<element1><element2>...`
    Array(Vec<Value>),
}

impl Value {
    /// Creates a new simple string value.
    ///
    /// The content must be single-line text; a string containing CR or LF
    /// cannot be encoded in this form and is rejected by the encoder.
    pub fn simple_string(s: impl Into<String>) -> Self {
        Value::SimpleString(s.into())
    }

    /// Creates a new error value.
    pub fn error(s: impl Into<String>) -> Self {
        Value::Error(s.into())
    }

    /// Creates a new integer value.
    pub fn integer(n: impl Into<BigInt>) -> Self {
        Value::Integer(n.into())
    }

    /// Creates a new bulk string value.
    pub fn bulk_string(data: impl Into<Bytes>) -> Self {
        Value::BulkString(data.into())
    }

    /// Creates an array value.
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(values)
    }

    /// Common response for PONG
    pub fn pong() -> Self {
        Value::SimpleString("PONG".to_string())
    }

    /// Returns true if this value is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Attempts to extract the inner string from SimpleString or BulkString.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::SimpleString(s) => Some(s),
            Value::BulkString(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Attempts to extract the inner bytes from BulkString.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::BulkString(b) => Some(b),
            _ => None,
        }
    }

    /// Attempts to extract the inner integer.
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Attempts to extract the inner array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Consumes self and returns the inner array if this is an Array variant.
    pub fn into_array(self) -> Option<Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::SimpleString(s) => write!(f, "\"{}\"", s),
            Value::Error(s) => write!(f, "(error) {}", s),
            Value::Integer(n) => write!(f, "(integer) {}", n),
            Value::BulkString(data) => {
                if let Ok(s) = std::str::from_utf8(data) {
                    write!(f, "\"{}\"", s)
                } else {
                    write!(f, "(binary data, {} bytes)", data.len())
                }
            }
            Value::Array(values) => {
                if values.is_empty() {
                    write!(f, "(empty array)")
                } else {
                    writeln!(f)?;
                    for (i, v) in values.iter().enumerate() {
                        writeln!(f, "{}) {}", i + 1, v)?;
                    }
                    Ok(())
                }
            }
        }
    }
}
