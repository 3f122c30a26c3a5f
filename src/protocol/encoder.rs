//! RESP Encoder
//!
//! This module turns a [`Value`] into its wire representation.
//!
//! Plain text is representationally ambiguous on the wire: the protocol
//! offers both a short single-line form (`+text\r\n`) and a length-prefixed
//! form (`$len\r\ntext\r\n`). The caller resolves the ambiguity with a
//! [`Kind`] hint, which is orthogonal to the value itself and is inherited
//! by every element of an array. Integers always encode as `:n\r\n`
//! regardless of the hint.
//!
//! No escaping is ever performed. Length-prefixed content is written
//! verbatim, CRLF bytes included; single-line content containing CR or LF
//! is unencodable and reported as an error.

use crate::protocol::types::{prefix, Value, CRLF};
use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur while encoding a value.
///
/// Every well-formed value encodes infallibly; encoding fails only for a
/// hand-constructed value that violates the model's single-line invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Single-line (`+`/`-`) content contains a CR or LF byte
    #[error("single-line content contains a CR or LF byte")]
    EmbeddedTerminator,
}

/// Selects the wire form of text content.
///
/// `Protocol` is for protocol-level status strings such as `PONG`,
/// `NonProtocol` for arbitrary payload text, and `Error` for error
/// replies. The hint propagates into nested array elements, so a whole
/// array of leaf strings can be encoded one way in a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kind {
    /// Text encodes as a simple string: `+text\r\n`
    Protocol,
    /// Text encodes as a bulk string: `$len\r\ntext\r\n`
    #[default]
    NonProtocol,
    /// Text encodes as an error: `-text\r\n`
    Error,
}

/// A fully encoded message.
///
/// `bytes_produced` always equals `message.len()`; it is established at
/// the single construction site below, not recomputed by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// The wire bytes of the message
    pub message: Bytes,
    /// Exact length of `message` in bytes
    pub bytes_produced: usize,
}

/// Encodes a value under the given kind hint.
pub fn encode(value: &Value, kind: Kind) -> Result<Encoded, EncodeError> {
    let mut buf = Vec::with_capacity(32);
    encode_into(value, kind, &mut buf)?;
    let bytes_produced = buf.len();
    Ok(Encoded {
        message: Bytes::from(buf),
        bytes_produced,
    })
}

fn encode_into(value: &Value, kind: Kind, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    match value {
        Value::Integer(n) => {
            buf.push(prefix::INTEGER);
            buf.extend_from_slice(n.to_string().as_bytes());
            buf.extend_from_slice(CRLF);
            Ok(())
        }
        Value::SimpleString(s) => encode_text(s.as_bytes(), kind, buf),
        Value::Error(s) => encode_text(s.as_bytes(), kind, buf),
        Value::BulkString(data) => encode_text(data, kind, buf),
        Value::Array(values) => {
            buf.push(prefix::ARRAY);
            buf.extend_from_slice(values.len().to_string().as_bytes());
            buf.extend_from_slice(CRLF);
            for value in values {
                encode_into(value, kind, buf)?;
            }
            Ok(())
        }
    }
}

fn encode_text(content: &[u8], kind: Kind, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    match kind {
        Kind::Protocol => encode_line(prefix::SIMPLE_STRING, content, buf),
        Kind::Error => encode_line(prefix::ERROR, content, buf),
        Kind::NonProtocol => {
            buf.push(prefix::BULK_STRING);
            buf.extend_from_slice(content.len().to_string().as_bytes());
            buf.extend_from_slice(CRLF);
            buf.extend_from_slice(content);
            buf.extend_from_slice(CRLF);
            Ok(())
        }
    }
}

fn encode_line(prefix: u8, content: &[u8], buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    if content.iter().any(|&b| b == b'\r' || b == b'\n') {
        return Err(EncodeError::EmbeddedTerminator);
    }
    buf.push(prefix);
    buf.extend_from_slice(content);
    buf.extend_from_slice(CRLF);
    Ok(())
}
