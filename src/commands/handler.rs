//! Command Handler Module
//!
//! This module implements the command processing layer: it receives parsed
//! wire values, normalises them into an argument list, dispatches to the
//! command table, and produces replies ready for encoding.
//!
//! ## Normalisation
//!
//! A command may arrive as a bare simple string, a bare bulk string, or an
//! array of either, so the first step maps all of those onto one "list of
//! text" shape. Anything else (integers, errors, arrays with non-text
//! elements) is a type error answered on the wire, not a codec failure.
//!
//! ## Reply kinds
//!
//! A reply is a value plus the [`Kind`] under which it must be encoded.
//! `PING` answers with the protocol-level simple string `PONG` even when
//! the request arrived as a bulk string; echoed payloads go back as bulk
//! strings; failures of any sort become wire error replies.

use crate::protocol::{Kind, Value};
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

/// Errors produced by normalisation and dispatch.
///
/// These never escape to the transport: `execute` translates each of them
/// into a wire-level error reply and the connection keeps serving.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The request is not text or an array of text
    #[error("command must be an array of strings")]
    NotText,

    /// The request normalised to zero arguments
    #[error("empty command")]
    Empty,

    /// The command name is not in the table
    #[error("unsupported command: {0}")]
    Unsupported(String),

    /// The command exists but was given the wrong number of arguments
    #[error("wrong number of arguments for '{0}'")]
    WrongArity(&'static str),
}

/// A reply plus the encoding hint it must be serialised under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The value to send back
    pub value: Value,
    /// How its text content goes on the wire
    pub kind: Kind,
}

impl Reply {
    fn protocol(value: Value) -> Self {
        Self {
            value,
            kind: Kind::Protocol,
        }
    }

    fn non_protocol(value: Value) -> Self {
        Self {
            value,
            kind: Kind::NonProtocol,
        }
    }

    /// Builds a wire error reply.
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            value: Value::error(msg),
            kind: Kind::Error,
        }
    }
}

/// Maps a request value onto a list of text arguments.
///
/// `SimpleString` and UTF-8 `BulkString` become one-element lists; arrays
/// of those become the argument list; every other shape is rejected. This
/// step belongs to the dispatch layer, not the codec: the wire format has
/// no opinion on what a command looks like.
pub fn normalise(request: &Value) -> Result<Vec<String>, CommandError> {
    match request {
        Value::SimpleString(s) => Ok(vec![s.clone()]),
        Value::BulkString(data) => Ok(vec![text_argument(data)?]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::SimpleString(s) => Ok(s.clone()),
                Value::BulkString(data) => text_argument(data),
                _ => Err(CommandError::NotText),
            })
            .collect(),
        _ => Err(CommandError::NotText),
    }
}

fn text_argument(data: &Bytes) -> Result<String, CommandError> {
    std::str::from_utf8(data)
        .map(str::to_owned)
        .map_err(|_| CommandError::NotText)
}

/// Dispatches normalised commands to their handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandHandler;

impl CommandHandler {
    /// Creates a new command handler.
    pub fn new() -> Self {
        Self
    }

    /// Executes a request and returns the reply to encode.
    ///
    /// Never fails: every normalisation or dispatch error is translated
    /// into a wire error reply here.
    pub fn execute(&self, request: Value) -> Reply {
        let argv = match normalise(&request) {
            Ok(argv) => argv,
            Err(e) => {
                debug!(error = %e, "Rejected request shape");
                return Reply::error("ERR command must be an array of strings");
            }
        };

        match self.dispatch(&argv) {
            Ok(reply) => reply,
            Err(CommandError::Empty) => Reply::error("ERR empty command"),
            Err(CommandError::Unsupported(cmd)) => {
                debug!(command = %cmd, "Unsupported command");
                Reply::error("ERR unsupported command")
            }
            Err(e @ CommandError::WrongArity(_)) => Reply::error(format!("ERR {e}")),
            Err(CommandError::NotText) => Reply::error("ERR command must be an array of strings"),
        }
    }

    /// Looks up the command name and runs its handler.
    fn dispatch(&self, argv: &[String]) -> Result<Reply, CommandError> {
        let (name, args) = argv.split_first().ok_or(CommandError::Empty)?;

        match name.to_uppercase().as_str() {
            "PING" => self.cmd_ping(args),
            "ECHO" => self.cmd_echo(args),
            _ => Err(CommandError::Unsupported(name.clone())),
        }
    }

    /// PING [message]
    ///
    /// Bare PING answers with the protocol string PONG regardless of how
    /// the request was framed; PING with a message echoes it as bulk.
    fn cmd_ping(&self, args: &[String]) -> Result<Reply, CommandError> {
        match args {
            [] => Ok(Reply::protocol(Value::pong())),
            [msg] => Ok(Reply::non_protocol(Value::bulk_string(Bytes::from(
                msg.clone(),
            )))),
            _ => Err(CommandError::WrongArity("PING")),
        }
    }

    /// ECHO message
    fn cmd_echo(&self, args: &[String]) -> Result<Reply, CommandError> {
        match args {
            [msg] => Ok(Reply::non_protocol(Value::bulk_string(Bytes::from(
                msg.clone(),
            )))),
            _ => Err(CommandError::WrongArity("ECHO")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_command(args: &[&str]) -> Value {
        Value::Array(
            args.iter()
                .map(|s| Value::bulk_string(Bytes::from(s.to_string())))
                .collect(),
        )
    }

    #[test]
    fn test_normalise_accepts_text_shapes() {
        assert_eq!(
            normalise(&Value::simple_string("PING")),
            Ok(vec!["PING".to_string()])
        );
        assert_eq!(
            normalise(&Value::bulk_string(Bytes::from("PING"))),
            Ok(vec!["PING".to_string()])
        );
        assert_eq!(
            normalise(&make_command(&["ECHO", "hi"])),
            Ok(vec!["ECHO".to_string(), "hi".to_string()])
        );
        assert_eq!(
            normalise(&Value::array(vec![
                Value::simple_string("ECHO"),
                Value::bulk_string(Bytes::from("hi")),
            ])),
            Ok(vec!["ECHO".to_string(), "hi".to_string()])
        );
    }

    #[test]
    fn test_normalise_rejects_non_text() {
        assert_eq!(normalise(&Value::integer(1)), Err(CommandError::NotText));
        assert_eq!(
            normalise(&Value::error("ERR boom")),
            Err(CommandError::NotText)
        );
        assert_eq!(
            normalise(&Value::array(vec![
                Value::bulk_string(Bytes::from("ECHO")),
                Value::integer(1),
            ])),
            Err(CommandError::NotText)
        );
        assert_eq!(
            normalise(&Value::bulk_string(Bytes::from(&[0xff, 0xfe][..]))),
            Err(CommandError::NotText)
        );
    }

    #[test]
    fn test_ping() {
        let handler = CommandHandler::new();

        // PING replies with a protocol simple string however it arrived.
        for request in [
            Value::simple_string("PING"),
            Value::bulk_string(Bytes::from("PING")),
            make_command(&["PING"]),
        ] {
            let reply = handler.execute(request);
            assert_eq!(reply.value, Value::pong());
            assert_eq!(reply.kind, Kind::Protocol);
        }
    }

    #[test]
    fn test_ping_is_case_insensitive() {
        let handler = CommandHandler::new();
        let reply = handler.execute(make_command(&["ping"]));
        assert_eq!(reply.value, Value::pong());
    }

    #[test]
    fn test_ping_with_message() {
        let handler = CommandHandler::new();
        let reply = handler.execute(make_command(&["PING", "hello"]));
        assert_eq!(reply.value, Value::bulk_string(Bytes::from("hello")));
        assert_eq!(reply.kind, Kind::NonProtocol);
    }

    #[test]
    fn test_echo() {
        let handler = CommandHandler::new();
        let reply = handler.execute(make_command(&["ECHO", "hello world"]));
        assert_eq!(reply.value, Value::bulk_string(Bytes::from("hello world")));
        assert_eq!(reply.kind, Kind::NonProtocol);
    }

    #[test]
    fn test_echo_wrong_arity() {
        let handler = CommandHandler::new();
        let reply = handler.execute(make_command(&["ECHO"]));
        assert_eq!(
            reply.value,
            Value::error("ERR wrong number of arguments for 'ECHO'")
        );
        assert_eq!(reply.kind, Kind::Error);
    }

    #[test]
    fn test_unsupported_command() {
        let handler = CommandHandler::new();
        let reply = handler.execute(make_command(&["FLUSHALL"]));
        assert_eq!(reply.value, Value::error("ERR unsupported command"));
        assert_eq!(reply.kind, Kind::Error);
    }

    #[test]
    fn test_non_text_request() {
        let handler = CommandHandler::new();
        let reply = handler.execute(Value::integer(42));
        assert_eq!(
            reply.value,
            Value::error("ERR command must be an array of strings")
        );
        assert_eq!(reply.kind, Kind::Error);
    }

    #[test]
    fn test_empty_command() {
        let handler = CommandHandler::new();
        let reply = handler.execute(Value::array(vec![]));
        assert_eq!(reply.value, Value::error("ERR empty command"));
        assert_eq!(reply.kind, Kind::Error);
    }
}
