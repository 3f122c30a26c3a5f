//! # resplite - A Lightweight RESP Wire Codec and Server
//!
//! resplite implements a length-delimited, self-describing wire protocol
//! in the RESP (REdis Serialization Protocol) family, together with a
//! small TCP server that speaks it.
//!
//! ## Features
//!
//! - **Recursive-descent parser**: turns a byte buffer into a typed value
//!   plus the exact number of bytes consumed, with no global scan for a
//!   message terminator
//! - **Kind-directed encoder**: resolves the wire's text ambiguity (simple
//!   string vs bulk string vs error) with an explicit hint
//! - **Arbitrary-precision integers**: wire integers are exact at any
//!   magnitude, well beyond the 64-bit range
//! - **No null values**: negative lengths are malformed input, not an
//!   absent-value encoding
//! - **Async I/O**: built on Tokio with a task per connection
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          resplite                            │
//! │                                                              │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐       │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │       │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │       │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘       │
//! │                           │ ▲                 │              │
//! │                    parse  │ │ encode          │              │
//! │                           ▼ │                 ▼              │
//! │                    ┌─────────────┐      ┌───────────┐        │
//! │                    │ RESP Codec  │      │  Reply +  │        │
//! │                    │ (protocol)  │      │  Kind     │        │
//! │                    └─────────────┘      └───────────┘        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use resplite::commands::CommandHandler;
//! use resplite::connection::{handle_connection, ConnectionStats};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let stats = Arc::new(ConnectionStats::new());
//!     let listener = TcpListener::bind("127.0.0.1:6379").await.unwrap();
//!
//!     loop {
//!         let (stream, addr) = listener.accept().await.unwrap();
//!         let handler = CommandHandler::new();
//!         let stats = Arc::clone(&stats);
//!
//!         tokio::spawn(handle_connection(stream, addr, handler, stats));
//!     }
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: the codec - value model, parser, and encoder
//! - [`commands`]: normalisation and the PING/ECHO command table
//! - [`connection`]: client connection management
//!
//! The codec is the interesting part: it is purely functional, stateless,
//! and safe to call from any number of tasks at once. The other modules
//! are thin glue around it.

pub mod commands;
pub mod connection;
pub mod protocol;

// Re-export commonly used types for convenience
pub use commands::{CommandHandler, Reply};
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{encode, parse_message, EncodeError, Kind, ParseError, Value};

/// The default port resplite listens on (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default host resplite binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of resplite
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
