//! Command Dispatch Module
//!
//! This module sits between the codec and the transport: it takes a parsed
//! wire value, normalises it into an argument list, and maps it onto a
//! reply plus the encoding kind that reply must be sent under.
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  RESP Parser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Normalise    │
//! │  - Dispatch     │
//! │  - Reply + Kind │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  RESP Encoder   │  (protocol module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `PING [message]` - Test connection; bare PING answers `+PONG\r\n`
//! - `ECHO message` - Echo the message back as a bulk string

pub mod handler;

// Re-export the main command handler
pub use handler::{normalise, CommandError, CommandHandler, Reply};
