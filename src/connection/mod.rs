//! Connection Handling Module
//!
//! This module manages individual client connections. Each accepted client
//! is handled by its own async task, so the server can serve many clients
//! concurrently.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  Read one frame              │
//!    │        │                     │
//!    │        ▼                     │
//!    │  Parse as a complete message │
//!    │        │                     │
//!    │        ▼                     │
//!    │  Dispatch command            │
//!    │        │                     │
//!    │        ▼                     │
//!    │  Encode + send reply         │
//!    │        │                     │
//!    │        ▼                     │
//!    │     [Loop back]              │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. Client disconnects / error
//! ```
//!
//! The codec has no notion of partial input, so each socket read is
//! treated as exactly one frame. Malformed frames are answered with an
//! error reply and the connection keeps serving.

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
