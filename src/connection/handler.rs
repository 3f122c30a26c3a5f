//! Connection Handler Module
//!
//! This module handles individual client connections. Each client gets its
//! own handler task that runs in a loop, reading frames and sending
//! replies.
//!
//! ## Frame discipline
//!
//! The codec deliberately has no streaming mode: a buffer either holds one
//! complete message or it is malformed. The transport therefore processes
//! one complete message per socket read. A frame that fails to parse is
//! answered with a wire error reply on the same connection; only I/O
//! failures and oversized frames end the session.

use crate::commands::{CommandHandler, Reply};
use crate::protocol::{encode, parse_message, EncodeError, Encoded, Kind, Value};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Maximum size for a single frame (64 KB)
const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total frames processed
    pub frames_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn frame_processed(&self) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
pub struct ConnectionHandler {
    /// The TCP stream for this connection
    stream: BufWriter<TcpStream>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming frames
    buffer: BytesMut,

    /// The command handler
    command_handler: CommandHandler,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandler {
    /// Creates a new connection handler.
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            command_handler,
            stats,
        }
    }

    /// Runs the main connection loop until the client disconnects or an
    /// error occurs.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected gracefully"),
            Err(e) => match e {
                ConnectionError::ClientDisconnected => {
                    debug!(client = %self.addr, "Client disconnected")
                }
                ConnectionError::IoError(io_err)
                    if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    debug!(client = %self.addr, "Connection reset by client")
                }
                _ => warn!(client = %self.addr, error = %e, "Connection error"),
            },
        }

        self.stats.connection_closed();
        result
    }

    /// The main read-dispatch-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            let frame = self.read_frame().await?;
            let response = self.process_frame(&frame)?;
            self.stats.frame_processed();
            self.send_response(&response).await?;
        }
    }

    /// Reads one frame from the socket.
    ///
    /// Whatever a single read delivers is the frame; the codec decides
    /// whether it is one complete message.
    async fn read_frame(&mut self) -> Result<BytesMut, ConnectionError> {
        self.buffer.clear();
        if self.buffer.capacity() < INITIAL_BUFFER_SIZE {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;
        if n == 0 {
            return Err(ConnectionError::ClientDisconnected);
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read frame");

        if self.buffer.len() > MAX_FRAME_SIZE {
            return Err(ConnectionError::FrameTooLarge(self.buffer.len()));
        }

        Ok(self.buffer.split())
    }

    /// Parses a frame, runs the command, and encodes the reply.
    ///
    /// Parse failures are terminal for this message only: they become a
    /// wire error reply and the connection keeps serving.
    fn process_frame(&self, frame: &[u8]) -> Result<Encoded, ConnectionError> {
        let reply = match parse_message(frame) {
            Ok((request, consumed)) => {
                trace!(client = %self.addr, consumed, "Parsed message");
                self.command_handler.execute(request)
            }
            Err(e) => {
                warn!(client = %self.addr, error = %e, "Invalid message");
                Reply::error("ERR invalid request")
            }
        };

        match encode(&reply.value, reply.kind) {
            Ok(encoded) => Ok(encoded),
            Err(e) => {
                warn!(client = %self.addr, error = %e, "Reply failed to encode");
                Ok(encode(&Value::error("ERR serialisation failed"), Kind::Error)?)
            }
        }
    }

    /// Sends an encoded reply to the client.
    async fn send_response(&mut self, response: &Encoded) -> Result<(), ConnectionError> {
        self.stream.write_all(&response.message).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(response.bytes_produced);
        trace!(
            client = %self.addr,
            bytes = response.bytes_produced,
            "Sent response"
        );
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Client disconnected normally
    #[error("Client disconnected")]
    ClientDisconnected,

    /// Frame size limit exceeded
    #[error("frame too large: {0} bytes")]
    FrameTooLarge(usize),

    /// A static error reply failed to encode
    #[error("Encode error: {0}")]
    EncodeError(#[from] EncodeError),
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler and
/// runs it to completion.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, command_handler, stats);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::IoError(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}
