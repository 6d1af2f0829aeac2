//! Client transport abstraction for Gridword.
//!
//! Provides the [`Connection`] trait: the minimal contract the session core
//! needs from a socket (send a text frame, receive the next one, close).
//! The game protocol is one JSON object per text frame, so connections move
//! `String`s rather than raw bytes.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket client via `tokio-tungstenite`
//! - `memory` — in-process connection pair, used by tests and bots

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "memory")]
pub use memory::{MemoryConnection, MemoryPeer};
#[cfg(feature = "websocket")]
pub use websocket::WebSocketConnection;

use std::fmt;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A single client connection to the game server.
///
/// Implementations must be cancel-safe in [`recv`](Connection::recv): the
/// client run loop polls it inside `tokio::select!` and drops the future
/// whenever another branch wins.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends one text frame to the server.
    async fn send(&self, text: &str) -> Result<(), Self::Error>;

    /// Receives the next text frame from the server.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<String>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Whether the connection is open and ready to send.
    fn is_open(&self) -> bool;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_round_trips_raw_value() {
        let id = ConnectionId::new(42);
        assert_eq!(id, ConnectionId::new(id.into_inner()));
        assert_ne!(id, ConnectionId::new(43));
    }

    #[test]
    fn test_connection_id_log_format() {
        assert_eq!(format!("{}", ConnectionId::new(7)), "conn-7");
    }
}
