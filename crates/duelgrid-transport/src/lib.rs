//! Transport layer for Duelgrid.
//!
//! Provides the [`Transport`] and [`Connection`] traits the server is
//! written against, plus a WebSocket implementation. One connection is one
//! client; the rest of the stack identifies it by its [`ConnectionId`].
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Opaque identifier for a live connection.
///
/// Rooms and the connection registry key participants by this id, so it
/// must stay unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
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

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// A single connection that can send and receive frames.
///
/// Sending and receiving are independent: a task blocked in [`recv`]
/// must not prevent another task from calling [`send`] on the same
/// connection.
///
/// [`recv`]: Connection::recv
/// [`send`]: Connection::send
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Sends a transport-level keep-alive. A live peer answers it
    /// without involving the application.
    async fn ping(&self) -> Result<(), Self::Error>;

    /// Time since the peer last sent anything, control frames included.
    fn idle_for(&self) -> Duration;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_works_as_map_key() {
        use std::collections::HashMap;
        let mut rooms = HashMap::new();
        rooms.insert(ConnectionId::new(1), "R1");
        rooms.insert(ConnectionId::new(2), "R2");
        assert_eq!(rooms[&ConnectionId::new(1)], "R1");
        assert_ne!(ConnectionId::new(1), ConnectionId::new(2));
    }
}
