//! Transport layer for noughts.
//!
//! The server is written against two small traits: a [`Transport`] hands out
//! new connections and a [`Connection`] moves whole messages in both
//! directions. Everything above this crate identifies a socket only by its
//! [`ConnectionId`]; a clean close shows up as `recv` returning `Ok(None)`.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
mod id;
#[cfg(feature = "websocket")]
mod websocket;

use std::net::SocketAddr;

pub use error::TransportError;
pub use id::ConnectionId;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

/// Listens for and hands out new connections.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next peer and completes its handshake.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// The address the listener is bound to.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// One peer, exchanging discrete messages.
///
/// `send` and `recv` take `&self` and may run concurrently: one task can sit
/// in `recv` while another writes.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Writes one message.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Reads the next message. `Ok(None)` means the peer closed cleanly.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    fn id(&self) -> ConnectionId;

    /// Remote address, when the transport knows it.
    fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }
}
