//! The connection registry: every live connection and what it claims.
//!
//! # Concurrency note
//!
//! `ConnectionRegistry` is NOT thread-safe by itself; it uses a plain
//! `HashMap`. It lives inside the orchestrator, which is serialized behind a
//! single lock at the server level, so no extra locking happens here.

use std::collections::HashMap;

use noughts_protocol::{GameId, PlayerId, ServerMessage};
use noughts_transport::ConnectionId;

use crate::{Binding, Outbox};

struct ConnectionEntry {
    outbox: Outbox,
    binding: Binding,
}

/// Maps each connection to its outbox and its claimed identity.
///
/// ## Lifecycle
///
/// ```text
/// register() ──→ bind() / attach() ... ──→ unregister()
///                     │                         │
///                     ▼                         ▼
///              binding overwritten        binding returned to the
///              by every inbound frame     caller for disconnect handling
/// ```
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a connection with no identity bound.
    pub fn register(&mut self, conn: ConnectionId, outbox: Outbox) {
        self.connections.insert(
            conn,
            ConnectionEntry {
                outbox,
                binding: Binding::default(),
            },
        );
        tracing::debug!(%conn, connections = self.connections.len(), "connection registered");
    }

    /// Stops tracking a connection and hands back whatever it had claimed.
    ///
    /// Returns `None` if the connection was already gone, so calling this
    /// twice for the same connection is harmless.
    pub fn unregister(&mut self, conn: ConnectionId) -> Option<Binding> {
        let entry = self.connections.remove(&conn)?;
        tracing::debug!(%conn, connections = self.connections.len(), "connection unregistered");
        Some(entry.binding)
    }

    /// Records the identity fields carried by an inbound frame.
    ///
    /// Fields that are present overwrite the previous binding; absent
    /// fields leave it as it was, so a frame that carries nothing keeps
    /// whatever the connection already claimed.
    pub fn bind(
        &mut self,
        conn: ConnectionId,
        player_id: Option<PlayerId>,
        game_id: Option<GameId>,
    ) {
        let Some(entry) = self.connections.get_mut(&conn) else {
            return;
        };
        if let Some(player_id) = player_id {
            entry.binding.player_id = Some(player_id);
        }
        if let Some(game_id) = game_id {
            entry.binding.game_id = Some(game_id);
        }
    }

    /// Binds the connection to exactly this player and game.
    pub fn attach(&mut self, conn: ConnectionId, player_id: PlayerId, game_id: GameId) {
        if let Some(entry) = self.connections.get_mut(&conn) {
            entry.binding = Binding {
                player_id: Some(player_id),
                game_id: Some(game_id),
            };
        }
    }

    /// Forgets everything the connection claimed, keeping it registered.
    pub fn clear(&mut self, conn: ConnectionId) {
        if let Some(entry) = self.connections.get_mut(&conn) {
            entry.binding = Binding::default();
        }
    }

    /// The current binding of a connection.
    pub fn binding(&self, conn: ConnectionId) -> Option<&Binding> {
        self.connections.get(&conn).map(|entry| &entry.binding)
    }

    /// `true` if the connection is registered and its writer is still
    /// draining the outbox.
    pub fn is_live(&self, conn: ConnectionId) -> bool {
        self.connections
            .get(&conn)
            .is_some_and(|entry| !entry.outbox.is_closed())
    }

    /// Queues a message for one connection. Fire-and-forget: returns `false`
    /// if the connection is unknown or its writer has gone away.
    pub fn send(&self, conn: ConnectionId, msg: ServerMessage) -> bool {
        match self.connections.get(&conn) {
            Some(entry) => entry.outbox.send(msg).is_ok(),
            None => false,
        }
    }

    /// Queues a message for every registered connection.
    pub fn broadcast(&self, msg: &ServerMessage) {
        for entry in self.connections.values() {
            let _ = entry.outbox.send(msg.clone());
        }
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` if no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
