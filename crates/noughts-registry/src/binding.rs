//! Binding types: what a connection claims to be.

use noughts_protocol::{GameId, PlayerId, ServerMessage};
use tokio::sync::mpsc;

/// Outbound channel for one connection.
///
/// Unbounded so that pushing a message never waits: the orchestrator sends
/// while holding its lock, and a writer task drains the other end onto the
/// socket. Once the writer is gone `is_closed()` reports `true`, which is how
/// liveness is judged.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// The identity a connection has claimed.
///
/// Both halves are optional: a fresh connection has claimed nothing, and a
/// player browsing the lobby has an identity but no game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    /// Stable player identity supplied by the client.
    pub player_id: Option<PlayerId>,

    /// The game the connection is playing (or last asked about).
    pub game_id: Option<GameId>,
}

impl Binding {
    /// `true` if nothing has been claimed yet.
    pub fn is_empty(&self) -> bool {
        self.player_id.is_none() && self.game_id.is_none()
    }
}
