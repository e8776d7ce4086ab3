//! Lobby publishing: the list of custom games waiting for a second player.

use std::time::Instant;

use noughts_protocol::{LobbyEntry, ServerMessage};
use noughts_transport::ConnectionId;

use crate::Orchestrator;

impl Orchestrator {
    /// Joinable games as of `now`, ordered by id.
    ///
    /// A game is listed while it is a custom game in `Waiting` with exactly
    /// one player and has seen activity within the freshness window. The
    /// listed creator is the player holding the open game.
    pub fn lobby_entries(&self, now: Instant) -> Vec<LobbyEntry> {
        let freshness = self.config.lobby_freshness;
        let mut entries: Vec<LobbyEntry> = self
            .games
            .iter()
            .filter(|g| g.is_joinable(now, freshness))
            .filter_map(|g| {
                g.members().first().map(|host| LobbyEntry {
                    game_id: g.id(),
                    creator_id: host.player_id.clone(),
                    player_count: g.members().len(),
                })
            })
            .collect();
        entries.sort_by_key(|e| e.game_id);
        entries
    }

    /// Sends a lobby snapshot to one connection.
    pub fn send_lobby(&self, conn: ConnectionId) {
        let games = self.lobby_entries(Instant::now());
        self.registry.send(conn, ServerMessage::LobbyUpdate { games });
    }

    /// Broadcasts a lobby snapshot to every connection.
    pub fn publish_lobby(&self) {
        let games = self.lobby_entries(Instant::now());
        tracing::debug!(listed = games.len(), "lobby published");
        self.registry.broadcast(&ServerMessage::LobbyUpdate { games });
    }
}
