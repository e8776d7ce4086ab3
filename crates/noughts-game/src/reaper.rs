//! Idle reaper: evicts abandoned and stale games.

use std::time::Instant;

use noughts_protocol::{GameId, GameKind, GameStatus};

use crate::{Game, Orchestrator};

impl Orchestrator {
    /// Deletes games that nobody will come back to. Returns how many.
    ///
    /// - custom: every player disconnected, or idle past `stale_after`
    /// - matchmaking: finished and idle past `stale_after`
    ///
    /// Republishes the lobby if a custom game went away.
    pub fn reap_idle(&mut self, now: Instant) -> usize {
        let stale_after = self.config.stale_after;
        let is_dead = |game: &Game| {
            let stale = game.idle_for(now) > stale_after;
            match game.kind() {
                GameKind::Custom => stale || game.all_disconnected(),
                GameKind::Matchmaking => stale && game.status() == GameStatus::Finished,
            }
        };
        let doomed: Vec<GameId> = self
            .games
            .iter()
            .filter(|g| is_dead(*g))
            .map(Game::id)
            .collect();

        let mut lobby_changed = false;
        for game_id in &doomed {
            if let Some(game) = self.games.remove(*game_id) {
                tracing::info!(%game_id, kind = ?game.kind(), "idle game reaped");
                lobby_changed |= game.kind() == GameKind::Custom;
            }
        }

        if lobby_changed {
            self.publish_lobby();
        }
        doomed.len()
    }
}
