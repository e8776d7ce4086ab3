//! Rematch negotiation between the two players of a finished game.

use std::time::Instant;

use noughts_protocol::{GameId, GameKind, GameStatus, PlayerId, ServerMessage, Symbol};
use noughts_transport::ConnectionId;

use crate::{Game, GameError, Orchestrator, Participant};

impl Orchestrator {
    /// Records the caller's rematch offer. Once both players have offered,
    /// a fresh game replaces the finished one.
    pub fn request_rematch(
        &mut self,
        conn: ConnectionId,
        player: Option<PlayerId>,
        game: Option<GameId>,
    ) -> Result<(), GameError> {
        let player_id = player.ok_or(GameError::MissingIdentity("playerId"))?;
        let game_id = game.ok_or(GameError::MissingIdentity("gameId"))?;

        let game = self
            .games
            .get(game_id)
            .ok_or_else(|| GameError::RematchNotPossible(format!("{game_id} not found")))?;
        if game.status() != GameStatus::Finished {
            return Err(GameError::RematchNotPossible(format!(
                "{game_id} is not finished"
            )));
        }
        if game.member(&player_id).is_none() {
            return Err(GameError::RematchNotPossible(format!(
                "{player_id} is not a player in {game_id}"
            )));
        }
        if game.members().len() != Game::SEATS {
            return Err(GameError::RematchNotPossible(
                "your opponent has left".into(),
            ));
        }

        // If this offer completes the pair, both players must still be here
        // and neither may have moved on.
        let completes = game
            .members()
            .iter()
            .all(|m| m.player_id == player_id || game.has_offered_rematch(&m.player_id));
        if completes && !game.members().iter().all(Participant::is_connected) {
            return Err(GameError::RematchNotPossible(
                "your opponent is not connected".into(),
            ));
        }
        if completes && game.members().iter().any(|m| self.is_engaged(&m.player_id)) {
            return Err(GameError::RematchNotPossible(
                "a player is already queued or in another game".into(),
            ));
        }

        let game = self
            .games
            .get_mut(game_id)
            .ok_or(GameError::SessionNotFound(game_id))?;
        let accepted = game.offer_rematch(player_id.clone(), Instant::now());
        if let Some(opponent) = game.opponent_of(&player_id).and_then(|o| o.connection) {
            self.registry.send(
                opponent,
                ServerMessage::RematchOffered {
                    from_player_id: player_id.clone(),
                    message: "Your opponent wants a rematch.".into(),
                },
            );
        }
        tracing::debug!(%conn, %game_id, %player_id, "rematch offered");

        if accepted {
            self.start_rematch(game_id);
        }
        Ok(())
    }

    /// Replaces a finished game with a fresh one for the same two players.
    fn start_rematch(&mut self, old_id: GameId) {
        let Some(old) = self.games.remove(old_id) else {
            return;
        };
        let [first, second] = old.members() else {
            return;
        };
        let (x, o) = if self.coin.flip() {
            (first, second)
        } else {
            (second, first)
        };
        let turn = if self.coin.flip() { Symbol::X } else { Symbol::O };

        let game_id = self.games.allocate_id();
        let game = Game::paired(
            game_id,
            old.kind(),
            Participant::new(x.player_id.clone(), Symbol::X, x.connection),
            Participant::new(o.player_id.clone(), Symbol::O, o.connection),
            turn,
            Instant::now(),
        );

        for member in game.members() {
            if let Some(conn) = member.connection {
                self.registry.attach(conn, member.player_id.clone(), game_id);
                self.registry
                    .send(conn, ServerMessage::RematchAccepted(game.seat(member)));
            }
        }
        tracing::info!(%old_id, %game_id, %turn, "rematch started");
        self.games.insert(game);

        if old.kind() == GameKind::Custom {
            self.publish_lobby();
        }
    }
}
