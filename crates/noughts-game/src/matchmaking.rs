//! Matchmaking: enqueue, cancel, and pair the two oldest live entries.

use std::time::Instant;

use noughts_protocol::{GameKind, PlayerId, ServerMessage, Symbol};
use noughts_transport::ConnectionId;

use crate::queue::QueueEntry;
use crate::{Game, GameError, Orchestrator, Participant};

/// Result of one [`Orchestrator::pair_head`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PairAttempt {
    TooFew,
    Started,
    /// At least one of the pair was dead; survivors are back at the front.
    Requeued,
}

impl Orchestrator {
    /// Puts the caller in the matchmaking queue and runs a pairing pass.
    pub fn request_matchmaking(
        &mut self,
        conn: ConnectionId,
        player: Option<PlayerId>,
    ) -> Result<(), GameError> {
        let player_id = player.ok_or(GameError::MissingIdentity("playerId"))?;
        if self.is_engaged(&player_id) {
            return Err(GameError::AlreadyQueuedOrInGame(player_id));
        }

        self.queue.push_back(QueueEntry {
            player_id: player_id.clone(),
            connection: conn,
        });
        self.registry.send(
            conn,
            ServerMessage::MatchmakingQueued {
                message: "Added to the matchmaking queue. Waiting for an opponent...".into(),
            },
        );
        tracing::info!(%player_id, %conn, queue = self.queue.len(), "player queued");

        self.sweep_matchmaking();
        Ok(())
    }

    /// Takes the caller out of the queue.
    pub fn cancel_matchmaking(
        &mut self,
        conn: ConnectionId,
        player: Option<PlayerId>,
    ) -> Result<(), GameError> {
        let player_id = player.ok_or(GameError::MissingIdentity("playerId"))?;
        if !self.queue.remove_player(&player_id) {
            return Err(GameError::NotQueued(player_id));
        }

        self.registry.send(
            conn,
            ServerMessage::MatchmakingCancelled {
                message: "Matchmaking cancelled.".into(),
            },
        );
        tracing::info!(%player_id, queue = self.queue.len(), "matchmaking cancelled");
        Ok(())
    }

    /// Pairs waiting players. Returns how many games were started.
    ///
    /// Entries whose connection is gone are discarded first, then pairs are
    /// taken from the head of the queue until fewer than two remain or a
    /// pair falls apart.
    pub fn sweep_matchmaking(&mut self) -> usize {
        let registry = &self.registry;
        let dropped = self.queue.retain(|e| registry.is_live(e.connection));
        if dropped > 0 {
            tracing::debug!(dropped, queue = self.queue.len(), "pruned dead queue entries");
        }

        let mut started = 0;
        while self.pair_head() == PairAttempt::Started {
            started += 1;
        }
        started
    }

    /// Pops the two oldest entries and starts a game for them.
    ///
    /// If either is dead at this point, the live one goes back to the front
    /// of the queue and is told it is still waiting; the next sweep retries.
    pub(crate) fn pair_head(&mut self) -> PairAttempt {
        if self.queue.len() < 2 {
            return PairAttempt::TooFew;
        }
        let (Some(first), Some(second)) = (self.queue.pop_front(), self.queue.pop_front()) else {
            return PairAttempt::TooFew;
        };

        let first_live = self.registry.is_live(first.connection);
        let second_live = self.registry.is_live(second.connection);
        if first_live && second_live {
            self.start_match(first, second);
            return PairAttempt::Started;
        }

        // Pushed in reverse so the older entry ends up first.
        for (entry, live) in [(second, second_live), (first, first_live)] {
            if !live {
                continue;
            }
            self.registry.send(
                entry.connection,
                ServerMessage::MatchmakingQueued {
                    message: "Your opponent disconnected. Still waiting for an opponent..."
                        .into(),
                },
            );
            self.queue.push_front(entry);
        }
        PairAttempt::Requeued
    }

    fn start_match(&mut self, first: QueueEntry, second: QueueEntry) {
        let (x, o) = if self.coin.flip() {
            (first, second)
        } else {
            (second, first)
        };

        let game_id = self.games.allocate_id();
        let game = Game::paired(
            game_id,
            GameKind::Matchmaking,
            Participant::new(x.player_id.clone(), Symbol::X, Some(x.connection)),
            Participant::new(o.player_id.clone(), Symbol::O, Some(o.connection)),
            Symbol::X,
            Instant::now(),
        );

        for member in game.members() {
            if let Some(conn) = member.connection {
                self.registry.attach(conn, member.player_id.clone(), game_id);
                self.registry
                    .send(conn, ServerMessage::MatchFound(game.seat(member)));
            }
        }
        tracing::info!(
            %game_id,
            x = %x.player_id,
            o = %o.player_id,
            "match found"
        );
        self.games.insert(game);
    }
}
