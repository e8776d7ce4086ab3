//! The orchestrator: owns every game, the queue and the connection table,
//! and applies client messages to them.
//!
//! # Concurrency note
//!
//! `Orchestrator` is a plain synchronous state machine. The server wraps it in
//! a single `tokio::sync::Mutex`; message handlers and the background sweeps
//! all take that lock, call one method, and release. Nothing in here awaits:
//! outbound messages go into per-connection unbounded channels.
//!
//! Matchmaking, rematch, lobby and reaper operations live in their own
//! modules as further `impl Orchestrator` blocks.

use std::time::Instant;

use noughts_protocol::{
    ClientMessage, GameId, GameKind, GameStatus, Inbound, PlayerId, ProtocolError, ServerMessage,
    Symbol,
};
use noughts_registry::{ConnectionRegistry, Outbox};
use noughts_transport::ConnectionId;
use rand::Rng;

use crate::coin::{CoinFlip, RandomCoin};
use crate::game::cell_index;
use crate::outcome::Outcome;
use crate::{Game, GameError, GameStore, MatchQueue, OrchestratorConfig, Participant};

/// Single owner of all game state.
pub struct Orchestrator {
    pub(crate) config: OrchestratorConfig,
    pub(crate) registry: ConnectionRegistry,
    pub(crate) games: GameStore,
    pub(crate) queue: MatchQueue,
    pub(crate) coin: Box<dyn CoinFlip>,
}

impl Orchestrator {
    /// Creates an orchestrator that assigns symbols with a fair random coin.
    pub fn new(config: OrchestratorConfig) -> Self {
        Self::with_coin(config, RandomCoin)
    }

    /// Creates an orchestrator with a custom coin.
    pub fn with_coin(config: OrchestratorConfig, coin: impl CoinFlip + 'static) -> Self {
        Self {
            config,
            registry: ConnectionRegistry::new(),
            games: GameStore::new(),
            queue: MatchQueue::new(),
            coin: Box::new(coin),
        }
    }

    // =====================================================================
    // Connection lifecycle
    // =====================================================================

    /// Starts tracking a new connection.
    pub fn connect(&mut self, conn: ConnectionId, outbox: Outbox) {
        self.registry.register(conn, outbox);
    }

    /// Cleans up after a closed connection.
    ///
    /// Drops its queue entries, marks every seat it held as disconnected,
    /// tells connected opponents, and deletes matchmaking games that were
    /// still in play. Safe to call more than once.
    pub fn disconnect(&mut self, conn: ConnectionId) {
        let binding = self.registry.unregister(conn);
        let dequeued = self.queue.remove_connection(conn);
        if dequeued > 0 {
            tracing::debug!(%conn, queue = self.queue.len(), "dropped queue entry on disconnect");
        }

        let mut doomed = Vec::new();
        for game in self.games.iter_mut() {
            let dropped = game.disconnect(conn);
            if dropped.is_empty() {
                continue;
            }
            let game_id = game.id();
            tracing::info!(%conn, %game_id, "player disconnected");
            for symbol in dropped {
                for member in game.members() {
                    if member.symbol == symbol {
                        continue;
                    }
                    if let Some(opponent) = member.connection {
                        self.registry
                            .send(opponent, ServerMessage::OpponentDisconnected { symbol });
                    }
                }
            }
            if game.kind() == GameKind::Matchmaking && game.status() == GameStatus::Playing {
                doomed.push(game_id);
            }
        }

        for game_id in doomed {
            self.games.remove(game_id);
            tracing::info!(%game_id, "matchmaking game deleted after disconnect");
        }

        if binding.is_some() {
            tracing::debug!(%conn, "connection closed");
        }
    }

    // =====================================================================
    // Dispatch
    // =====================================================================

    /// Applies one decoded client frame.
    ///
    /// The identity fields carried by the frame are bound to the connection
    /// first; each operation then uses the connection's binding, so a frame
    /// may omit identity the connection already claimed. Any refusal is sent
    /// back to `conn` as an `error` frame.
    pub fn handle(&mut self, conn: ConnectionId, inbound: Inbound) {
        let Inbound {
            player_id,
            game_id,
            message,
        } = inbound;
        let player_id = player_id.filter(|p| !p.is_blank());
        self.registry.bind(conn, player_id, game_id);

        let binding = self.registry.binding(conn).cloned().unwrap_or_default();
        let player = binding.player_id;
        let game = binding.game_id;

        let result = match message {
            ClientMessage::CreateGame => self.create_game(conn, player).map(drop),
            ClientMessage::JoinGame => self.join_game(conn, player, game),
            ClientMessage::RequestMatchmaking => self.request_matchmaking(conn, player),
            ClientMessage::CancelMatchmaking => self.cancel_matchmaking(conn, player),
            ClientMessage::MakeMove { index } => self.make_move(conn, player, game, index),
            ClientMessage::LeaveGame => self.leave_game(conn, player, game),
            ClientMessage::RematchRequest => self.request_rematch(conn, player, game),
            ClientMessage::RequestLobby => {
                self.send_lobby(conn);
                Ok(())
            }
        };

        if let Err(err) = result {
            self.reject(conn, &err);
        }
    }

    /// Replies to a frame that could not be decoded.
    pub fn reject_malformed(&mut self, conn: ConnectionId, err: &ProtocolError) {
        self.reject(conn, &GameError::MalformedMessage(err.to_string()));
    }

    fn reject(&self, conn: ConnectionId, err: &GameError) {
        tracing::debug!(%conn, kind = ?err.kind(), %err, "request rejected");
        self.registry.send(conn, err.to_message());
    }

    // =====================================================================
    // Custom games
    // =====================================================================

    /// Opens a custom game with the caller as X. Generates an identity when
    /// none was supplied.
    pub fn create_game(
        &mut self,
        conn: ConnectionId,
        player: Option<PlayerId>,
    ) -> Result<GameId, GameError> {
        let player_id = player.unwrap_or_else(generate_player_id);
        if self.is_engaged(&player_id) {
            return Err(GameError::AlreadyQueuedOrInGame(player_id));
        }

        let game_id = self.games.allocate_id();
        let creator = Participant::new(player_id.clone(), Symbol::X, Some(conn));
        let game = Game::open(game_id, creator, Instant::now());
        let seat = game.seat_for(&player_id);
        self.games.insert(game);

        self.registry.attach(conn, player_id.clone(), game_id);
        if let Some(seat) = seat {
            self.registry.send(conn, ServerMessage::GameCreated(seat));
        }
        tracing::info!(%game_id, %player_id, "custom game created");

        self.publish_lobby();
        Ok(game_id)
    }

    /// Joins a custom game, or reconnects to it if the caller already holds
    /// a seat there.
    pub fn join_game(
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
            .ok_or(GameError::SessionNotFound(game_id))?;
        if game.kind() != GameKind::Custom {
            return Err(GameError::InvalidState(format!(
                "{game_id} is a matchmaking game"
            )));
        }
        if game.member(&player_id).is_some() {
            return self.rejoin(conn, player_id, game_id);
        }
        if game.members().len() >= Game::SEATS {
            return Err(GameError::SessionFull(game_id));
        }
        if game.status() != GameStatus::Waiting {
            return Err(GameError::InvalidState(format!(
                "{game_id} is {}",
                game.status()
            )));
        }
        if self.is_engaged(&player_id) {
            return Err(GameError::AlreadyQueuedOrInGame(player_id));
        }

        let game = self
            .games
            .get_mut(game_id)
            .ok_or(GameError::SessionNotFound(game_id))?;
        let symbol = game.seat_second(player_id.clone(), conn, Instant::now());

        self.registry.attach(conn, player_id.clone(), game_id);
        for member in game.members() {
            let Some(member_conn) = member.connection else {
                continue;
            };
            let msg = if member.player_id == player_id {
                ServerMessage::GameJoined(game.seat(member))
            } else {
                ServerMessage::OpponentJoined(game.seat(member))
            };
            self.registry.send(member_conn, msg);
        }
        tracing::info!(%game_id, %player_id, %symbol, "player joined");

        self.publish_lobby();
        Ok(())
    }

    fn rejoin(
        &mut self,
        conn: ConnectionId,
        player_id: PlayerId,
        game_id: GameId,
    ) -> Result<(), GameError> {
        let game = self
            .games
            .get_mut(game_id)
            .ok_or(GameError::SessionNotFound(game_id))?;
        let symbol = game
            .reconnect(&player_id, conn, Instant::now())
            .ok_or(GameError::SessionNotFound(game_id))?;

        self.registry.attach(conn, player_id.clone(), game_id);
        if let Some(seat) = game.seat_for(&player_id) {
            self.registry.send(conn, ServerMessage::Reconnected(seat));
        }
        if let Some(opponent) = game.opponent_of(&player_id).and_then(|o| o.connection) {
            self.registry
                .send(opponent, ServerMessage::OpponentReconnected { symbol });
        }
        tracing::info!(%game_id, %player_id, %conn, "player reconnected");
        Ok(())
    }

    // =====================================================================
    // Play
    // =====================================================================

    /// Places the caller's symbol at `index` and announces the result.
    pub fn make_move(
        &mut self,
        conn: ConnectionId,
        player: Option<PlayerId>,
        game: Option<GameId>,
        index: i64,
    ) -> Result<(), GameError> {
        let cell = cell_index(index)?;
        let (Some(player_id), Some(game_id)) = (player, game) else {
            return Err(GameError::InvalidMove("no game to move in".into()));
        };

        let game = self
            .games
            .get_mut(game_id)
            .ok_or_else(|| GameError::InvalidMove(format!("{game_id} not found")))?;
        let outcome = game.apply_move(&player_id, cell, Instant::now())?;

        let msg = match outcome.verdict() {
            Some(winner) => ServerMessage::GameOver {
                board: *game.board(),
                winner,
            },
            None => ServerMessage::GameState {
                board: *game.board(),
                turn: game.turn(),
                status: game.status(),
            },
        };
        for member_conn in game.connections() {
            self.registry.send(member_conn, msg.clone());
        }

        tracing::debug!(%conn, %game_id, %player_id, cell, "move applied");
        if outcome == Outcome::Pending {
            return Ok(());
        }

        tracing::info!(%game_id, ?outcome, "game finished");
        if game.kind() == GameKind::Custom {
            self.publish_lobby();
        }
        Ok(())
    }

    // =====================================================================
    // Leaving
    // =====================================================================

    /// Takes the caller out of a game. Always confirms with `gameLeft` and
    /// clears the connection's binding.
    pub fn leave_game(
        &mut self,
        conn: ConnectionId,
        player: Option<PlayerId>,
        game: Option<GameId>,
    ) -> Result<(), GameError> {
        let player_id = player.ok_or(GameError::MissingIdentity("playerId"))?;
        let game_id = game.ok_or(GameError::MissingIdentity("gameId"))?;

        if let Some(game) = self.games.get_mut(game_id) {
            if game.remove_member(&player_id).is_some() {
                tracing::info!(%game_id, %player_id, "player left");
                let kind = game.kind();
                let remaining: Vec<ConnectionId> = game.connections().collect();

                if kind == GameKind::Custom && game.members().len() == 1 {
                    game.reopen(Instant::now());
                    self.notify_left(&remaining, "Your opponent left. Waiting for a new player.");
                    self.publish_lobby();
                } else {
                    self.games.remove(game_id);
                    tracing::info!(%game_id, "game deleted after leave");
                    self.notify_left(&remaining, "Your opponent left the game.");
                    if kind == GameKind::Custom {
                        self.publish_lobby();
                    }
                }
            }
        }

        self.registry.clear(conn);
        self.registry.send(
            conn,
            ServerMessage::GameLeft {
                message: "You left the game.".into(),
            },
        );
        Ok(())
    }

    fn notify_left(&self, connections: &[ConnectionId], message: &str) {
        for conn in connections {
            self.registry.send(
                *conn,
                ServerMessage::OpponentLeft {
                    message: message.into(),
                },
            );
        }
    }

    // =====================================================================
    // Queries
    // =====================================================================

    /// `true` if the player holds a queue slot or a seat in an unfinished game.
    pub fn is_engaged(&self, player_id: &PlayerId) -> bool {
        self.queue.contains(player_id) || self.games.active_game_of(player_id).is_some()
    }

    pub fn game(&self, game_id: GameId) -> Option<&Game> {
        self.games.get(game_id)
    }

    /// Iterates over every game.
    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.games.iter()
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// `true` if `player_id` is waiting in the matchmaking queue.
    pub fn is_queued(&self, player_id: &PlayerId) -> bool {
        self.queue.contains(player_id)
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }
}

/// A fresh `player_xxxxxxxx` identity.
fn generate_player_id() -> PlayerId {
    PlayerId::new(format!("player_{:08x}", rand::rng().random::<u32>()))
}
