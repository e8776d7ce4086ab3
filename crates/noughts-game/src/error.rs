//! Error types for the game layer.

use noughts_protocol::{ErrorKind, GameId, PlayerId, ServerMessage};

/// Why an orchestrator operation was refused.
///
/// Every variant is local to the request that caused it: the operation is
/// abandoned with no state change and the sender gets an `error` frame.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The frame could not be decoded into a known message.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// A required `playerId` or `gameId` was neither sent nor bound.
    #[error("missing {0}")]
    MissingIdentity(&'static str),

    /// The game does not exist.
    #[error("game {0} not found")]
    SessionNotFound(GameId),

    /// Both seats are taken.
    #[error("game {0} is full")]
    SessionFull(GameId),

    /// The game is in a state that doesn't allow this operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Bad index, wrong turn, occupied cell, or not a player here.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// The player already holds a queue slot or a seat in an unfinished game.
    #[error("player {0} is already queued or in an active game")]
    AlreadyQueuedOrInGame(PlayerId),

    /// Cancel was requested for a player that isn't queued.
    #[error("player {0} is not in the matchmaking queue")]
    NotQueued(PlayerId),

    #[error("rematch not possible: {0}")]
    RematchNotPossible(String),
}

impl GameError {
    /// The wire category for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedMessage(_) => ErrorKind::MalformedMessage,
            Self::MissingIdentity(_) => ErrorKind::MissingIdentity,
            Self::SessionNotFound(_) => ErrorKind::SessionNotFound,
            Self::SessionFull(_) => ErrorKind::SessionFull,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::InvalidMove(_) => ErrorKind::InvalidMove,
            Self::AlreadyQueuedOrInGame(_) => ErrorKind::AlreadyQueuedOrInGame,
            Self::NotQueued(_) => ErrorKind::NotQueued,
            Self::RematchNotPossible(_) => ErrorKind::RematchNotPossible,
        }
    }

    /// The `error` frame sent back to the offending connection.
    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::Error {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}
