//! Unified error type for the noughts server.

use noughts_game::GameError;
use noughts_protocol::ProtocolError;
use noughts_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each variant lets `?` convert lower-layer errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum NoughtsError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A refused game operation, when driving the orchestrator directly.
    #[error(transparent)]
    Game(#[from] GameError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let noughts_err: NoughtsError = err.into();
        assert!(matches!(noughts_err, NoughtsError::Transport(_)));
        assert!(noughts_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let noughts_err: NoughtsError = err.into();
        assert!(matches!(noughts_err, NoughtsError::Protocol(_)));
    }

    #[test]
    fn test_from_game_error() {
        let err = GameError::SessionNotFound(noughts_protocol::GameId(1));
        let noughts_err: NoughtsError = err.into();
        assert!(matches!(noughts_err, NoughtsError::Game(_)));
        assert_eq!(noughts_err.to_string(), "game game-1 not found");
    }
}
