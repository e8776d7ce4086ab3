//! Error types for the protocol layer.
//!
//! Each crate in noughts defines its own error enum. A `ProtocolError` always
//! means bytes could not be turned into a message (or back), never that the
//! message itself was refused by the game.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown `type` tag,
    /// or a missing / ill-typed field for the given kind.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame could not be a message at all (e.g. it was empty).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
