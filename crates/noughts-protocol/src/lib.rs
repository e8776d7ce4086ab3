//! Wire protocol for noughts.
//!
//! This crate defines the "language" that browser clients and the server
//! speak:
//!
//! - **Types** ([`Inbound`], [`ClientMessage`], [`ServerMessage`], [`Board`],
//!   etc.): the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer sits between transport (raw frames) and the game
//! orchestrator. It doesn't know about connections or games in progress.
//!
//! ```text
//! Transport (bytes) → Protocol (Inbound / ServerMessage) → Orchestrator
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Board, ClientMessage, ErrorKind, GameId, GameKind, GameStatus, Inbound,
    LobbyEntry, PlayerId, Seat, ServerMessage, Symbol, Verdict,
};
