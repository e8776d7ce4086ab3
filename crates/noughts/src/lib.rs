//! # noughts
//!
//! Real-time two-player noughts and crosses over WebSockets.
//!
//! Players create or join custom games by id, or wait in an anonymous
//! matchmaking queue. The server keeps every game in memory, applies moves,
//! detects wins and draws, lets players reconnect to custom games, negotiates
//! rematches and publishes a lobby of open games.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use noughts::prelude::*;
//!
//! # async fn start() -> Result<(), NoughtsError> {
//! let server = NoughtsServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;
mod timers;

pub use error::NoughtsError;
pub use server::{NoughtsServer, NoughtsServerBuilder};

pub mod prelude {
    //! Everything needed to run a server or drive the orchestrator.

    pub use crate::{NoughtsError, NoughtsServer, NoughtsServerBuilder};
    pub use noughts_game::{
        CoinFlip, GameError, Orchestrator, OrchestratorConfig, RandomCoin,
    };
    pub use noughts_protocol::{
        Board, ClientMessage, Codec, ErrorKind, GameId, GameKind, GameStatus, Inbound,
        JsonCodec, LobbyEntry, PlayerId, Seat, ServerMessage, Symbol, Verdict,
    };
    pub use noughts_transport::ConnectionId;
}
