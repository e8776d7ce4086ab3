//! Game session and matchmaking orchestrator for noughts.
//!
//! Everything that has real invariants lives here:
//!
//! - **Session store** ([`GameStore`], [`Game`], [`Participant`]): every
//!   game and its seats, with the `Waiting → Playing → Finished` lifecycle
//! - **Outcome evaluation** ([`evaluate`]): pure win/draw detection
//! - **Matchmaking** ([`MatchQueue`]): FIFO pairing of anonymous players
//! - **Rematch negotiation**, **lobby publishing** and the **idle reaper**
//! - **[`Orchestrator`]**: the single owner of all of the above, applying
//!   each client message in turn
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)  ← locks the orchestrator, feeds it decoded frames
//!     ↕
//! Orchestrator (this crate)  ← games, queue, lobby, reaper
//!     ↕
//! Registry / Protocol (below)  ← who is who, what goes on the wire
//! ```
//!
//! The orchestrator is synchronous and never awaits. Randomness comes in
//! through [`CoinFlip`] so that tests can script symbol assignment.

mod coin;
mod config;
mod error;
mod game;
mod lobby;
mod matchmaking;
mod orchestrator;
mod outcome;
mod queue;
mod reaper;
mod rematch;
mod store;

pub use coin::{CoinFlip, RandomCoin};
pub use config::OrchestratorConfig;
pub use error::GameError;
pub use game::{Game, Participant, cell_index};
pub use orchestrator::Orchestrator;
pub use outcome::{Outcome, WINNING_LINES, evaluate};
pub use queue::{MatchQueue, QueueEntry};
pub use store::GameStore;
