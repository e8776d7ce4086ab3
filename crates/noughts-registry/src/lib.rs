//! Connection registry for noughts.
//!
//! A WebSocket connection is transient; a player's identity is not. This
//! crate keeps the table that ties the two together:
//!
//! 1. **Outboxes**: every live connection's outbound channel ([`Outbox`])
//! 2. **Bindings**: which `(playerId, gameId)` a connection currently
//!    claims ([`Binding`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Game layer (above)  ← resolves "who sent this" and "where do I send that"
//!     ↕
//! Registry (this crate)  ← ConnectionId → outbox + binding
//!     ↕
//! Transport / Protocol (below)  ← ConnectionId, ServerMessage
//! ```

mod binding;
mod registry;

pub use binding::{Binding, Outbox};
pub use registry::ConnectionRegistry;
