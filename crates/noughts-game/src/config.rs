//! Orchestrator configuration.

use std::time::Duration;

/// Timing knobs for the orchestrator and its background jobs.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// How recently a waiting custom game must have seen activity to be
    /// listed in the lobby.
    pub lobby_freshness: Duration,

    /// Idle time after which the reaper deletes a game.
    pub stale_after: Duration,

    /// Cadence of the safety-net matchmaking sweep. Pairing also runs on
    /// every enqueue. Zero turns the sweep off.
    pub matchmaking_sweep_interval: Duration,

    /// Cadence of the idle reaper. Zero turns the reaper off.
    pub reaper_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            lobby_freshness: Duration::from_secs(5 * 60),
            stale_after: Duration::from_secs(10 * 60),
            matchmaking_sweep_interval: Duration::from_secs(2),
            reaper_interval: Duration::from_secs(60),
        }
    }
}
