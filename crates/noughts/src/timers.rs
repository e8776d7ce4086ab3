//! Background sweeps: matchmaking safety net and idle reaper.
//!
//! Both take the same orchestrator lock as the connection handlers, run one
//! synchronous pass, and let go.

use std::sync::Arc;
use std::time::{Duration, Instant};

use noughts_protocol::Codec;
use noughts_tick::{TickConfig, TickScheduler};
use tokio::task::JoinHandle;

use crate::server::ServerState;

/// Aborts the wrapped task when dropped.
pub(crate) struct TaskGuard(JoinHandle<()>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn scheduler(period: Duration) -> TickScheduler {
    TickScheduler::new(TickConfig::from_period(period))
}

/// Periodically pairs whatever the enqueue-triggered passes left behind.
pub(crate) fn spawn_matchmaking_sweep<C: Codec>(
    state: Arc<ServerState<C>>,
    period: Duration,
) -> TaskGuard {
    TaskGuard(tokio::spawn(async move {
        let mut ticks = scheduler(period);
        loop {
            let tick = ticks.wait_for_tick().await;
            let started = state.orchestrator.lock().await.sweep_matchmaking();
            if started > 0 {
                tracing::debug!(tick = tick.number, started, "matchmaking sweep paired players");
            }
            ticks.record_tick_end();
        }
    }))
}

/// Periodically evicts abandoned and stale games.
pub(crate) fn spawn_idle_reaper<C: Codec>(
    state: Arc<ServerState<C>>,
    period: Duration,
) -> TaskGuard {
    TaskGuard(tokio::spawn(async move {
        let mut ticks = scheduler(period);
        loop {
            let tick = ticks.wait_for_tick().await;
            let reaped = state.orchestrator.lock().await.reap_idle(Instant::now());
            if reaped > 0 {
                tracing::info!(tick = tick.number, reaped, "idle games reaped");
            }
            ticks.record_tick_end();
        }
    }))
}
