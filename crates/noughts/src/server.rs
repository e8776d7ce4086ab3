//! `NoughtsServer` builder and server loop.
//!
//! This is the entry point for running a noughts server. It ties together
//! all the layers: transport → protocol → orchestrator, plus the two
//! background sweeps.

use std::sync::Arc;

use noughts_game::{CoinFlip, Orchestrator, OrchestratorConfig};
use noughts_protocol::{Codec, JsonCodec};
use noughts_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::NoughtsError;
use crate::handler::handle_connection;
use crate::timers;

/// Shared server state passed to each connection handler task.
///
/// The orchestrator sits behind one async mutex: every handler and both
/// background sweeps serialize on it.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) orchestrator: Mutex<Orchestrator>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a noughts server.
///
/// # Example
///
/// ```rust,ignore
/// use noughts::prelude::*;
///
/// let server = NoughtsServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct NoughtsServerBuilder {
    bind_addr: String,
    config: OrchestratorConfig,
    coin: Option<Box<dyn CoinFlip>>,
}

impl NoughtsServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            config: OrchestratorConfig::default(),
            coin: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the orchestrator configuration.
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the random coin used for symbol and turn assignment.
    pub fn coin(mut self, coin: impl CoinFlip + 'static) -> Self {
        self.coin = Some(Box::new(coin));
        self
    }

    /// Binds the listener and assembles the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<NoughtsServer<JsonCodec>, NoughtsError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let orchestrator = match self.coin {
            Some(coin) => Orchestrator::with_coin(self.config.clone(), coin),
            None => Orchestrator::new(self.config.clone()),
        };
        let state = Arc::new(ServerState {
            orchestrator: Mutex::new(orchestrator),
            codec: JsonCodec,
        });

        Ok(NoughtsServer {
            transport,
            state,
            config: self.config,
        })
    }
}

impl Default for NoughtsServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound noughts server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct NoughtsServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    config: OrchestratorConfig,
}

impl NoughtsServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> NoughtsServerBuilder {
        NoughtsServerBuilder::new()
    }
}

impl<C: Codec> NoughtsServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server.
    ///
    /// Starts the matchmaking sweep and the idle reaper, then accepts
    /// connections and spawns a handler task for each. Runs until the
    /// process is terminated; the background sweeps stop when this future
    /// is dropped.
    pub async fn run(mut self) -> Result<(), NoughtsError> {
        let _sweep = timers::spawn_matchmaking_sweep(
            Arc::clone(&self.state),
            self.config.matchmaking_sweep_interval,
        );
        let _reaper =
            timers::spawn_idle_reaper(Arc::clone(&self.state), self.config.reaper_interval);

        tracing::info!(addr = ?self.local_addr().ok(), "noughts server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(handle_connection(conn, state));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
