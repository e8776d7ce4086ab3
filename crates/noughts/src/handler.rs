//! Per-connection handler: read frames, feed the orchestrator, write replies.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbox with the orchestrator and spawn a writer task
//!   2. Loop: receive a frame → decode → lock → apply → unlock
//!   3. On close (clean or not), the guard reports the disconnect
//!
//! The orchestrator never writes to the socket itself. It pushes onto the
//! connection's outbox and the writer task drains it, so nothing is awaited
//! while the orchestrator lock is held.

use std::sync::Arc;

use noughts_protocol::{Codec, Inbound, ServerMessage};
use noughts_registry::Outbox;
use noughts_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;

/// Drop guard that reports a closed connection to the orchestrator.
///
/// Runs even if the handler panics. Since `Drop` is synchronous, we spawn a
/// fire-and-forget task for the async lock.
struct ConnectionGuard<C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.orchestrator.lock().await.disconnect(conn_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = ?conn.peer_addr(), "handling new connection");

    let (outbox, inbox): (Outbox, _) = mpsc::unbounded_channel();
    state.orchestrator.lock().await.connect(conn_id, outbox);
    let _guard = ConnectionGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    let writer = tokio::spawn(write_loop(Arc::clone(&conn), inbox, Arc::clone(&state)));

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let decoded = state.codec.decode::<Inbound>(&data);
        let mut orchestrator = state.orchestrator.lock().await;
        match decoded {
            Ok(inbound) => orchestrator.handle(conn_id, inbound),
            Err(e) => orchestrator.reject_malformed(conn_id, &e),
        }
    }

    writer.abort();
    // _guard drops here → disconnect fires.
}

/// Drains a connection's outbox onto the socket.
///
/// Exits when the outbox is closed or a write fails. Either way the
/// receiver is dropped, which marks the connection as no longer live.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut inbox: mpsc::UnboundedReceiver<ServerMessage>,
    state: Arc<ServerState<C>>,
) {
    let conn_id = conn.id();
    while let Some(msg) = inbox.recv().await {
        let bytes = match state.codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode outbound message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
    }
}
