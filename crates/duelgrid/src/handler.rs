//! Per-connection handler: greeting, request loop, and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a writer task that drains the connection's outbound queue:
//!   1. Register with the gateway, which queues the welcome
//!   2. Loop: receive frames, decode a `Request`, hand it to the gateway
//!   3. On close, error, or idle timeout: unseat the connection
//!
//! A keep-alive task pings the peer several times per idle timeout. Any
//! inbound frame, pongs included, counts as activity, so a player quietly
//! waiting for the opponent stays seated while a vanished one does not.

use std::sync::Arc;
use std::time::Duration;

use duelgrid_protocol::{Codec, Request, ServerEvent};
use duelgrid_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::DuelgridError;
use crate::server::ServerState;

/// Drop guard that unseats a connection when its handler exits.
///
/// Runs even if the handler panics. The gateway lock is usually free, so
/// cleanup happens inline; otherwise it is handed to a spawned task
/// because `Drop` cannot await.
struct ConnectionGuard<C: Codec> {
    connection: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        let connection = self.connection;
        if let Ok(mut gateway) = self.state.gateway.try_lock() {
            gateway.disconnect(connection);
            return;
        }
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.gateway.lock().await.disconnect(connection);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), DuelgridError> {
    let connection = conn.id();
    let conn = Arc::new(conn);
    tracing::debug!(%connection, "handling new connection");

    let (tx, rx) = mpsc::unbounded_channel();
    state.gateway.lock().await.connect(connection, tx);
    let guard = ConnectionGuard {
        connection,
        state: Arc::clone(&state),
    };
    let writer = tokio::spawn(write_events(Arc::clone(&conn), Arc::clone(&state), rx));
    let pinger = tokio::spawn(keep_alive(Arc::clone(&conn), state.config.idle_timeout));

    let result = read_requests(&conn, &state, connection).await;

    // Unregistering drops the gateway's sender, which ends the writer.
    drop(guard);
    pinger.abort();
    writer.abort();
    if let Err(e) = conn.close().await {
        tracing::trace!(%connection, error = %e, "close after disconnect failed");
    }
    result
}

/// Reads frames until the peer goes away or falls silent.
///
/// Silence is measured by the transport, so control frames swallowed
/// inside `recv` still push the deadline out.
async fn read_requests<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    connection: ConnectionId,
) -> Result<(), DuelgridError> {
    loop {
        let remaining = state.config.idle_timeout.saturating_sub(conn.idle_for());
        if remaining.is_zero() {
            tracing::info!(%connection, "connection idle, closing");
            return Ok(());
        }

        let data = match tokio::time::timeout(remaining, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%connection, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(e)) => return Err(e.into()),
            // Re-checked against the last frame of any kind at the top.
            Err(_) => continue,
        };

        match state.codec.decode::<Request>(&data) {
            Ok(request) => state.gateway.lock().await.handle(connection, request),
            Err(e) => {
                tracing::debug!(%connection, error = %e, "failed to decode request");
                state.gateway.lock().await.reject_frame(connection, &e);
            }
        }
    }
}

/// Pings the peer a few times per idle timeout until a ping fails.
async fn keep_alive(conn: Arc<WebSocketConnection>, idle_timeout: Duration) {
    let period = (idle_timeout / 3).max(Duration::from_millis(10));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; the peer just connected.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if let Err(e) = conn.ping().await {
            tracing::debug!(connection = %conn.id(), error = %e, "keep-alive ping failed");
            break;
        }
    }
}

/// Encodes queued events and writes them to the socket, in order.
async fn write_events<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut outbound: mpsc::UnboundedReceiver<ServerEvent>,
) {
    let connection = conn.id();
    while let Some(event) = outbound.recv().await {
        let bytes = match state.codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(%connection, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%connection, error = %e, "send failed, stopping writer");
            break;
        }
    }
}
