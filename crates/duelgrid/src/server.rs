//! `DuelgridServer` builder and server loop.
//!
//! This is the entry point for running a Duelgrid server. It ties
//! together all the layers: transport → protocol → gateway → rooms.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use duelgrid_protocol::{Codec, JsonCodec};
use duelgrid_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{DuelgridError, Gateway, ServerConfig};

/// The current protocol version, announced in every welcome.
pub const PROTOCOL_VERSION: u32 = 1;

/// Shared server state passed to each connection handler task.
///
/// One lock around the whole gateway: every room change and the fan-out
/// it triggers happen as a single step.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) gateway: Mutex<Gateway>,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Duelgrid server.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use duelgrid::prelude::*;
///
/// # async fn start() -> Result<(), DuelgridError> {
/// let server = DuelgridServer::builder()
///     .bind("0.0.0.0:3001")
///     .idle_timeout(Duration::from_secs(30))
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DuelgridServerBuilder {
    config: ServerConfig,
}

impl DuelgridServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets how long a silent connection is kept open.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Replaces every setting at once, e.g. with [`ServerConfig::from_env`].
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<DuelgridServer<JsonCodec>, DuelgridError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let state = Arc::new(ServerState {
            gateway: Mutex::new(Gateway::new()),
            codec: JsonCodec,
            config: self.config,
        });

        Ok(DuelgridServer { transport, state })
    }
}

/// A bound Duelgrid server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct DuelgridServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl DuelgridServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> DuelgridServerBuilder {
        DuelgridServerBuilder::new()
    }
}

impl<C: Codec> DuelgridServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), DuelgridError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` completes.
    ///
    /// Connections already accepted keep their handler tasks; only new
    /// connections stop being accepted.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), DuelgridError> {
        tracing::info!(
            addr = ?self.transport.local_addr().ok(),
            idle_timeout = ?self.state.config.idle_timeout,
            "Duelgrid server running"
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("shutdown requested, no longer accepting");
                    return Ok(());
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }
    }
}
