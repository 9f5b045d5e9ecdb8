//! Duelgrid server binary.
//!
//! Reads its settings from the environment (see [`ServerConfig::from_env`])
//! and serves until Ctrl-C. Log verbosity follows `RUST_LOG`, defaulting
//! to `info`.

use duelgrid::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let server = DuelgridServer::builder().config(config).build().await?;
    tracing::info!(addr = %server.local_addr()?, "listening for players");

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}
