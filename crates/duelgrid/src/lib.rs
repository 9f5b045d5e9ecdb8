//! # Duelgrid
//!
//! Real-time room coordinator for two-player tic-tac-toe.
//!
//! Clients connect over WebSocket, pick a room by name, and play against
//! whoever else joins it. The server is authoritative: it seats players,
//! referees every move, and broadcasts the full room state after each
//! change.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use duelgrid::prelude::*;
//!
//! # async fn start() -> Result<(), DuelgridError> {
//! let server = DuelgridServer::builder()
//!     .config(ServerConfig::from_env()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod gateway;
mod handler;
mod server;

pub use config::{DEFAULT_PORT, ServerConfig};
pub use error::DuelgridError;
pub use gateway::{ClientSender, Gateway};
pub use server::{DuelgridServer, DuelgridServerBuilder, PROTOCOL_VERSION};

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::{
        DuelgridError, DuelgridServer, DuelgridServerBuilder, Gateway, PROTOCOL_VERSION,
        ServerConfig,
    };
    pub use duelgrid_board::{Grid, Mark, Outcome};
    pub use duelgrid_protocol::{
        ClientEvent, Codec, JsonCodec, ParticipantView, Reply, Request, RoomCode, RoomSnapshot,
        ServerEvent,
    };
    pub use duelgrid_room::{RoomError, RoomManager};
    pub use duelgrid_transport::ConnectionId;
}
