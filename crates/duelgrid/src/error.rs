//! Unified error type for the Duelgrid server.

use duelgrid_protocol::ProtocolError;
use duelgrid_transport::TransportError;

/// Top-level error for server setup and connection handling.
///
/// Game-rule refusals are not here: those are answered on the request's
/// acknowledgement and never end a connection. The `#[from]` attributes
/// let `?` lift layer errors into this type.
#[derive(Debug, thiserror::Error)]
pub enum DuelgridError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}
