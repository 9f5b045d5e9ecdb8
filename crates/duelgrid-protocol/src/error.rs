//! Error types for the protocol layer.
//!
//! Each crate in Duelgrid defines its own error enum. A `ProtocolError`
//! always means a frame could not be turned into (or built from) bytes;
//! game-rule rejections live in the room layer.

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown event `type`,
    /// or a field of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
