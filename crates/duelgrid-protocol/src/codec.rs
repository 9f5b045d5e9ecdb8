//! Codec trait and implementations for turning frames into bytes.
//!
//! The server is generic over [`Codec`], so the wire format can change
//! without touching the gateway or the room layer. [`JsonCodec`] is what
//! browser clients speak today.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes outbound events to bytes and decodes inbound frames.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use duelgrid_protocol::{ClientEvent, Codec, JsonCodec, Request};
///
/// let codec = JsonCodec;
/// let raw = br#"{"seq":3,"event":{"type":"move","room":"R1","index":4}}"#;
///
/// let request: Request = codec.decode(raw).unwrap();
/// assert_eq!(request.seq, 3);
/// assert_eq!(
///     request.event,
///     ClientEvent::Move { room: "R1".into(), index: Some(4) }
/// );
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Reply, ServerEvent};

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result: Result<crate::Request, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_produces_utf8_json() {
        let bytes = JsonCodec
            .encode(&ServerEvent::Ack { seq: 1, reply: Reply::moved() })
            .unwrap();
        let text = String::from_utf8(bytes).expect("JSON is UTF-8");
        assert!(text.contains("\"success\":true"));
    }
}
