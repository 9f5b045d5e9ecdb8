//! Wire types: everything that is serialized onto a connection.
//!
//! Inbound, a client sends [`Request`]s wrapping a [`ClientEvent`].
//! Outbound, the server sends [`ServerEvent`]s: acknowledgements addressed
//! to one request, and room state broadcast to everyone seated in a room.

use std::borrow::Borrow;
use std::fmt;

use duelgrid_board::{Grid, Mark};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Caller-chosen room identifier ("room code").
///
/// Opaque to the server: any non-blank string names a room. Serializes as
/// the bare string. Implements `Borrow<str>` so maps keyed by `RoomCode`
/// can be queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RoomCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// One inbound frame.
///
/// `seq` is chosen by the client and echoed back in the matching
/// [`ServerEvent::Ack`], so a client can pair replies with requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub seq: u64,
    pub event: ClientEvent,
}

/// What a client asks the server to do.
///
/// Internally tagged: `{"type": "join", "room": "R1", "playerName": "Ann"}`.
///
/// String fields default to empty when missing so that an incomplete join
/// is answered with the "required" error instead of being dropped as an
/// undecodable frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Take a seat in `room`, creating it if nobody is there yet.
    Join {
        #[serde(default)]
        room: String,
        #[serde(default, rename = "playerName", alias = "player_name")]
        player_name: String,
    },

    /// Play the cell at `index` (0..=8, row-major).
    ///
    /// Signed so out-of-range values reach the rules and are rejected as
    /// an invalid move. A missing or non-integer index decodes as `None`
    /// and is refused the same way, so the move still gets its ack.
    Move {
        #[serde(default)]
        room: String,
        #[serde(default, deserialize_with = "lenient_index")]
        index: Option<i64>,
    },

    /// Clear the board of `room`. Not acknowledged.
    Reset {
        #[serde(default)]
        room: String,
    },

    /// Keep-alive; answered with [`ServerEvent::Pong`].
    Ping { client_time: u64 },
}

fn lenient_index<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawIndex {
        Integer(i64),
        Other(IgnoredAny),
    }

    Ok(match RawIndex::deserialize(deserializer)? {
        RawIndex::Integer(index) => Some(index),
        RawIndex::Other(_) => None,
    })
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Everything the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// First frame on every connection.
    Welcome { connection: u64, protocol_version: u32 },

    /// Answer to the request carrying the same `seq`.
    Ack { seq: u64, reply: Reply },

    /// Full room state, broadcast after every change to the room.
    State(RoomSnapshot),

    /// Answer to [`ClientEvent::Ping`]. `server_time` is milliseconds
    /// since the server started.
    Pong { client_time: u64, server_time: u64 },

    /// The last frame could not be decoded.
    Error { message: String },
}

/// Body of an acknowledgement.
///
/// Untagged so the JSON is exactly `{"symbol": "X", "playerName": "Ann"}`,
/// `{"success": true}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Joined {
        symbol: Mark,
        #[serde(rename = "playerName")]
        player_name: String,
    },
    Moved {
        success: bool,
    },
    Failed {
        error: String,
    },
}

impl Reply {
    /// The acknowledgement for an accepted move.
    pub fn moved() -> Self {
        Reply::Moved { success: true }
    }

    /// A rejection carrying the user-facing message.
    pub fn failed(error: impl fmt::Display) -> Self {
        Reply::Failed { error: error.to_string() }
    }
}

/// A seated participant as clients see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantView {
    pub name: String,
    pub mark: Mark,
}

/// The broadcast state of one room.
///
/// `winner` and `draw` are never both set. A finished game keeps its board
/// until someone resets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room: RoomCode,
    /// Seated participants in join order.
    pub participants: Vec<ParticipantView>,
    pub grid: Grid,
    /// Whose move it is.
    pub turn: Mark,
    /// Display name of the winner, if the game was won.
    pub winner: Option<String>,
    /// `true` if the board filled up with no completed line.
    pub draw: bool,
    /// The completed line when there is a winner.
    pub winning_line: Option<[usize; 3]>,
}

impl RoomSnapshot {
    /// `true` once the game was won or drawn.
    pub fn is_over(&self) -> bool {
        self.winner.is_some() || self.draw
    }
}
