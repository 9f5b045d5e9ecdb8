//! Error types for the room layer.
//!
//! The `Display` text of every variant is shown to players verbatim, so
//! it is part of the client contract. Context for logs travels in the
//! variant fields and shows up through `Debug`.

use duelgrid_protocol::RoomCode;
use duelgrid_transport::ConnectionId;

/// A join, move, or reset that was refused.
///
/// All variants are recoverable and reported back on the request's
/// acknowledgement; none of them is fatal to the connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The room id or player name was missing or blank.
    #[error("Room ID and Player Name are required!")]
    Validation,

    /// Both seats are taken.
    #[error("Room is full! Try another one.")]
    RoomFull(RoomCode),

    /// No room with this id is active.
    #[error("Room does not exist.")]
    NotFound(RoomCode),

    /// The game already ended in a win or a draw; reset first.
    #[error("Game is over.")]
    GameOver(RoomCode),

    /// The connection is not seated in the room it tried to play in.
    #[error("You are not part of this game.")]
    NotAParticipant(ConnectionId, RoomCode),

    /// It is the other mark's move.
    #[error("Wait for your turn!")]
    Turn(ConnectionId, RoomCode),

    /// The index is missing, off the board, or names a taken cell.
    #[error("Invalid move!")]
    IllegalMove { room: RoomCode, index: Option<i64> },

    /// The connection already holds a seat (possibly in another room).
    #[error("You are already in a game.")]
    AlreadySeated(ConnectionId, RoomCode),
}
