//! Connection → room index.
//!
//! Lets disconnect cleanup go straight to the one room a connection sits
//! in instead of scanning every room.

use std::collections::HashMap;

use duelgrid_protocol::RoomCode;
use duelgrid_transport::ConnectionId;

/// Maps each seated connection to its room code.
///
/// Holds only the code, never the room itself; the [`RoomStore`] owns
/// rooms. An entry exists exactly while the connection holds a seat.
///
/// [`RoomStore`]: crate::RoomStore
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    seats: HashMap<ConnectionId, RoomCode>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `connection` is seated in `room`.
    pub fn insert(&mut self, connection: ConnectionId, room: RoomCode) {
        let previous = self.seats.insert(connection, room);
        debug_assert!(previous.is_none(), "{connection} was already seated in {previous:?}");
    }

    /// The room `connection` is seated in.
    pub fn room_of(&self, connection: ConnectionId) -> Option<&RoomCode> {
        self.seats.get(&connection)
    }

    /// Forgets `connection`, returning the room it was in.
    pub fn remove(&mut self, connection: ConnectionId) -> Option<RoomCode> {
        self.seats.remove(&connection)
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, &RoomCode)> {
        self.seats.iter().map(|(conn, room)| (*conn, room))
    }
}
