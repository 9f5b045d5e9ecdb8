//! The room store: every active room, keyed by room code.

use std::collections::HashMap;

use duelgrid_protocol::RoomCode;

use crate::Room;

/// Owns every active [`Room`].
///
/// Not thread-safe on its own; the server serializes access through the
/// gateway lock. Construct one per server (or per test) rather than
/// sharing a global.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the room named `code`, creating an empty one if needed.
    ///
    /// Never touches an existing room's state.
    pub fn get_or_create(&mut self, code: &str) -> &mut Room {
        self.rooms
            .entry(RoomCode::new(code))
            .or_insert_with_key(|code| {
                tracing::info!(room = %code, "room created");
                Room::new(code.clone())
            })
    }

    pub fn get(&self, code: &str) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Removes the room. No-op if it is not there.
    pub fn delete(&mut self, code: &str) -> Option<Room> {
        let removed = self.rooms.remove(code);
        if removed.is_some() {
            tracing::info!(room = code, "room closed");
        }
        removed
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rooms.contains_key(code)
    }

    /// Number of active rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Iterates over all active rooms in no particular order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }
}
