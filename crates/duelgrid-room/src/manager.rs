//! Room manager: the entry point the gateway calls for every room event.
//!
//! Owns the [`RoomStore`] and the [`ConnectionRegistry`] and keeps them in
//! step. Each operation is a synchronous transition that returns what
//! should be broadcast; the caller does the sending.

use duelgrid_board::{Mark, Outcome};
use duelgrid_protocol::{RoomCode, RoomSnapshot};
use duelgrid_transport::ConnectionId;

use crate::{ConnectionRegistry, Room, RoomError, RoomStore};

/// State to broadcast after a room changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomUpdate {
    pub snapshot: RoomSnapshot,
    /// Every connection seated in the room after the change.
    pub recipients: Vec<ConnectionId>,
}

impl RoomUpdate {
    fn of(room: &Room) -> Self {
        Self {
            snapshot: room.snapshot(),
            recipients: room.connections(),
        }
    }
}

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    pub mark: Mark,
    pub player_name: String,
    pub update: RoomUpdate,
}

/// Manages all active rooms and tracks which connection sits where.
///
/// Invariants, checked after every mutation in debug builds:
/// - a room in the store has at least one participant;
/// - a connection is in the registry iff it is seated, and the registry
///   names the room it is seated in.
#[derive(Debug, Default)]
pub struct RoomManager {
    store: RoomStore,
    connections: ConnectionRegistry,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats `connection` in `room`, creating the room on first join.
    pub fn join(
        &mut self,
        connection: ConnectionId,
        room: &str,
        player_name: &str,
    ) -> Result<Joined, RoomError> {
        if room.trim().is_empty() {
            return Err(RoomError::Validation);
        }
        if let Some(current) = self.connections.room_of(connection) {
            return Err(RoomError::AlreadySeated(connection, current.clone()));
        }

        // The room checks the name and its free seats. A refused first
        // join must not leave an empty room behind.
        let session = self.store.get_or_create(room);
        let mark = match session.join(connection, player_name) {
            Ok(mark) => mark,
            Err(e) => {
                if session.is_empty() {
                    self.store.delete(room);
                }
                debug_assert!(self.is_consistent());
                return Err(e);
            }
        };
        let code = session.code().clone();
        let update = RoomUpdate::of(session);

        tracing::info!(
            room = %code,
            %connection,
            player = player_name,
            %mark,
            players = update.recipients.len(),
            "player joined"
        );
        self.connections.insert(connection, code);
        debug_assert!(self.is_consistent());

        Ok(Joined {
            mark,
            player_name: player_name.to_owned(),
            update,
        })
    }

    /// Plays `index` in `room` for `connection`. `None` stands for an
    /// index the client did not send as an integer.
    pub fn make_move(
        &mut self,
        connection: ConnectionId,
        room: &str,
        index: Option<i64>,
    ) -> Result<RoomUpdate, RoomError> {
        let session = self
            .store
            .get_mut(room)
            .ok_or_else(|| RoomError::NotFound(RoomCode::new(room)))?;

        match session.make_move(connection, index)? {
            Outcome::Win { mark, line } => {
                tracing::info!(room, %mark, ?line, "game won");
            }
            Outcome::Draw => tracing::info!(room, "game drawn"),
            Outcome::Undecided => {
                tracing::debug!(room, %connection, ?index, "move accepted");
            }
        }
        Ok(RoomUpdate::of(session))
    }

    /// Starts a new game in `room`. `None` if the room does not exist.
    pub fn reset(&mut self, room: &str) -> Option<RoomUpdate> {
        let session = self.store.get_mut(room)?;
        session.reset();
        tracing::info!(room, "game reset");
        Some(RoomUpdate::of(session))
    }

    /// Unseats `connection` from whatever room it is in.
    ///
    /// Returns the update for the remaining participants, or `None` when
    /// there is nobody left to tell: the connection was not seated, or it
    /// was the last one and the room was closed. Safe to call repeatedly.
    pub fn disconnect(&mut self, connection: ConnectionId) -> Option<RoomUpdate> {
        let code = self.connections.remove(connection)?;

        let Some(session) = self.store.get_mut(code.as_str()) else {
            debug_assert!(false, "{connection} indexed to missing room {code}");
            return None;
        };
        let left = session.remove(connection);
        debug_assert!(left.is_some(), "{connection} indexed to {code} but not seated there");

        let update = if session.is_empty() {
            self.store.delete(code.as_str());
            None
        } else {
            Some(RoomUpdate::of(session))
        };

        tracing::info!(
            room = %code,
            %connection,
            player = ?left.as_ref().map(|p| p.name.as_str()),
            remaining = update.as_ref().map_or(0, |u| u.recipients.len()),
            "player left"
        );
        debug_assert!(self.is_consistent());
        update
    }

    /// The room named `code`.
    pub fn room(&self, code: &str) -> Option<&Room> {
        self.store.get(code)
    }

    /// The room `connection` is seated in.
    pub fn room_of(&self, connection: ConnectionId) -> Option<&RoomCode> {
        self.connections.room_of(connection)
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.store.len()
    }

    /// Full cross-check of the store against the registry.
    ///
    /// Scans everything, so it only backs `debug_assert!`s and tests.
    pub fn is_consistent(&self) -> bool {
        let seated: usize = self.store.rooms().map(Room::len).sum();
        if seated != self.connections.len() {
            return false;
        }
        if self.store.rooms().any(Room::is_empty) {
            return false;
        }
        self.connections.iter().all(|(connection, code)| {
            self.store
                .get(code.as_str())
                .is_some_and(|room| room.participant(connection).is_some())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[test]
    fn test_join_creates_room_lazily() {
        let mut mgr = RoomManager::new();
        assert_eq!(mgr.room_count(), 0);

        let joined = mgr.join(conn(1), "R1", "Ann").unwrap();
        assert_eq!(joined.mark, Mark::X);
        assert_eq!(joined.update.recipients, vec![conn(1)]);
        assert_eq!(mgr.room_count(), 1);
        assert_eq!(mgr.room_of(conn(1)), Some(&RoomCode::new("R1")));
    }

    #[test]
    fn test_invalid_join_creates_nothing() {
        let mut mgr = RoomManager::new();
        assert_eq!(mgr.join(conn(1), "", "Ann"), Err(RoomError::Validation));
        assert_eq!(mgr.join(conn(1), "R1", ""), Err(RoomError::Validation));
        assert_eq!(mgr.room_count(), 0);
        assert!(mgr.is_consistent());
    }

    #[test]
    fn test_refused_first_join_leaves_no_empty_room() {
        let mut mgr = RoomManager::new();
        assert_eq!(mgr.join(conn(1), "R1", "  "), Err(RoomError::Validation));
        assert!(mgr.room("R1").is_none());
        assert_eq!(mgr.room_of(conn(1)), None);

        // The code is free for a valid join afterwards.
        let joined = mgr.join(conn(1), "R1", "Ann").unwrap();
        assert_eq!(joined.mark, Mark::X);
        assert_eq!(mgr.room_count(), 1);
        assert!(mgr.is_consistent());
    }

    #[test]
    fn test_refused_join_keeps_existing_room() {
        let mut mgr = RoomManager::new();
        mgr.join(conn(1), "R1", "Ann").unwrap();
        assert_eq!(mgr.join(conn(2), "R1", ""), Err(RoomError::Validation));
        assert_eq!(mgr.room("R1").unwrap().len(), 1);
        assert!(mgr.is_consistent());
    }

    #[test]
    fn test_connection_holds_one_seat() {
        let mut mgr = RoomManager::new();
        mgr.join(conn(1), "R1", "Ann").unwrap();

        let err = mgr.join(conn(1), "R2", "Ann").unwrap_err();
        assert_eq!(err, RoomError::AlreadySeated(conn(1), RoomCode::new("R1")));
        assert_eq!(mgr.room_count(), 1, "R2 must not be created");
    }

    #[test]
    fn test_move_in_missing_room() {
        let mut mgr = RoomManager::new();
        let err = mgr.make_move(conn(1), "ghost", Some(0)).unwrap_err();
        assert_eq!(err.to_string(), "Room does not exist.");
    }

    #[test]
    fn test_reset_missing_room_is_none() {
        let mut mgr = RoomManager::new();
        assert_eq!(mgr.reset("ghost"), None);
        assert_eq!(mgr.room_count(), 0);
    }

    #[test]
    fn test_disconnect_unknown_connection_is_noop() {
        let mut mgr = RoomManager::new();
        mgr.join(conn(1), "R1", "Ann").unwrap();
        assert_eq!(mgr.disconnect(conn(99)), None);
        assert_eq!(mgr.room_count(), 1);
    }
}
